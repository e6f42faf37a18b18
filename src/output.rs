use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// Suppress banners and section headers (report tables are still printed)
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("GRADEBOOK_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}
