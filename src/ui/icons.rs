pub struct Icons;

impl Icons {
    pub const ROCKET: &str = "🚀";
    pub const CHECK: &str = "✅";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const EMPTY: &str = "∅";
    pub const CAP: &str = "🎓";
    pub const BOOK: &str = "📚";
    pub const TEACHER: &str = "🧑‍🏫";
    pub const GROUP: &str = "👥";
    pub const CALENDAR: &str = "📅";
    pub const STAR: &str = "⭐";
}
