use crate::output::is_quiet;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::CAP, text.style(theme().header.clone()));
}

/// Two-line banner; `None` when quiet
pub fn banner(title: &str, subtitle: &str) -> Option<String> {
    if is_quiet() {
        return None;
    }
    Some(format!(
        "{} {}\n   {}",
        Icons::ROCKET,
        title.style(theme().header.clone()),
        subtitle.style(theme().dim.clone())
    ))
}

pub fn success(label: &str) -> String {
    format!("{} {}", Icons::CHECK, label.style(theme().success.clone()))
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

/// Shown in place of a table when a report has no rows
pub fn empty(label: &str) -> String {
    format!("{} {}", Icons::EMPTY, label.style(theme().muted.clone()))
}

/// Section heading preceded by a blank line; `None` when quiet
pub fn section(icon: &str, title: &str) -> Option<String> {
    if is_quiet() {
        return None;
    }
    Some(format!("\n{} {}", icon, title.style(theme().header.clone())))
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}
