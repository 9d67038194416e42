use chrono::{Datelike, Local, NaiveDate};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

/// Get the configuration directory path for PawLog
/// If profile is Dev, uses "pawlog-dev" instead of "pawlog"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    let app_name = match profile {
        Profile::Dev => "pawlog-dev",
        Profile::Prod => "pawlog",
    };
    // Use "app" as qualifier for better cross-platform compatibility
    ProjectDirs::from("app", "pawlog", app_name).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path for PawLog (identity cache lives here)
/// If profile is Dev, uses "pawlog-dev" instead of "pawlog"
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    let app_name = match profile {
        Profile::Dev => "pawlog-dev",
        Profile::Prod => "pawlog",
    };
    ProjectDirs::from("app", "pawlog", app_name).map(|dirs| dirs.data_dir().to_path_buf())
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
}

/// Age in whole years for a YYYY-MM-DD birth date as of `today`.
/// Tolerates a time suffix after the date (only the prefix is parsed);
/// returns None for anything unparsable. Never negative.
pub fn age_years_on(birth_date: &str, today: NaiveDate) -> Option<u32> {
    let prefix = birth_date.get(..10)?;
    let birth = parse_date(prefix).ok()?;
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    Some(age.max(0) as u32)
}

/// Age in whole years as of the local calendar date.
pub fn age_years(birth_date: &str) -> Option<u32> {
    age_years_on(birth_date, Local::now().date_naive())
}

/// Dashboard greeting for a local hour of day.
pub fn greeting_for_hour(hour: u32) -> (&'static str, &'static str) {
    match hour {
        5..=11 => ("Good morning", "☀"),
        12..=16 => ("Good afternoon", "☀"),
        17..=20 => ("Good evening", "🌅"),
        _ => ("Good night", "🌙"),
    }
}

/// Parsed key binding information
#[derive(Debug, Clone)]
pub struct ParsedKeyBinding {
    pub key_code: crossterm::event::KeyCode,
    pub requires_ctrl: bool,
}

/// Check if a key event has the primary modifier (Ctrl on Windows/Linux, Option/Alt on macOS)
/// This follows the standard cross-platform TUI pattern where Ctrl and Option/Alt are treated as equivalent
pub fn has_primary_modifier(modifiers: crossterm::event::KeyModifiers) -> bool {
    #[cfg(target_os = "macos")]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
            || modifiers.contains(crossterm::event::KeyModifiers::ALT)
    }

    #[cfg(not(target_os = "macos"))]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
    }
}

/// Format a key binding string for display, showing the platform-appropriate modifier
/// On macOS, "Ctrl+" is replaced with "Opt+" for better UX (Option key)
pub fn format_key_binding_for_display(key_binding: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        key_binding.replace("Ctrl+", "Opt+")
    }

    #[cfg(not(target_os = "macos"))]
    {
        key_binding.to_string()
    }
}

/// Parse a key binding string from config into a ParsedKeyBinding
/// Supports: single keys ("q", "n"), special keys ("Enter", "Left"),
/// and modifiers ("Ctrl+s")
pub fn parse_key_binding(key_str: &str) -> Result<ParsedKeyBinding, String> {
    let key_str = key_str.trim();

    if let Some(key_part) = key_str.strip_prefix("Ctrl+") {
        let key_code = parse_key_code(key_part)?;
        return Ok(ParsedKeyBinding {
            key_code,
            requires_ctrl: true,
        });
    }

    let key_code = parse_key_code(key_str)?;
    Ok(ParsedKeyBinding {
        key_code,
        requires_ctrl: false,
    })
}

/// Parse a key code from a string (without modifiers)
fn parse_key_code(key_str: &str) -> Result<crossterm::event::KeyCode, String> {
    use crossterm::event::KeyCode;
    match key_str {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" | "Escape" => Ok(KeyCode::Esc),
        "Backspace" => Ok(KeyCode::Backspace),
        "Tab" => Ok(KeyCode::Tab),
        "Space" | " " => Ok(KeyCode::Char(' ')),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Home" => Ok(KeyCode::Home),
        "End" => Ok(KeyCode::End),
        "PageUp" => Ok(KeyCode::PageUp),
        "PageDown" => Ok(KeyCode::PageDown),
        "Delete" => Ok(KeyCode::Delete),
        "Insert" => Ok(KeyCode::Insert),
        "F1" => Ok(KeyCode::F(1)),
        "F2" => Ok(KeyCode::F(2)),
        "F3" => Ok(KeyCode::F(3)),
        "F4" => Ok(KeyCode::F(4)),
        "F5" => Ok(KeyCode::F(5)),
        "F6" => Ok(KeyCode::F(6)),
        "F7" => Ok(KeyCode::F(7)),
        "F8" => Ok(KeyCode::F(8)),
        "F9" => Ok(KeyCode::F(9)),
        "F10" => Ok(KeyCode::F(10)),
        "F11" => Ok(KeyCode::F(11)),
        "F12" => Ok(KeyCode::F(12)),
        _ => {
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(KeyCode::Char(c)),
                _ => Err(format!("Unknown key binding: {}", key_str)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_counts_completed_years_only() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        // Birthday already passed this year.
        assert_eq!(age_years_on("2020-05-15", today), Some(6));
        // Birthday later this year.
        assert_eq!(age_years_on("2020-12-01", today), Some(5));
        // Birthday today counts.
        assert_eq!(age_years_on("2020-08-05", today), Some(6));
    }

    #[test]
    fn age_tolerates_time_suffix_and_rejects_garbage() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        assert_eq!(age_years_on("2020-05-15T00:00:00Z", today), Some(6));
        assert_eq!(age_years_on("15/05/2020", today), None);
        assert_eq!(age_years_on("", today), None);
        // Future birth dates clamp to zero.
        assert_eq!(age_years_on("2030-01-01", today), Some(0));
    }

    #[test]
    fn key_bindings_parse_with_and_without_ctrl() {
        let plain = parse_key_binding("q").unwrap();
        assert!(!plain.requires_ctrl);

        let chorded = parse_key_binding("Ctrl+s").unwrap();
        assert!(chorded.requires_ctrl);
        assert_eq!(chorded.key_code, crossterm::event::KeyCode::Char('s'));

        assert!(parse_key_binding("NotAKey").is_err());
    }
}
