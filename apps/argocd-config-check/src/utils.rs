//! Colored prefixes for status lines printed on stderr.

use owo_colors::OwoColorize;

pub fn error_prefix(colors: bool) -> String {
    if colors {
        "Error:".red().bold().to_string()
    } else {
        "Error:".to_string()
    }
}

pub fn note_prefix(colors: bool) -> String {
    if colors {
        "NOTE:".yellow().bold().to_string()
    } else {
        "NOTE:".to_string()
    }
}
