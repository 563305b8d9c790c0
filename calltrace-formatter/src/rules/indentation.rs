// Indentation rules

use crate::config::BraceStyle;

/// Indentation for a given nesting level
pub fn indent_string(level: usize, indent_size: usize) -> String {
    " ".repeat(level * indent_size)
}

/// What goes between a header (`int f()`, `if (x)`) and its opening brace
pub fn brace_separator(style: BraceStyle, level: usize, indent_size: usize) -> String {
    match style {
        BraceStyle::SameLine => " ".to_string(),
        BraceStyle::NextLine => format!("\n{}", indent_string(level, indent_size)),
    }
}
