// Literal rendering rules

/// Escape text for a C string or character literal. ESC is written as `\033`
/// to match how the injected format strings read in source.
pub fn escape_c(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{1b}' => out.push_str("\\033"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() && (c as u32) < 0o400 => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

pub fn string_literal(text: &str) -> String {
    format!("\"{}\"", escape_c(text, '"'))
}

pub fn char_literal(c: char) -> String {
    format!("'{}'", escape_c(&c.to_string(), '\''))
}

/// Floating literal that always reads as one (`2.0`, not `2`)
pub fn real_literal(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains(['.', 'e', 'E']) {
        format!("{}.0", text)
    } else {
        text
    }
}
