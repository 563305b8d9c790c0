/// Directives understood in the configured namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `#pragma <namespace> debug`: instrument the enclosing function
    Debug,
}

/// Parse the text of a pragma (with or without the leading `#pragma`).
/// `None` for pragmas that belong to someone else.
pub fn parse(text: &str, namespace: &str) -> Option<DirectiveKind> {
    let mut words = text.split_whitespace().peekable();
    if words.peek() == Some(&"#pragma") {
        words.next();
    }

    match (words.next(), words.next(), words.next()) {
        (Some(ns), Some("debug"), None) if ns == namespace => Some(DirectiveKind::Debug),
        _ => None,
    }
}
