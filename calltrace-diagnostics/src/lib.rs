// Diagnostics for the calltrace instrumentation pass
// Errors and warnings carry a code, a severity and the source location they belong to

use calltrace_ast::Location;
use colored::Colorize;
use serde::Serialize;
use std::fmt;

/// Source location (file, line, column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    pub fn at(file: &str, location: Location) -> Self {
        Self::new(file, location.line, location.column)
    }

    pub fn unknown() -> Self {
        Self::new("<unknown>", 0, 0)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLevel {
    Error,
    Warning,
    Note,
}

impl ErrorLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorLevel::Error => "error",
            ErrorLevel::Warning => "warning",
            ErrorLevel::Note => "note",
        }
    }
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorLevel::Error => write!(f, "{}", "error".red().bold()),
            ErrorLevel::Warning => write!(f, "{}", "warning".yellow().bold()),
            ErrorLevel::Note => write!(f, "{}", "note".cyan().bold()),
        }
    }
}

/// Structured diagnostic message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: ErrorLevel,
    pub code: String,
    pub message: String,
    pub span: Span,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn new(level: ErrorLevel, code: &str, message: String, span: Span) -> Self {
        Self {
            level,
            code: code.to_string(),
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn error(code: &str, message: String, span: Span) -> Self {
        Self::new(ErrorLevel::Error, code, message, span)
    }

    pub fn warning(code: &str, message: String, span: Span) -> Self {
        Self::new(ErrorLevel::Warning, code, message, span)
    }

    pub fn note(message: String, span: Span) -> Self {
        Self::new(ErrorLevel::Note, "", message, span)
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == ErrorLevel::Error
    }

    /// Render in rustc style:
    ///
    /// ```text
    /// error[E0425]: plugin requires declaration of printf, please create the function
    ///  --> add.c:3:1
    ///  = note: ...
    /// ```
    pub fn format(&self) -> String {
        let mut output = String::new();

        if self.code.is_empty() {
            output.push_str(&format!("{}: {}\n", self.level, self.message.bold()));
        } else {
            output.push_str(&format!(
                "{}[{}]: {}\n",
                self.level,
                self.code,
                self.message.bold()
            ));
        }

        output.push_str(&format!(" {} {}\n", "-->".cyan().bold(), self.span));

        for note in &self.notes {
            output.push_str(&format!(" {} {}\n", "=".cyan().bold(), note.cyan()));
        }

        if let Some(help) = &self.help {
            output.push_str(&format!(" {} {}\n", "help:".green().bold(), help));
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// Diagnostic collection and reporting engine
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            ErrorLevel::Error => self.error_count += 1,
            ErrorLevel::Warning => self.warning_count += 1,
            ErrorLevel::Note => {}
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn emit_error(&mut self, code: &str, message: String, span: Span) {
        self.emit(Diagnostic::error(code, message, span));
    }

    pub fn emit_warning(&mut self, code: &str, message: String, span: Span) {
        self.emit(Diagnostic::warning(code, message, span));
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Move every collected diagnostic out, resetting the counters
    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        self.warning_count = 0;
        std::mem::take(&mut self.diagnostics)
    }

    /// Print all diagnostics to stderr
    pub fn print_all(&self) {
        for diag in &self.diagnostics {
            eprintln!("{}", diag.format());
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        if self.error_count > 0 {
            eprintln!(
                "{}: {} error{} emitted",
                "error".red().bold(),
                self.error_count,
                if self.error_count == 1 { "" } else { "s" }
            );
        }

        if self.warning_count > 0 {
            eprintln!(
                "{}: {} warning{} emitted",
                "warning".yellow().bold(),
                self.warning_count,
                if self.warning_count == 1 { "" } else { "s" }
            );
        }
    }

    /// Export diagnostics as JSON for editors and build tooling
    pub fn to_json(&self) -> String {
        serde_json::json!({ "diagnostics": self.diagnostics }).to_string()
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
    }
}

/// Helpers for the diagnostics the instrumentation pass produces
impl DiagnosticEngine {
    /// The output function is not declared where an instrumented function can see it
    pub fn missing_dependency(&mut self, name: &str, function: &str, span: Span) {
        self.emit(
            Diagnostic::error(
                error_codes::MISSING_DEPENDENCY,
                format!(
                    "plugin requires declaration of {}, please create the function",
                    name
                ),
                span,
            )
            .with_note(format!("instrumentation of `{}` was abandoned", function))
            .with_help(format!("declare `{}` before `{}`", name, function)),
        );
    }

    /// Selection directive placed outside of any function body
    pub fn directive_misuse(&mut self, directive: &str, span: Span) {
        self.emit(
            Diagnostic::warning(
                error_codes::DIRECTIVE_MISUSE,
                "Cannot use pragma outside a function".to_string(),
                span,
            )
            .with_note(format!("`#pragma {}` was ignored", directive)),
        );
    }

    /// A requested target names no function in the unit
    pub fn unknown_target(&mut self, name: &str, span: Span, suggestions: Vec<String>) {
        let mut diag = Diagnostic::warning(
            error_codes::UNKNOWN_TARGET,
            format!("no function named `{}` to instrument", name),
            span,
        );

        if !suggestions.is_empty() {
            diag = diag.with_help(format!("did you mean `{}`?", suggestions.join("`, `")));
        }

        self.emit(diag);
    }

    pub fn version_mismatch(&mut self, required: &str, found: &str) {
        self.emit(
            Diagnostic::error(
                error_codes::VERSION_MISMATCH,
                format!("This plugin is for version {}", required),
                Span::unknown(),
            )
            .with_note(format!("host compiler reports version {}", found)),
        );
    }
}

/// Diagnostic codes
pub mod error_codes {
    // Errors
    pub const MISSING_DEPENDENCY: &str = "E0425";
    pub const VERSION_MISMATCH: &str = "E0514";
    pub const MALFORMED_UNIT: &str = "E0001";

    // Warnings
    pub const DIRECTIVE_MISUSE: &str = "W0101";
    pub const UNKNOWN_TARGET: &str = "W0102";
}

/// Fuzzy matching utilities for "did you mean?" suggestions
pub mod fuzzy {
    use strsim::jaro_winkler;

    /// Names from `candidates` whose Jaro-Winkler similarity to `target`
    /// exceeds `threshold`, best first, at most `max_suggestions` of them
    pub fn find_similar_names(
        target: &str,
        candidates: &[String],
        threshold: f64,
        max_suggestions: usize,
    ) -> Vec<String> {
        let mut scored: Vec<(String, f64)> = candidates
            .iter()
            .map(|candidate| (candidate.clone(), jaro_winkler(target, candidate)))
            .filter(|(_, score)| *score > threshold)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        scored
            .into_iter()
            .take(max_suggestions)
            .map(|(name, _)| name)
            .collect()
    }

    /// Default threshold and limit for function names
    pub fn find_similar_functions(target: &str, candidates: &[String]) -> Vec<String> {
        find_similar_names(target, candidates, 0.8, 3)
    }
}
