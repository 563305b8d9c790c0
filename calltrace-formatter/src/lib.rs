// calltrace-formatter - renders translation units as C-like source
// Used for before/after views of instrumented code

pub mod config;
pub mod emitter;
pub mod rules;
pub mod visitor;

pub use config::{BraceStyle, Config};
pub use emitter::Emitter;

use anyhow::Result;
use calltrace_ast::TranslationUnit;
use std::path::Path;

/// Render a translation unit stored as interchange JSON
pub fn emit_file<P: AsRef<Path>>(path: P, config: &Config) -> Result<String> {
    let json = std::fs::read_to_string(path.as_ref())?;
    Emitter::new(config.clone()).emit_json(&json)
}

pub fn emit_unit(unit: &TranslationUnit, config: &Config) -> String {
    Emitter::new(config.clone()).emit(unit)
}

/// Render with default configuration
pub fn emit_with_defaults(unit: &TranslationUnit) -> String {
    emit_unit(unit, &Config::default())
}
