// Source emitter entry point

use crate::config::Config;
use crate::visitor::EmitVisitor;
use anyhow::{Context, Result};
use calltrace_ast::{SourceUnit, TranslationUnit};

pub struct Emitter {
    config: Config,
}

impl Emitter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Render `unit` as C-like source
    pub fn emit(&self, unit: &TranslationUnit) -> String {
        let mut visitor = EmitVisitor::new(&self.config, unit);
        visitor.visit_unit();
        visitor.output()
    }

    /// Lower an interchange unit and render it
    pub fn emit_source(&self, source: &SourceUnit) -> Result<String> {
        let unit = source
            .lower()
            .with_context(|| format!("cannot lower `{}`", source.file))?;
        Ok(self.emit(&unit))
    }

    /// Parse interchange JSON and render it
    pub fn emit_json(&self, json: &str) -> Result<String> {
        let source = SourceUnit::from_json(json).context("invalid translation unit JSON")?;
        self.emit_source(&source)
    }
}
