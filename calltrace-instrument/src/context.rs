// Compilation-run context
//
// Owns the state that lives for one translation unit: the target registry,
// the memoized declaration handles and the diagnostics. Every entry point of
// the engine takes it by `&mut`.

use calltrace_ast::{Directive, Item, TranslationUnit};
use calltrace_diagnostics::{DiagnosticEngine, Span};

use crate::config::Config;
use crate::directive::{self, DirectiveKind};
use crate::entry::instrument_entry;
use crate::error::InstrumentError;
use crate::registry::TargetRegistry;
use crate::resolver::{DeclarationResolver, UnitScope, OUTPUT_FUNCTION};
use crate::returns::instrument_returns;
use crate::void_tail::instrument_void_tail;

/// What instrumenting one function inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionReport {
    /// Name call plus one call per parameter
    pub entry_calls: usize,
    /// Returns that received a result call
    pub return_sites: usize,
    pub void_tail: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Not selected for instrumentation
    Skipped,
    Instrumented(FunctionReport),
}

#[derive(Debug, Default)]
pub struct CompilationRun {
    config: Config,
    registry: TargetRegistry,
    resolver: DeclarationResolver,
    diagnostics: DiagnosticEngine,
}

impl CompilationRun {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TargetRegistry {
        &mut self.registry
    }

    pub fn diagnostics(&self) -> &DiagnosticEngine {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticEngine {
        &mut self.diagnostics
    }

    /// Dispatch a pragma met while reading `file`. `enclosing` is the function
    /// whose body contains it. Returns whether the registry was touched;
    /// pragmas of other namespaces are ignored.
    pub fn handle_directive(
        &mut self,
        file: &str,
        directive: &Directive,
        enclosing: Option<&str>,
    ) -> Result<bool, InstrumentError> {
        let Some(DirectiveKind::Debug) = directive::parse(&directive.text, &self.config.namespace)
        else {
            log::trace!("ignoring foreign pragma `{}`", directive.text);
            return Ok(false);
        };

        match enclosing {
            Some(function) => {
                log::debug!("`{}` selected by `#pragma {}`", function, directive.text);
                self.registry.insert(function);
                Ok(true)
            }
            None => {
                log::warn!("`#pragma {}` outside a function", directive.text);
                self.diagnostics
                    .directive_misuse(&directive.text, Span::at(file, directive.location));
                Err(InstrumentError::DirectiveMisuse {
                    directive: directive.text.clone(),
                })
            }
        }
    }

    /// Called once the body of the function at item `index` is complete:
    /// instruments it when it was selected.
    pub fn on_function_body(
        &mut self,
        unit: &mut TranslationUnit,
        index: usize,
    ) -> Result<Outcome, InstrumentError> {
        let selected = match unit.items.get(index) {
            Some(Item::Function(func)) => self.registry.contains(&func.name),
            _ => false,
        };
        if !selected {
            return Ok(Outcome::Skipped);
        }
        self.instrument_function(unit, index).map(Outcome::Instrumented)
    }

    /// Rewrite the body of the function at item `index`, whether or not it
    /// was selected. There is no guard against running twice on one function.
    pub fn instrument_function(
        &mut self,
        unit: &mut TranslationUnit,
        index: usize,
    ) -> Result<FunctionReport, InstrumentError> {
        let untouched = FunctionReport {
            entry_calls: 0,
            return_sites: 0,
            void_tail: false,
        };
        let Some(Item::Function(func)) = unit.items.get(index) else {
            return Ok(untouched);
        };

        // Resolve before touching the tree so a failure leaves it as it was
        let scope = UnitScope::new(unit, index);
        let handle = match self.resolver.resolve(&scope, OUTPUT_FUNCTION, &func.name) {
            Ok(handle) => handle,
            Err(err) => {
                self.diagnostics.missing_dependency(
                    OUTPUT_FUNCTION,
                    &func.name,
                    Span::at(&unit.file, func.location),
                );
                return Err(err);
            }
        };

        let TranslationUnit { ast, items, .. } = unit;
        let Some(Item::Function(func)) = items.get_mut(index) else {
            return Ok(untouched);
        };

        let body = instrument_entry(ast, handle, func);
        let mut report = FunctionReport {
            entry_calls: func.params.len() + 1,
            return_sites: 0,
            void_tail: false,
        };

        func.body = if func.return_type.is_void() {
            report.void_tail = true;
            instrument_void_tail(ast, handle, body)
        } else {
            report.return_sites = instrument_returns(
                ast,
                handle,
                body,
                &func.return_type,
                self.config.return_capture,
            );
            body
        };

        log::info!(
            "instrumented `{}`: {} entry call(s), {} return site(s){}",
            func.name,
            report.entry_calls,
            report.return_sites,
            if report.void_tail { ", void tail" } else { "" }
        );
        Ok(report)
    }
}
