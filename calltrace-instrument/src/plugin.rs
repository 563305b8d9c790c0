// Host-facing side of the pass: version gate and callback replay.

use std::fmt;
use std::str::FromStr;

use calltrace_ast::{Directive, Item, TranslationUnit};
use calltrace_diagnostics::{Diagnostic, Span};

use crate::config::Config;
use crate::context::{CompilationRun, Outcome};
use crate::error::InstrumentError;
use crate::registry::TargetRegistry;

/// Host compiler release the engine is built against
pub const BUILT_FOR_HOST: HostVersion = HostVersion::new(14, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostVersion {
    pub major: u32,
    pub minor: u32,
}

impl HostVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Accepts `major.minor` and `major.minor.patch`; the patch level is ignored
impl FromStr for HostVersion {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InstrumentError::InvalidVersion(s.to_string());
        let mut parts = s.trim().split('.');

        let major = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let minor = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        match (parts.next(), parts.next()) {
            (None, None) => {}
            (Some(patch), None) if patch.parse::<u32>().is_ok() => {}
            _ => return Err(invalid()),
        }

        Ok(Self::new(major, minor))
    }
}

/// Result of running the plugin over one translation unit
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub instrumented: Vec<String>,
    pub skipped: Vec<String>,
    /// Functions whose instrumentation was abandoned
    pub failed: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// The instrumentation pass as loaded into a host
#[derive(Debug)]
pub struct Plugin {
    run: CompilationRun,
}

impl Plugin {
    /// Refuses hosts whose major.minor differs from [`BUILT_FOR_HOST`]
    pub fn init(host: HostVersion, config: Config) -> Result<Self, InstrumentError> {
        if host != BUILT_FOR_HOST {
            log::error!("host {} does not match {}", host, BUILT_FOR_HOST);
            return Err(InstrumentError::VersionMismatch {
                required: BUILT_FOR_HOST,
                found: host,
            });
        }

        log::debug!("plugin initialized for host {}", host);
        Ok(Self {
            run: CompilationRun::new(config),
        })
    }

    pub fn context(&self) -> &CompilationRun {
        &self.run
    }

    pub fn context_mut(&mut self) -> &mut CompilationRun {
        &mut self.run
    }

    /// Replay the host's callbacks over `unit` in source order: pragmas are
    /// dispatched where they appear, and each function is offered to the
    /// engine once its body (and the pragmas inside it) has been seen.
    pub fn run(&mut self, unit: &mut TranslationUnit) -> RunReport {
        let mut report = RunReport::default();
        self.select_configured_targets(unit);

        for index in 0..unit.items.len() {
            let (name, directives) = match unit.items.get(index) {
                Some(Item::Directive(directive)) => {
                    self.apply_directive(&unit.file, directive, None);
                    continue;
                }
                Some(Item::Function(func)) => (func.name.clone(), func.directives.clone()),
                _ => continue,
            };

            for directive in &directives {
                self.apply_directive(&unit.file, directive, Some(&name));
            }

            match self.run.on_function_body(unit, index) {
                Ok(Outcome::Instrumented(_)) => report.instrumented.push(name),
                Ok(Outcome::Skipped) => report.skipped.push(name),
                Err(err) => {
                    log::error!("`{}` left uninstrumented: {}", name, err);
                    report.failed.push(name);
                }
            }
        }

        report.diagnostics = self.run.diagnostics_mut().take();
        report
    }

    /// Targets named in the configuration, checked against the unit
    fn select_configured_targets(&mut self, unit: &TranslationUnit) {
        if self.run.config().targets.is_empty() {
            return;
        }

        let functions = unit.function_names();
        let targets = self.run.config().targets.clone();
        for target in targets {
            if !functions.contains(&target) {
                let suggestions = TargetRegistry::suggest(&target, &functions);
                self.run.diagnostics_mut().unknown_target(
                    &target,
                    Span::new(unit.file.clone(), 0, 0),
                    suggestions,
                );
                continue;
            }
            self.run.registry_mut().insert(target);
        }
    }

    /// Misuse is already recorded as a warning; the run goes on either way
    fn apply_directive(&mut self, file: &str, directive: &Directive, enclosing: Option<&str>) {
        match self.run.handle_directive(file, directive, enclosing) {
            Ok(true) => {}
            Ok(false) => log::trace!("`#pragma {}` left to the host", directive.text),
            Err(err) => log::debug!("{}; continuing", err),
        }
    }
}
