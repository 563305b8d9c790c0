// calltrace-instrument - injects entry/parameter/result logging into selected functions
//
// Pipeline per selected function: resolve printf, prepend the entry calls,
// then either put a result call before the reachable returns or append the
// void-tail call.

pub mod config;
pub mod context;
pub mod directive;
pub mod entry;
pub mod error;
pub mod format;
pub mod plugin;
pub mod registry;
pub mod resolver;
pub mod returns;
pub mod synth;
pub mod void_tail;

pub use config::{Config, ReturnCapture};
pub use context::{CompilationRun, FunctionReport, Outcome};
pub use entry::instrument_entry;
pub use error::{ConfigError, InstrumentError};
pub use format::specifier_for;
pub use plugin::{HostVersion, Plugin, RunReport, BUILT_FOR_HOST};
pub use registry::TargetRegistry;
pub use resolver::{DeclarationResolver, DeclarationScope, UnitScope, OUTPUT_FUNCTION};
pub use returns::instrument_returns;
pub use synth::{colorize, make_call, Message};
pub use void_tail::instrument_void_tail;
