use anyhow::{Context, Result};
use calltrace_ast::{SourceUnit, TranslationUnit};
use calltrace_diagnostics::{error_codes, DiagnosticEngine, Span};
use calltrace_instrument::{Config, HostVersion, InstrumentError, Plugin, RunReport, BUILT_FOR_HOST};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "calltrace")]
#[command(version)]
#[command(about = "Inject call tracing into C translation units", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Instrument the selected functions of a translation unit
    Instrument {
        /// Translation unit in interchange JSON
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Output form of the rewritten unit
        #[arg(long, value_enum, default_value_t = Emit::Json)]
        emit: Emit,

        /// Instrument this function as well (repeatable)
        #[arg(long = "target", value_name = "NAME")]
        targets: Vec<String>,

        /// Configuration file (default: nearest calltrace.json)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Version reported by the host compiler
        #[arg(long, value_name = "X.Y")]
        host_version: Option<String>,

        /// Output diagnostics and the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a translation unit as C without instrumenting it
    Show {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Print the default calltrace.json
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    Json,
    C,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Instrument {
            input,
            output,
            emit,
            targets,
            config,
            host_version,
            json,
        } => {
            let mut settings = match config {
                Some(path) => Config::from_file(&path)
                    .with_context(|| format!("cannot load {}", path.display()))?,
                None => Config::from_dir(input_dir(&input))?,
            };
            settings.targets.extend(targets);

            let host = match host_version {
                Some(version) => version.parse::<HostVersion>()?,
                None => BUILT_FOR_HOST,
            };

            let mut plugin = match Plugin::init(host, settings) {
                Ok(plugin) => plugin,
                Err(InstrumentError::VersionMismatch { required, found }) => {
                    let mut engine = DiagnosticEngine::new();
                    engine.version_mismatch(&required.to_string(), &found.to_string());
                    report_engine(&engine, json);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            };

            let mut unit = match load_unit(&input) {
                Ok(unit) => unit,
                Err(err) => {
                    let mut engine = DiagnosticEngine::new();
                    engine.emit_error(
                        error_codes::MALFORMED_UNIT,
                        format!("{:#}", err),
                        Span::new(input.display().to_string(), 0, 0),
                    );
                    report_engine(&engine, json);
                    std::process::exit(1);
                }
            };

            let report = plugin.run(&mut unit);

            let rendered = match emit {
                Emit::Json => unit.raise().to_json()?,
                Emit::C => {
                    let fmt_config = calltrace_formatter::Config::from_dir(input_dir(&input))?;
                    calltrace_formatter::emit_unit(&unit, &fmt_config)
                }
            };

            match output {
                Some(ref path) => std::fs::write(path, &rendered)
                    .with_context(|| format!("cannot write {}", path.display()))?,
                None => print!("{}", rendered),
            }

            if json {
                let summary = serde_json::json!({
                    "instrumented": report.instrumented,
                    "skipped": report.skipped,
                    "failed": report.failed,
                    "diagnostics": report.diagnostics,
                });
                eprintln!("{}", summary);
            } else {
                print_report(&report, output.as_deref());
            }

            if report.has_errors() {
                std::process::exit(1);
            }

            Ok(())
        }

        Commands::Show { input } => {
            let unit = load_unit(&input)?;
            let fmt_config = calltrace_formatter::Config::from_dir(input_dir(&input))?;
            print!("{}", calltrace_formatter::emit_unit(&unit, &fmt_config));
            Ok(())
        }

        Commands::Config => {
            println!("{}", Config::example()?);
            Ok(())
        }
    }
}

fn input_dir(input: &Path) -> &Path {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn load_unit(path: &Path) -> Result<TranslationUnit> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let source = SourceUnit::from_json(&json)
        .with_context(|| format!("{} is not a translation unit", path.display()))?;
    let unit = source.lower()?;
    log::debug!("loaded {} with {} item(s)", unit.file, unit.items.len());
    Ok(unit)
}

fn report_engine(engine: &DiagnosticEngine, json: bool) {
    if json {
        eprintln!("{}", engine.to_json());
    } else {
        engine.print_all();
        engine.print_summary();
    }
}

fn print_report(report: &RunReport, output: Option<&Path>) {
    let mut engine = DiagnosticEngine::new();
    for diagnostic in &report.diagnostics {
        engine.emit(diagnostic.clone());
    }
    engine.print_all();

    for name in &report.instrumented {
        eprintln!("{} {}", "instrumented".green().bold(), name);
    }
    for name in &report.failed {
        eprintln!("{} {}", "failed".red().bold(), name);
    }
    if let Some(path) = output {
        eprintln!("✅ Wrote {}", path.display());
    }

    engine.print_summary();
}
