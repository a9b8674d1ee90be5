//! `cffc` — compile a CFF program into `Machine.h` / `Machine.cpp`.
//!
//! Exit codes: 0 success, 1 no input file given, 2 input file not found,
//! 3 syntax errors, 4 internal compiler error, 5 output not writable,
//! 6 explicit config unusable, 7 input file unreadable.

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use tempfile::NamedTempFile;

use cffc::cff::{self, codegen, CompileError, ErrorKind, GeneratedMachine, ResolvedProgram};
use cffc::config::CompilerConfig;

const EXIT_USAGE: u8 = 1;
const EXIT_NOT_FOUND: u8 = 2;
const EXIT_SYNTAX: u8 = 3;
const EXIT_INTERNAL: u8 = 4;
const EXIT_WRITE: u8 = 5;
const EXIT_CONFIG: u8 = 6;
const EXIT_UNREADABLE: u8 = 7;

#[derive(Debug, Parser)]
#[command(name = "cffc", version, about = "Compile your CFF program")]
struct Cli {
    /// CFF source file
    filename: Option<PathBuf>,

    /// Directory for the generated files (overrides the config)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Config file (default: ./cffc.yaml, then ~/.cffc/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the resolved program as JSON instead of writing files
    #[arg(long)]
    dump_ast: bool,

    /// Log every compiler phase
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let Some(filename) = cli.filename.as_deref() else {
        println!("Usage: cffc <filename>");
        return ExitCode::from(EXIT_USAGE);
    };

    let mut config = match &cli.config {
        Some(path) => match CompilerConfig::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::from(EXIT_CONFIG);
            }
        },
        None => CompilerConfig::discover(),
    };
    if let Some(dir) = cli.out_dir {
        config.output_dir = dir;
    }

    let bytes = match std::fs::read(filename) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            println!("File \"{}\" not found.", filename.display());
            return ExitCode::from(EXIT_NOT_FOUND);
        }
        Err(e) => {
            println!("Cannot read file \"{}\": {e}", filename.display());
            return ExitCode::from(EXIT_UNREADABLE);
        }
    };
    // Stray bytes become U+FFFD, which the lexer reports like any other
    // unknown character.
    let text = String::from_utf8_lossy(&bytes);
    if matches!(text, Cow::Owned(_)) {
        warn!("{} is not valid UTF-8", filename.display());
    }

    let result = cff::compile(&text);
    if !result.ok {
        if result.error().map(CompileError::kind) == Some(ErrorKind::Internal) {
            println!("Internal compiler error: {}", result.error_message);
            return ExitCode::from(EXIT_INTERNAL);
        }
        println!("Syntax errors in CFF program: \n{}", result.error_message);
        return ExitCode::from(EXIT_SYNTAX);
    }
    let Some(program) = result.ast else {
        println!("Internal compiler error, failed to create AST.");
        return ExitCode::from(EXIT_INTERNAL);
    };

    if cli.dump_ast {
        return match serde_json::to_string_pretty(&program) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                println!("Internal compiler error: {e}");
                ExitCode::from(EXIT_INTERNAL)
            }
        };
    }

    let output = match codegen::generate(&program, &config.codegen_options()) {
        Ok(output) => output,
        Err(e) => {
            println!("Internal compiler error, failed to generate code.\n{e}");
            return ExitCode::from(EXIT_INTERNAL);
        }
    };

    if let Err(e) = write_outputs(&config, &output) {
        eprintln!("{e:#}");
        return ExitCode::from(EXIT_WRITE);
    }

    report(filename, &program, &config);
    ExitCode::SUCCESS
}

/// Stage both documents next to their targets, then move them into place,
/// so a failed write never leaves a new header beside a stale implementation.
fn write_outputs(config: &CompilerConfig, output: &GeneratedMachine) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Creating {}", config.output_dir.display()))?;

    let header = config.header_path();
    let implementation = config.implementation_path();
    let staged_header = stage(&header, &output.header)?;
    let staged_implementation = stage(&implementation, &output.implementation)?;

    staged_header
        .persist(&header)
        .with_context(|| format!("Writing {}", header.display()))?;
    staged_implementation.persist(&implementation).with_context(|| {
        format!(
            "Writing {} ({} was already replaced)",
            implementation.display(),
            header.display()
        )
    })?;

    Ok(())
}

fn stage(target: &Path, contents: &str) -> anyhow::Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Writing {}", target.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Writing {}", target.display()))?;
    Ok(file)
}

fn report(filename: &Path, program: &ResolvedProgram, config: &CompilerConfig) {
    let counts = program.counts();
    info!(
        "compiled {} into {} and {}",
        filename.display(),
        config.header_path().display(),
        config.implementation_path().display()
    );
    println!(
        "{}: {} declarations, {} states, {} variable uses",
        program.name(),
        counts.decls,
        counts.states,
        counts.variable_uses
    );
}
