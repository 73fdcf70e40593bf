//! Command-line front end (§4.11): `-r PATH` compiles and runs a script,
//! `-d PATH` additionally prints its disassembly first. Parsing, compiling,
//! and booting all happen here — this binary is the only place the whole
//! pipeline (`djs-parser` -> `djs-compiler` -> `djs-builtins` -> `djs-vm`)
//! is wired together.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing_subscriber::filter::EnvFilter;

use djs_ast::{SourceId, TranslationUnit};
use djs_vm::{Vm, VmConfig, VmStatus};

#[derive(Parser)]
#[command(name = "djs", version, about = "A compact ES5-subset bytecode interpreter", disable_version_flag = true)]
struct Cli {
    /// Compile and run a script.
    #[arg(short = 'r', long = "run", value_name = "PATH", conflicts_with = "disassemble")]
    run: Option<PathBuf>,

    /// Print the compiled program's disassembly, then run it.
    #[arg(short = 'd', long = "disassemble", value_name = "PATH")]
    disassemble: Option<PathBuf>,

    /// Print version and exit.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: (),
}

/// What a full pipeline attempt produced, for `main` to turn into an exit
/// code. `Failed` covers every error path that already printed its own
/// diagnostic (parse/compile snippets, setup errors) so `main` never
/// double-reports.
enum Outcome {
    Ran(VmStatus),
    Failed,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let path = match (&cli.run, &cli.disassemble) {
        (Some(p), None) => p,
        (None, Some(p)) => p,
        (None, None) => {
            eprintln!("djs: nothing to do, pass -r PATH or -d PATH (see -h)");
            return ExitCode::FAILURE;
        }
        (Some(_), Some(_)) => unreachable!("clap rejects -r and -d together"),
    };

    match run_pipeline(path, cli.disassemble.is_some()) {
        Ok(Outcome::Ran(status)) if status.is_ok() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("djs: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_pipeline(path: &Path, disassemble: bool) -> anyhow::Result<Outcome> {
    let filename = path.display().to_string();
    let source = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {filename}: {e}"))?;

    let source_unit = match djs_parser::parse_source(&source, SourceId(0), &filename) {
        Ok(unit) => unit,
        Err(e) => {
            eprintln!("{}", e.snippet(&filename, &source));
            return Ok(Outcome::Failed);
        }
    };
    let unit = TranslationUnit::single(source_unit);

    let (preload, registry) = djs_builtins::catalog();
    let program = match djs_compiler::compile(&unit, &preload) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", e.snippet(&filename, &source));
            return Ok(Outcome::Failed);
        }
    };

    if disassemble {
        print!("{}", djs_vm::disasm::disassemble(&program));
    }

    let mut vm = match Vm::boot(program, VmConfig::default(), registry) {
        Ok(vm) => vm,
        Err(e) => {
            eprintln!("djs: {e}");
            return Ok(Outcome::Failed);
        }
    };

    let status = vm.run();
    if let Some(exception) = vm.uncaught_exception() {
        eprintln!("uncaught exception: {exception}");
    }
    Ok(Outcome::Ran(status))
}
