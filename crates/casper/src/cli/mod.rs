use std::{env::args_os, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Command, CommandFactory, Parser};

use casper::{
    host_runtime_version, BootstrapContext, FatalExit, FileSystem, HostFs, ParsedArgs, Planned,
    PrimitiveLoader, ProcessEngine, Runtime, RuntimeVersion,
};
use casper_utils::fmt::Label;

const AFTER_HELP: &str = "\
Subcommands:
  test <path> [args...]       Run the test runner against the given test files
  selftest [path] [args...]   Run the bundled self tests

Environment:
  CASPER_PATH                 Casper installation to use when --casper-path is not given
  CASPER_ENGINE               Interpreter used to run scripts (default: phantomjs)
  RUST_LOG                    Log filter for bootstrap diagnostics";

/**
    Describes the command line surface, used to render help.

    Arguments are not parsed through this, since scripts accept arbitrary
    options that are passed along to them, see [`ParsedArgs`] instead.
*/
#[derive(Parser, Debug, Clone)]
#[command(
    name = "casper",
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true,
    after_help = AFTER_HELP
)]
#[allow(dead_code)]
struct Usage {
    /// Script to run
    #[arg(value_name = "SCRIPT")]
    script: Option<String>,
    /// Arguments and options passed along to the script
    #[arg(value_name = "ARGS")]
    args: Vec<String>,
    /// Use the casper installation in the given directory
    #[arg(long, value_name = "DIR")]
    casper_path: Option<String>,
    /// Print the casper version
    #[arg(long)]
    version: bool,
    /// Print this help
    #[arg(long)]
    help: bool,
}

fn usage(version: &RuntimeVersion) -> Command {
    Usage::command().about(format!(
        "Casper {version}, a navigation scripting and testing launcher"
    ))
}

pub(crate) fn help_text(version: &RuntimeVersion) -> String {
    usage(version).render_long_help().to_string()
}

fn report_fatal(fatal: &FatalExit) -> ExitCode {
    eprintln!("{}", Label::Error.line(&fatal.message));
    fatal.exit_code()
}

#[derive(Debug, Clone, Default)]
pub struct Cli {
    args: ParsedArgs,
}

impl Cli {
    pub fn new() -> Self {
        Self::from_args(
            args_os()
                .skip(1)
                .map(|arg| arg.to_string_lossy().into_owned()),
        )
    }

    pub fn from_args<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            args: ParsedArgs::parse(raw),
        }
    }

    pub fn run(self) -> Result<ExitCode> {
        let engine = ProcessEngine::from_env();
        let host = match host_runtime_version(&engine) {
            Ok(host) => host,
            Err(fatal) => return Ok(report_fatal(&fatal)),
        };

        let fs: Arc<dyn FileSystem> =
            Arc::new(HostFs::current().context("Failed to find the current working directory")?);

        let ctx = match BootstrapContext::bootstrap(&self.args, fs, &host) {
            Ok(ctx) => ctx,
            Err(fatal) => return Ok(report_fatal(&fatal)),
        };

        let plan = match ctx.planner().plan(self.args) {
            Ok(Planned::Version) => {
                println!("{}", ctx.version());
                return Ok(ExitCode::SUCCESS);
            }
            Ok(Planned::Help) => {
                println!("{}", help_text(ctx.version()));
                return Ok(ExitCode::SUCCESS);
            }
            Ok(Planned::Launch(plan)) => plan,
            Err(fatal) => return Ok(report_fatal(&fatal)),
        };

        let primitive = Arc::new(PrimitiveLoader::new(Arc::clone(ctx.fs())));
        let rt = Runtime::new(ctx, primitive, engine);

        Ok(match rt.run(&plan) {
            Ok(code) => code,
            Err(err) => {
                eprintln!("{}", Label::Error.line(err));
                ExitCode::FAILURE
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_subcommands_and_options() {
        let version = RuntimeVersion::parse("1.1.4").unwrap();
        let help = help_text(&version);
        assert!(help.contains("--casper-path"));
        assert!(help.contains("selftest [path]"));
        assert!(help.contains("CASPER_ENGINE"));
        assert!(help.contains("Casper 1.1.4"));
    }

    #[test]
    fn from_args_keeps_script_options() {
        let cli = Cli::from_args(["script.js", "--url=http://localhost:8080", "--verbose"]);
        assert_eq!(cli.args.get(0), Some("script.js"));
        assert!(cli.args.is_truthy("verbose"));
    }

    #[test]
    fn usage_describes_a_valid_command() {
        usage(&RuntimeVersion::parse("1.1.4").unwrap()).debug_assert();
    }
}
