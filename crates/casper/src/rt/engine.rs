use std::{
    env,
    ffi::OsString,
    fmt,
    process::Command,
};

use tracing::debug;

use casper_require::{Exports, Require};
use casper_utils::RuntimeVersion;

use crate::{context::BootstrapContext, planner::LaunchPlan};

use super::{RuntimeError, RuntimeResult};

pub const CASPER_ENGINE_ENV: &str = "CASPER_ENGINE";
pub const DEFAULT_ENGINE: &str = "phantomjs";

/**
    Everything an engine needs to execute a planned script.
*/
#[derive(Clone, Copy)]
pub struct Script<'a> {
    pub context: &'a BootstrapContext,
    pub plan: &'a LaunchPlan,
    /// The main script, as loaded through the installed `require`.
    pub main: &'a Exports,
    /// Modules listed in the `includes` option, in order.
    pub includes: &'a [Exports],
    pub require: &'a dyn Require,
}

impl fmt::Debug for Script<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script")
            .field("plan", self.plan)
            .field("main", &self.main.filename())
            .field("includes", &self.includes.len())
            .finish_non_exhaustive()
    }
}

/**
    Executes a planned script, returning its exit status.
*/
pub trait Engine: fmt::Debug {
    /**
        # Errors

        Errors if the engine could not run the script at all. Scripts
        that run and fail should report that through their exit status.
    */
    fn execute(&self, script: Script<'_>) -> RuntimeResult<u8>;
}

/**
    Runs scripts in an external interpreter process.

    The interpreter receives the script path followed by the script arguments,
    with options re-encoded as `--name=value`, and learns about the bootstrap
    through the `CASPER_PATH`, `CASPER_SCRIPT_BASE_DIR`, `CASPER_TEST`,
    and `CASPER_SELFTEST` environment variables.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEngine {
    program: OsString,
    args: Vec<OsString>,
}

impl ProcessEngine {
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /**
        Adds arguments given to the interpreter before anything else,
        such as interpreter flags or a wrapper script.
    */
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /**
        Creates an engine for the interpreter named by `CASPER_ENGINE`,
        or the default interpreter if that variable is unset or empty.
    */
    #[must_use]
    pub fn from_env() -> Self {
        let program = env::var_os(CASPER_ENGINE_ENV)
            .filter(|program| !program.is_empty())
            .unwrap_or_else(|| DEFAULT_ENGINE.into());
        Self::new(program)
    }

    #[must_use]
    pub fn program(&self) -> &OsString {
        &self.program
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /**
        Asks the interpreter for its version by running it with `--version`.

        The first whitespace separated word of its output is parsed as the version.

        # Errors

        Errors if the interpreter could not be started, exited unsuccessfully,
        or printed something that is not a version.
    */
    pub fn version(&self) -> RuntimeResult<RuntimeVersion> {
        let program = self.program_name();
        debug!(%program, "querying script engine version");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--version")
            .output()
            .map_err(|source| RuntimeError::Spawn {
                program: program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(RuntimeError::NoVersion { program });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reported = stdout.split_whitespace().next().unwrap_or_default();
        RuntimeVersion::parse(reported).map_err(|source| RuntimeError::Version { program, source })
    }

    fn command(&self, script: &Script<'_>) -> Command {
        let plan = script.plan;
        let flag = |enabled: bool| if enabled { "1" } else { "0" };

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&plan.script_path)
            .args(plan.args.to_raw())
            .env("CASPER_PATH", script.context.root_path())
            .env("CASPER_SCRIPT_BASE_DIR", &plan.script_base_dir)
            .env("CASPER_TEST", flag(plan.is_test()))
            .env("CASPER_SELFTEST", flag(plan.is_self_test()));
        command
    }
}

impl Default for ProcessEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE)
    }
}

impl Engine for ProcessEngine {
    fn execute(&self, script: Script<'_>) -> RuntimeResult<u8> {
        let program = self.program_name();
        debug!(%program, script = %script.plan.script_path.display(), "spawning script engine");

        let status = self
            .command(&script)
            .status()
            .map_err(|source| RuntimeError::Spawn {
                program: program.clone(),
                source,
            })?;

        match status.code() {
            Some(code) => Ok(u8::try_from(code).unwrap_or(1)),
            None => Err(RuntimeError::Terminated { program }),
        }
    }
}
