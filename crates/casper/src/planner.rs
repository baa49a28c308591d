use std::path::{Path, PathBuf};

use tracing::debug;

use casper_utils::{
    path::constants::{
        SELFTEST_FILE_NAME, SELFTEST_SUITES_DIR_NAME, STDIN_SCRIPT_PATH, TESTS_DIR_NAME,
        TEST_RUNNER_FILE_NAME,
    },
    FileSystem,
};

use crate::{args::ParsedArgs, bootstrap::FatalExit};

pub const VERSION_OPTION: &str = "version";
pub const HELP_OPTION: &str = "help";
pub const INCLUDES_OPTION: &str = "includes";

/**
    Subcommands that redirect execution to the bundled test runner.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    Test,
    SelfTest,
}

impl Subcommand {
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "test" => Some(Self::Test),
            "selftest" => Some(Self::SelfTest),
            _ => None,
        }
    }

    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::SelfTest => "selftest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Script,
    Test,
    SelfTest,
}

/**
    What to run, from where, and how.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchPlan {
    pub script_path: PathBuf,
    pub script_base_dir: PathBuf,
    pub mode: ExecutionMode,
    /// Arguments for the script, with the launcher's own tokens dropped.
    pub args: ParsedArgs,
}

impl LaunchPlan {
    #[must_use]
    pub fn is_test(&self) -> bool {
        matches!(self.mode, ExecutionMode::Test | ExecutionMode::SelfTest)
    }

    #[must_use]
    pub fn is_self_test(&self) -> bool {
        self.mode == ExecutionMode::SelfTest
    }
}

/**
    The outcome of planning a launch.

    `Version` and `Help` mean the process should print the
    corresponding text to stdout and exit successfully.
*/
#[derive(Debug, Clone, PartialEq)]
pub enum Planned {
    Version,
    Help,
    Launch(LaunchPlan),
}

/**
    Turns parsed command line arguments into a [`Planned`] outcome.
*/
#[derive(Debug, Clone, Copy)]
pub struct LaunchPlanner<'a> {
    root: &'a Path,
    fs: &'a dyn FileSystem,
}

impl<'a> LaunchPlanner<'a> {
    #[must_use]
    pub fn new(root: &'a Path, fs: &'a dyn FileSystem) -> Self {
        Self { root, fs }
    }

    fn tests_path(&self, segment: &str) -> PathBuf {
        let tests = self.fs.join(self.root, Path::new(TESTS_DIR_NAME));
        self.fs.join(&tests, Path::new(segment))
    }

    fn runner_path(&self) -> PathBuf {
        self.fs.absolute(&self.tests_path(TEST_RUNNER_FILE_NAME))
    }

    /**
        Directory of the given path, or `.` for paths without a directory component.
    */
    fn base_dir_of(&self, path: &Path) -> PathBuf {
        match self.fs.dirname(path) {
            Some(dir) if dir != path => dir,
            _ => PathBuf::from("."),
        }
    }

    /**
        Plans a launch from the given arguments.

        Decisions are made in this order, the first match wins:

        1. `--version` prints the version
        2. `test <path>` runs the test runner against `<path>`
        3. `selftest [path]` runs the test runner against the bundled self tests
        4. No positionals, or `--help`, prints help
        5. Anything else runs the first positional as a script

        # Errors

        Errors if the script to run is not an existing file.
    */
    pub fn plan(&self, mut args: ParsedArgs) -> Result<Planned, FatalExit> {
        if args.is_truthy(VERSION_OPTION) {
            return Ok(Planned::Version);
        }

        let subcommand = args.get(0).and_then(Subcommand::from_token);
        let (script_path, mode, base_dir) = match subcommand {
            Some(Subcommand::Test) => {
                args.remove(0);
                let base_dir = args
                    .get(0)
                    .map_or_else(|| PathBuf::from("."), |first| self.base_dir_of(Path::new(first)));
                (self.runner_path(), ExecutionMode::Test, Some(base_dir))
            }
            Some(Subcommand::SelfTest) => {
                args.set_option(
                    INCLUDES_OPTION,
                    self.tests_path(SELFTEST_FILE_NAME).to_string_lossy().into_owned(),
                );
                if args.len() <= 1 {
                    args.push(
                        self.tests_path(SELFTEST_SUITES_DIR_NAME)
                            .to_string_lossy()
                            .into_owned(),
                    );
                }
                args.remove(0);
                let runner = self.runner_path();
                let anchor = match args.get(1) {
                    Some(second) => PathBuf::from(second),
                    None => self.base_dir_of(&runner),
                };
                let base_dir = self.base_dir_of(&anchor);
                (runner, ExecutionMode::SelfTest, Some(base_dir))
            }
            None => {
                if args.is_empty() || args.is_truthy(HELP_OPTION) {
                    return Ok(Planned::Help);
                }
                let script = args.get(0).map(PathBuf::from).unwrap_or_default();
                (script, ExecutionMode::Script, None)
            }
        };

        if script_path != Path::new(STDIN_SCRIPT_PATH) && !self.fs.is_file(&script_path) {
            return Err(FatalExit::new(format!(
                "Unable to open file: {}",
                script_path.display()
            )));
        }

        let script_base_dir =
            base_dir.unwrap_or_else(|| self.base_dir_of(&self.fs.absolute(&script_path)));

        args.drop_positional(&script_path.to_string_lossy());

        debug!(
            script = %script_path.display(),
            base_dir = %script_base_dir.display(),
            ?mode,
            "planned launch"
        );

        Ok(Planned::Launch(LaunchPlan {
            script_path,
            script_base_dir,
            mode,
            args,
        }))
    }
}
