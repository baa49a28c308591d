use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
    process::ExitCode,
};

use thiserror::Error;
use tracing::debug;

use casper_utils::{
    path::{constants::BIN_DIR_NAME, get_current_exe},
    FileSystem, RuntimeVersion, VersionRequirement,
};

use crate::{
    args::{ArgValue, ParsedArgs},
    rt::ProcessEngine,
};

/// Host runtime versions this bootstrap knows how to drive.
pub const SUPPORTED_RUNTIME: VersionRequirement = VersionRequirement::new(1, 1, 0);

pub const CASPER_PATH_OPTION: &str = "casper-path";
pub const CASPER_PATH_ENV: &str = "CASPER_PATH";

/**
    A startup failure that ends the process with a diagnostic on stderr.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FatalExit {
    pub code: u8,
    pub message: String,
}

impl FatalExit {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: 1,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code)
    }
}

/**
    Returns the version of the runtime that will execute scripts,
    as reported by the given engine.

    # Errors

    Errors if the engine can not be run or does not report a valid version.
*/
pub fn host_runtime_version(engine: &ProcessEngine) -> Result<RuntimeVersion, FatalExit> {
    engine
        .version()
        .map_err(|e| FatalExit::new(format!("Unable to determine host runtime version: {e}")))
}

/**
    Checks the host runtime version against the given requirement.

    # Errors

    Errors if the host runtime is not a supported version.
*/
pub fn check_host_version(
    version: &RuntimeVersion,
    requirement: &VersionRequirement,
) -> Result<(), FatalExit> {
    requirement
        .check(version)
        .map_err(|e| FatalExit::new(format!("casper needs a supported host runtime: {e}")))
}

/**
    Where the root installation path was found.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootPathSource {
    Option,
    Environment,
    Executable,
}

/**
    Discovers the root installation path.

    See [`discover_root_path_from`] for the order candidates are tried in.

    # Errors

    Errors if no candidate was found, or if the candidate is not an existing directory.
*/
pub fn discover_root_path(args: &ParsedArgs, fs: &dyn FileSystem) -> Result<PathBuf, FatalExit> {
    discover_root_path_from(
        args,
        env::var_os(CASPER_PATH_ENV),
        get_current_exe().ok(),
        fs,
    )
}

/**
    Discovers the root installation path from explicit inputs, trying in order:

    1. The `--casper-path=<dir>` option
    2. The `CASPER_PATH` environment variable
    3. The directory of the running executable, or its parent if that directory is `bin`

    The chosen candidate is made absolute and must be an existing directory.

    # Errors

    Errors if no candidate was found, or if the candidate is not an existing directory.
*/
pub fn discover_root_path_from(
    args: &ParsedArgs,
    env_value: Option<OsString>,
    current_exe: Option<PathBuf>,
    fs: &dyn FileSystem,
) -> Result<PathBuf, FatalExit> {
    let from_option = args.option(CASPER_PATH_OPTION).and_then(|value| match value {
        ArgValue::Bool(_) => None,
        value => Some(PathBuf::from(value.to_string())),
    });
    let from_env = env_value
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    let from_exe = current_exe.as_deref().and_then(executable_root);

    let candidate = from_option
        .map(|path| (path, RootPathSource::Option))
        .or_else(|| from_env.map(|path| (path, RootPathSource::Environment)))
        .or_else(|| from_exe.map(|path| (path, RootPathSource::Executable)));

    match candidate {
        Some((path, source)) => {
            let root = fs.absolute(&path);
            if fs.is_dir(&root) {
                debug!(root = %root.display(), ?source, "discovered root path");
                Ok(root)
            } else {
                Err(FatalExit::new(format!(
                    "Couldn't find nor compute the casper root path, {} is not a directory",
                    root.display()
                )))
            }
        }
        None => Err(FatalExit::new(
            "Couldn't find nor compute the casper root path, exiting.",
        )),
    }
}

fn executable_root(exe: &Path) -> Option<PathBuf> {
    let dir = exe.parent()?;
    if dir.file_name().is_some_and(|name| name == BIN_DIR_NAME) {
        dir.parent().map(Path::to_path_buf)
    } else {
        Some(dir.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use casper_utils::HostFs;

    use super::*;

    #[cfg(unix)]
    fn engine_reporting(dir: &Path, version: &str) -> ProcessEngine {
        let wrapper = dir.join(format!("engine-{version}.sh"));
        fs::write(&wrapper, format!("echo {version}\n")).unwrap();
        ProcessEngine::new("sh").with_args([wrapper])
    }

    #[cfg(unix)]
    #[test]
    fn supported_engine_version_passes() {
        let dir = tempfile::tempdir().unwrap();
        let host = host_runtime_version(&engine_reporting(dir.path(), "1.9.8")).unwrap();
        assert!(check_host_version(&host, &SUPPORTED_RUNTIME).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn unsupported_engine_versions_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        for reported in ["2.0.0", "1.0.9"] {
            let host = host_runtime_version(&engine_reporting(dir.path(), reported)).unwrap();
            let fatal = check_host_version(&host, &SUPPORTED_RUNTIME).unwrap_err();
            assert_eq!(fatal.code, 1);
            assert!(fatal.message.contains(reported));
        }
    }

    #[test]
    fn engine_that_cannot_run_is_fatal() {
        let fatal =
            host_runtime_version(&ProcessEngine::new("casper-no-such-engine")).unwrap_err();
        assert_eq!(fatal.code, 1);
        assert!(fatal.message.contains("casper-no-such-engine"));
    }

    #[test]
    fn unsupported_host_versions_are_fatal() {
        let old = RuntimeVersion::parse("1.0.9").unwrap();
        let next = RuntimeVersion::parse("2.1.0").unwrap();
        for version in [old, next] {
            let fatal = check_host_version(&version, &SUPPORTED_RUNTIME).unwrap_err();
            assert_eq!(fatal.code, 1);
            assert!(fatal.message.contains(&version.to_string()));
        }
    }

    #[test]
    fn option_wins_over_environment_and_executable() {
        let option_root = tempfile::tempdir().unwrap();
        let env_root = tempfile::tempdir().unwrap();
        let host = HostFs::with_working_directory(option_root.path());

        let args = ParsedArgs::parse([format!(
            "--casper-path={}",
            option_root.path().display()
        )]);
        let root = discover_root_path_from(
            &args,
            Some(env_root.path().into()),
            Some(env_root.path().join("casper")),
            &host,
        )
        .unwrap();
        assert_eq!(root, option_root.path());
    }

    #[test]
    fn environment_wins_over_executable() {
        let env_root = tempfile::tempdir().unwrap();
        let host = HostFs::with_working_directory(env_root.path());

        let root = discover_root_path_from(
            &ParsedArgs::default(),
            Some(env_root.path().into()),
            Some(PathBuf::from("/nonexistent/bin/casper")),
            &host,
        )
        .unwrap();
        assert_eq!(root, env_root.path());
    }

    #[test]
    fn executable_in_bin_dir_uses_parent() {
        let install = tempfile::tempdir().unwrap();
        fs::create_dir(install.path().join(BIN_DIR_NAME)).unwrap();
        let host = HostFs::with_working_directory(install.path());

        let exe = install.path().join(BIN_DIR_NAME).join("casper");
        let root =
            discover_root_path_from(&ParsedArgs::default(), None, Some(exe), &host).unwrap();
        assert_eq!(root, install.path());

        let exe = install.path().join("casper");
        let root =
            discover_root_path_from(&ParsedArgs::default(), None, Some(exe), &host).unwrap();
        assert_eq!(root, install.path());
    }

    #[test]
    fn relative_option_is_made_absolute() {
        let cwd = tempfile::tempdir().unwrap();
        fs::create_dir(cwd.path().join("casperjs")).unwrap();
        let host = HostFs::with_working_directory(cwd.path());

        let args = ParsedArgs::parse(["--casper-path=casperjs"]);
        let root = discover_root_path_from(&args, None, None, &host).unwrap();
        assert_eq!(root, cwd.path().join("casperjs"));
    }

    #[test]
    fn missing_or_invalid_root_is_fatal() {
        let cwd = tempfile::tempdir().unwrap();
        let host = HostFs::with_working_directory(cwd.path());

        let fatal = discover_root_path_from(&ParsedArgs::default(), None, None, &host)
            .unwrap_err();
        assert_eq!(fatal.code, 1);

        let args = ParsedArgs::parse(["--casper-path=does-not-exist"]);
        let fatal = discover_root_path_from(&args, None, None, &host).unwrap_err();
        assert!(fatal.message.contains("does-not-exist"));
    }
}
