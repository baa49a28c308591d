use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use once_cell::sync::OnceCell;
use tracing::debug;

use casper_require::{ModuleResolver, Require, ScriptBaseDir};
use casper_utils::{read_package_version, FileSystem, RuntimeVersion};

use crate::{
    args::ParsedArgs,
    bootstrap::{check_host_version, discover_root_path, FatalExit, SUPPORTED_RUNTIME},
    planner::LaunchPlanner,
};

/**
    Process-wide bootstrap state.

    Created once at startup, after the host runtime version and the root
    installation path have been validated. The script base directory and
    the installed `require` are each set at most once.
*/
#[derive(Debug)]
pub struct BootstrapContext {
    root: PathBuf,
    version: RuntimeVersion,
    fs: Arc<dyn FileSystem>,
    script_base_dir: ScriptBaseDir,
    require: OnceCell<Arc<dyn Require>>,
}

impl BootstrapContext {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, version: RuntimeVersion, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            version,
            fs,
            script_base_dir: ScriptBaseDir::new(),
            require: OnceCell::new(),
        }
    }

    /**
        Runs the startup checks and creates the context, in this order:

        1. Checks the host runtime version
        2. Discovers the root installation path
        3. Reads the tool version from `package.json` in the root path

        # Errors

        Errors if any of the steps above fail.
    */
    pub fn bootstrap(
        args: &ParsedArgs,
        fs: Arc<dyn FileSystem>,
        host_version: &RuntimeVersion,
    ) -> Result<Self, FatalExit> {
        check_host_version(host_version, &SUPPORTED_RUNTIME)?;
        let root = discover_root_path(args, fs.as_ref())?;
        let version = read_package_version(fs.as_ref(), &root)
            .map_err(|e| FatalExit::new(format!("Couldn't read casper version: {e}")))?;
        debug!(%version, root = %root.display(), "bootstrapped");
        Ok(Self::new(root, version, fs))
    }

    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /**
        The version of the installation, as read from its `package.json`.
    */
    #[must_use]
    pub fn version(&self) -> &RuntimeVersion {
        &self.version
    }

    #[must_use]
    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    #[must_use]
    pub fn script_base_dir(&self) -> Option<&Path> {
        self.script_base_dir.get()
    }

    /**
        Records the base directory of the running script.

        Returns `false`, leaving the current value in place, if it was already set.
    */
    pub fn set_script_base_dir(&self, dir: impl Into<PathBuf>) -> bool {
        self.script_base_dir.set(dir)
    }

    #[must_use]
    pub fn planner(&self) -> LaunchPlanner<'_> {
        LaunchPlanner::new(&self.root, self.fs.as_ref())
    }

    /**
        Installs layered module resolution on top of the given primitive loader.

        Only the first call installs anything, later calls
        return the `require` that was installed first.
    */
    pub fn install_require(&self, primitive: Arc<dyn Require>) -> Arc<dyn Require> {
        let installed = self.require.get_or_init(|| {
            ModuleResolver::new(
                self.root.clone(),
                Arc::clone(&self.fs),
                self.script_base_dir.clone(),
            )
            .install(primitive)
        });
        Arc::clone(installed)
    }

    #[must_use]
    pub fn require(&self) -> Option<&Arc<dyn Require>> {
        self.require.get()
    }
}
