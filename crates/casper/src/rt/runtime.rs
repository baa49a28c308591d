use std::{path::Path, process::ExitCode, sync::Arc};

use tracing::{debug, warn};

use casper_require::{Exports, Require, RequireError};
use casper_utils::{fmt::Label, path::constants::STDIN_SCRIPT_PATH};

use crate::{
    args::ArgValue,
    context::BootstrapContext,
    planner::{LaunchPlan, INCLUDES_OPTION},
};

use super::{Engine, RuntimeError, RuntimeResult, Script};

/**
    Runs planned scripts with layered module resolution installed.
*/
#[derive(Debug)]
pub struct Runtime {
    context: BootstrapContext,
    require: Arc<dyn Require>,
    engine: Box<dyn Engine>,
}

impl Runtime {
    /**
        Creates a new runtime, installing layered resolution on top of the given primitive loader.
    */
    #[must_use]
    pub fn new(
        context: BootstrapContext,
        primitive: Arc<dyn Require>,
        engine: impl Engine + 'static,
    ) -> Self {
        let require = context.install_require(primitive);
        Self {
            context,
            require,
            engine: Box::new(engine),
        }
    }

    #[must_use]
    pub fn context(&self) -> &BootstrapContext {
        &self.context
    }

    /**
        Resolves a module the same way scripts run by this runtime do.

        # Errors

        Errors if the module can not be found through any resolution strategy.
    */
    pub fn require(&self, name: &str) -> Result<Exports, RequireError> {
        self.require.require(name)
    }

    /**
        Runs the script described by the given plan, see [`Runtime::execute`].

        # Errors

        Errors if the script could not be run, see [`Runtime::execute`].
    */
    pub fn run(&self, plan: &LaunchPlan) -> RuntimeResult<ExitCode> {
        self.execute(plan).map(ExitCode::from)
    }

    /**
        Runs the script described by the given plan, returning its exit status.

        The main script and every module listed in the `includes` option
        are loaded before the engine starts, so a missing file is reported
        here instead of halfway through the script.

        # Errors

        Errors if the main script or an include can not be loaded,
        or if the engine fails to run the script at all.
    */
    pub fn execute(&self, plan: &LaunchPlan) -> RuntimeResult<u8> {
        if !self.context.set_script_base_dir(&plan.script_base_dir) {
            let kept = self.context.script_base_dir();
            warn!(base_dir = ?kept, "script base directory was already set, keeping it");
            eprintln!("{}", kept_base_dir_warning(kept));
        }

        let main = self.load_main(&plan.script_path)?;
        let includes = self.load_includes(plan)?;

        debug!(
            script = %plan.script_path.display(),
            includes = includes.len(),
            "running script"
        );

        self.engine.execute(Script {
            context: &self.context,
            plan,
            main: &main,
            includes: &includes,
            require: self.require.as_ref(),
        })
    }

    fn load_main(&self, script_path: &Path) -> RuntimeResult<Exports> {
        let fs = self.context.fs();
        let script = script_path.display().to_string();

        let loaded = if script_path == Path::new(STDIN_SCRIPT_PATH) {
            fs.read(script_path)
                .map(|source| Exports::Source {
                    filename: script_path.to_path_buf(),
                    source: source.into(),
                })
                .map_err(|source| RequireError::Read {
                    path: script_path.to_path_buf(),
                    source,
                })
        } else {
            let absolute = fs.absolute(script_path);
            self.require.require(&absolute.to_string_lossy())
        };

        loaded.map_err(|source| RuntimeError::Script { script, source })
    }

    fn load_includes(&self, plan: &LaunchPlan) -> RuntimeResult<Vec<Exports>> {
        let Some(ArgValue::String(includes)) = plan.args.option(INCLUDES_OPTION) else {
            return Ok(Vec::new());
        };
        includes
            .split(',')
            .map(str::trim)
            .filter(|include| !include.is_empty())
            .map(|include| {
                self.require
                    .require(include)
                    .map_err(|source| RuntimeError::Include {
                        include: include.to_string(),
                        source,
                    })
            })
            .collect()
    }
}

fn kept_base_dir_warning(kept: Option<&Path>) -> String {
    let kept = kept.map_or_else(|| String::from("?"), |dir| dir.display().to_string());
    Label::Warn.line(format!("Script base directory already set to {kept}, keeping it"))
}
