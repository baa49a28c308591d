#![allow(clippy::cargo_common_metadata)]

mod args;
mod bootstrap;
mod context;
mod planner;
mod rt;


pub use crate::args::{ArgValue, ParsedArgs};
pub use crate::bootstrap::{
    check_host_version, discover_root_path, discover_root_path_from, host_runtime_version,
    FatalExit, RootPathSource, CASPER_PATH_ENV, CASPER_PATH_OPTION, SUPPORTED_RUNTIME,
};
pub use crate::context::BootstrapContext;
pub use crate::planner::{
    ExecutionMode, LaunchPlan, LaunchPlanner, Planned, Subcommand, HELP_OPTION, INCLUDES_OPTION,
    VERSION_OPTION,
};
pub use crate::rt::{
    Engine, ProcessEngine, Runtime, RuntimeError, RuntimeResult, Script, CASPER_ENGINE_ENV,
    DEFAULT_ENGINE,
};

pub use casper_require::{Exports, PrimitiveLoader, Require, RequireError};
pub use casper_utils::{FileSystem, HostFs, RuntimeVersion};
