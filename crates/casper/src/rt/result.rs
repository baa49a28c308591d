use std::io::Error as IoError;

use thiserror::Error;

use casper_require::RequireError;
use casper_utils::VersionError;

pub type RuntimeResult<T, E = RuntimeError> = Result<T, E>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Unable to load script {script}: {source}")]
    Script {
        script: String,
        #[source]
        source: RequireError,
    },
    #[error("Unable to load include {include}: {source}")]
    Include {
        include: String,
        #[source]
        source: RequireError,
    },
    #[error("Failed to start script engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: IoError,
    },
    #[error("Script engine '{program}' was terminated without an exit status")]
    Terminated { program: String },
    #[error("Script engine '{program}' did not report its version")]
    NoVersion { program: String },
    #[error("Script engine '{program}' reported an invalid version: {source}")]
    Version {
        program: String,
        #[source]
        source: VersionError,
    },
}
