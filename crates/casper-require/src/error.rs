use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

pub type RequireResult<T, E = RequireError> = Result<T, E>;

#[derive(Debug, Error)]
pub enum RequireError {
    /// The primitive loader found nothing for the given name.
    #[error("no module, stub, or file found for '{name}'")]
    NotFound { name: String },
    /// Every resolution tier failed for the requested module.
    #[error("Can't find module {name}")]
    ModuleNotFound {
        name: String,
        #[source]
        source: Box<RequireError>,
    },
    #[error("unable to read module file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("unable to parse module file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no handler registered for module extension '{extension}'")]
    UnknownExtension { extension: String },
}

impl RequireError {
    /**
        Returns the module name that failed to resolve, if this is a resolution miss.
    */
    #[must_use]
    pub fn requested_name(&self) -> Option<&str> {
        match self {
            Self::NotFound { name } | Self::ModuleNotFound { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }
}
