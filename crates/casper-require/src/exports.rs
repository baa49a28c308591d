use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde_json::Value as JsonValue;

/**
    The value a module resolves to.

    Cheap to clone, the module contents are shared.
*/
#[derive(Debug, Clone, PartialEq)]
pub enum Exports {
    /// A script module, its source text to be evaluated by the engine.
    Source { filename: PathBuf, source: Arc<str> },
    /// A data module, parsed from a `.json` file.
    Json {
        filename: PathBuf,
        value: Arc<JsonValue>,
    },
    /// A module provided by the host, registered by name.
    Stub { name: String, value: Arc<JsonValue> },
}

impl Exports {
    #[must_use]
    pub fn stub(name: impl Into<String>, value: JsonValue) -> Self {
        Self::Stub {
            name: name.into(),
            value: Arc::new(value),
        }
    }

    /**
        The file this module was loaded from, if it was loaded from a file.
    */
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        match self {
            Self::Source { filename, .. } | Self::Json { filename, .. } => {
                Some(filename.as_path())
            }
            Self::Stub { .. } => None,
        }
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Source { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
