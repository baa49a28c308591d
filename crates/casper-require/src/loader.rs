use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::trace;

use casper_utils::{path::append_extension, FileSystem};

use crate::{
    Exports, ExtensionRegistry, ModuleCache, RequireError, RequireResult, StubRegistry,
};

/**
    A module loading function, along with the registries it loads through.

    Implementations that wrap another `Require` are expected to hand out
    the registries of the wrapped loader rather than creating their own.
*/
pub trait Require: fmt::Debug + Send + Sync {
    /**
        Loads the module with the given name.

        # Errors

        Errors if the module can not be found, read, or parsed.
    */
    fn require(&self, name: &str) -> RequireResult<Exports>;

    fn cache(&self) -> &ModuleCache;

    fn extensions(&self) -> &ExtensionRegistry;

    fn stubs(&self) -> &StubRegistry;

    /**
        Returns `true` if this loader already has the layered resolution installed.
    */
    fn is_patched(&self) -> bool {
        false
    }
}

/**
    The generic loader that every other resolution strategy falls back to.

    Given a name, it will try, in order:

    1. A stub registered under that exact name
    2. The name as a path, relative to the working directory
    3. The name as a path with each registered extension appended, in sorted order

    Loaded files are stored in the module cache by absolute path,
    so requiring the same file twice only reads it once.
*/
#[derive(Debug, Clone)]
pub struct PrimitiveLoader {
    fs: Arc<dyn FileSystem>,
    cache: ModuleCache,
    extensions: ExtensionRegistry,
    stubs: StubRegistry,
}

impl PrimitiveLoader {
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            cache: ModuleCache::new(),
            extensions: ExtensionRegistry::new(),
            stubs: StubRegistry::new(),
        }
    }

    fn find_file(&self, name: &str) -> Option<PathBuf> {
        let path = self.fs.absolute(Path::new(name));
        if self.fs.is_file(&path) {
            return Some(path);
        }
        self.extensions
            .extensions()
            .into_iter()
            .map(|ext| append_extension(&path, ext))
            .find(|candidate| self.fs.is_file(candidate))
    }

    /**
        Loads the file at the given absolute path, going through the module cache.

        # Errors

        Errors if the file can not be read, or if its extension handler fails.
    */
    pub fn load_file(&self, path: &Path) -> RequireResult<Exports> {
        if let Some(cached) = self.cache.get(path) {
            trace!(path = %path.display(), "module cache hit");
            return Ok(cached);
        }

        let contents = self.fs.read(path).map_err(|source| RequireError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let handler = self.extensions.handler_for(path)?;
        let exports = handler(path, contents)?;

        trace!(path = %path.display(), "module loaded");
        self.cache.insert(path, exports.clone());
        Ok(exports)
    }
}

impl Require for PrimitiveLoader {
    fn require(&self, name: &str) -> RequireResult<Exports> {
        if let Some(stub) = self.stubs.get(name) {
            trace!(name, "resolved module stub");
            return Ok(stub);
        }
        match self.find_file(name) {
            Some(path) => self.load_file(&path),
            None => Err(RequireError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    fn stubs(&self) -> &StubRegistry {
        &self.stubs
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use casper_utils::HostFs;
    use serde_json::json;

    use super::*;

    fn loader_in(dir: &Path) -> PrimitiveLoader {
        PrimitiveLoader::new(Arc::new(HostFs::with_working_directory(dir)))
    }

    #[test]
    fn stubs_win_over_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("system"), "// not the host module").unwrap();

        let loader = loader_in(dir.path());
        loader
            .stubs()
            .register("system", Exports::stub("system", json!({ "os": "linux" })));

        let exports = loader.require("system").unwrap();
        assert_eq!(exports.filename(), None);
        assert!(matches!(exports, Exports::Stub { ref name, .. } if name == "system"));
    }

    #[test]
    fn probes_registered_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), r#"{ "timeout": 5 }"#).unwrap();
        fs::write(dir.path().join("helpers.js"), "exports.help = 1;").unwrap();

        let loader = loader_in(dir.path());

        let helpers = loader.require("helpers").unwrap();
        assert_eq!(helpers.source(), Some("exports.help = 1;"));
        assert_eq!(helpers.filename(), Some(dir.path().join("helpers.js").as_path()));

        match loader.require("./config").unwrap() {
            Exports::Json { value, .. } => assert_eq!(value["timeout"], 5),
            other => panic!("expected json exports, got {other:?}"),
        }
    }

    #[test]
    fn loaded_files_are_cached_by_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("once.js");
        fs::write(&file, "first").unwrap();

        let loader = loader_in(dir.path());
        assert_eq!(loader.require("once.js").unwrap().source(), Some("first"));

        fs::write(&file, "second").unwrap();
        assert_eq!(loader.require("./once").unwrap().source(), Some("first"));
        assert_eq!(loader.cache().len(), 1);
        assert!(loader.cache().contains(&file));
    }

    #[test]
    fn missing_modules_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let loader = loader_in(dir.path());
        let err = loader.require("nope").unwrap_err();
        assert!(matches!(err, RequireError::NotFound { .. }));
        assert_eq!(err.requested_name(), Some("nope"));
    }

    #[test]
    fn directories_are_not_modules() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("lib")).unwrap();
        let loader = loader_in(dir.path());
        assert!(matches!(
            loader.require("lib"),
            Err(RequireError::NotFound { .. })
        ));
    }
}
