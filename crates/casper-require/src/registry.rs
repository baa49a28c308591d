use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;

use casper_utils::path::constants::MODULE_EXTENSION;

use crate::{Exports, RequireError, RequireResult};

/**
    Loaded modules, keyed by absolute file path.

    Clones share the same underlying storage, which is what lets
    a patched `require` forward the cache of the loader it wraps.
*/
#[derive(Debug, Clone, Default)]
pub struct ModuleCache {
    inner: Arc<RwLock<HashMap<PathBuf, Exports>>>,
}

impl ModuleCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<Exports> {
        self.inner.read().get(path).cloned()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, exports: Exports) {
        self.inner.write().insert(path.into(), exports);
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.inner.read().contains_key(path)
    }

    pub fn remove(&self, path: &Path) -> Option<Exports> {
        self.inner.write().remove(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /**
        Returns `true` if both handles refer to the same cache.
    */
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/**
    Turns the contents of a module file into its exports.
*/
pub type ExtensionHandler = Arc<dyn Fn(&Path, String) -> RequireResult<Exports> + Send + Sync>;

/**
    Module loaders keyed by file extension, without the leading dot.

    Iteration order is sorted by extension so that probing
    for `<name>.<ext>` candidates is deterministic.
*/
#[derive(Clone)]
pub struct ExtensionRegistry {
    inner: Arc<RwLock<BTreeMap<String, ExtensionHandler>>>,
}

impl ExtensionRegistry {
    /**
        Creates a registry with handlers for `js` (source text) and `json` (parsed data).
    */
    #[must_use]
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register(MODULE_EXTENSION, Arc::new(load_source));
        registry.register("json", Arc::new(load_json));
        registry
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub fn register(&self, extension: impl Into<String>, handler: ExtensionHandler) {
        let extension = extension.into();
        let extension = extension.trim_start_matches('.').to_string();
        self.inner.write().insert(extension, handler);
    }

    #[must_use]
    pub fn get(&self, extension: &str) -> Option<ExtensionHandler> {
        self.inner.read().get(extension).cloned()
    }

    #[must_use]
    pub fn extensions(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }

    /**
        Picks the handler for the given file, falling back to the
        script handler for files with unknown or missing extensions.

        # Errors

        Errors if neither the file's extension nor the script extension has a handler.
    */
    pub fn handler_for(&self, path: &Path) -> RequireResult<ExtensionHandler> {
        let handler = {
            let inner = self.inner.read();
            path.extension()
                .and_then(|ext| ext.to_str())
                .and_then(|ext| inner.get(ext))
                .or_else(|| inner.get(MODULE_EXTENSION))
                .cloned()
        };
        handler.ok_or_else(|| RequireError::UnknownExtension {
            extension: path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}

fn load_source(path: &Path, contents: String) -> RequireResult<Exports> {
    Ok(Exports::Source {
        filename: path.to_path_buf(),
        source: contents.into(),
    })
}

fn load_json(path: &Path, contents: String) -> RequireResult<Exports> {
    let value = serde_json::from_str(&contents).map_err(|source| RequireError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Exports::Json {
        filename: path.to_path_buf(),
        value: Arc::new(value),
    })
}

/**
    Host-provided modules that resolve by exact name, without touching the file system.
*/
#[derive(Debug, Clone, Default)]
pub struct StubRegistry {
    inner: Arc<RwLock<HashMap<String, Exports>>>,
}

impl StubRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<String>, exports: Exports) {
        self.inner.write().insert(name.into(), exports);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Exports> {
        self.inner.read().get(name).cloned()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_extensions_are_sorted() {
        let registry = ExtensionRegistry::new();
        assert_eq!(registry.extensions(), vec!["js", "json"]);
    }

    #[test]
    fn register_strips_leading_dot() {
        let registry = ExtensionRegistry::empty();
        registry.register(".coffee", Arc::new(load_source));
        assert!(registry.get("coffee").is_some());
    }

    #[test]
    fn unknown_extensions_use_the_script_handler() {
        let registry = ExtensionRegistry::new();
        let handler = registry.handler_for(Path::new("/root/bin/bootstrap")).unwrap();
        let exports = handler(Path::new("/root/bin/bootstrap"), "var x;".into()).unwrap();
        assert_eq!(exports.source(), Some("var x;"));

        let empty = ExtensionRegistry::empty();
        assert!(matches!(
            empty.handler_for(Path::new("a.txt")),
            Err(RequireError::UnknownExtension { extension }) if extension == "txt"
        ));
    }

    #[test]
    fn json_handler_parses_data() {
        let registry = ExtensionRegistry::new();
        let path = Path::new("/root/package.json");
        let handler = registry.handler_for(path).unwrap();
        let exports = handler(path, r#"{"version":"1.1.4"}"#.into()).unwrap();
        match exports {
            Exports::Json { value, .. } => assert_eq!(value["version"], "1.1.4"),
            other => panic!("expected json exports, got {other:?}"),
        }
        assert!(matches!(
            handler(path, "{".into()),
            Err(RequireError::Json { .. })
        ));
    }

    #[test]
    fn clones_share_storage() {
        let cache = ModuleCache::new();
        let clone = cache.clone();
        clone.insert("/a.js", Exports::stub("a", serde_json::Value::Null));
        assert!(cache.contains(Path::new("/a.js")));
        assert!(cache.ptr_eq(&clone));
        assert!(!cache.ptr_eq(&ModuleCache::new()));
    }
}
