use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use casper_utils::{
    path::{
        append_extension,
        constants::{MODULES_DIR_NAME, MODULE_EXTENSION},
    },
    FileSystem,
};

use crate::{
    Exports, ExtensionRegistry, ModuleCache, Require, RequireError, RequireResult, StubRegistry,
};

/**
    The directory the running script's own relative requires are anchored at.

    Set at most once, when the launch plan is known. Clones share the same cell,
    so a resolver installed early still sees the directory once it is set.
*/
#[derive(Debug, Clone, Default)]
pub struct ScriptBaseDir {
    inner: Arc<OnceCell<PathBuf>>,
}

impl ScriptBaseDir {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Sets the base directory, returning `false` if it had already been set.
    */
    pub fn set(&self, dir: impl Into<PathBuf>) -> bool {
        self.inner.set(dir.into()).is_ok()
    }

    #[must_use]
    pub fn get(&self) -> Option<&Path> {
        self.inner.get().map(PathBuf::as_path)
    }
}

/**
    Installs layered module resolution on top of a primitive loader.
*/
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    base_dir: ScriptBaseDir,
}

impl ModuleResolver {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>, base_dir: ScriptBaseDir) -> Self {
        Self {
            root: root.into(),
            fs,
            base_dir,
        }
    }

    /**
        Wraps the given loader in a [`PatchedRequire`].

        Loaders that are already patched are returned as-is, so
        installing more than once never stacks resolution layers.
    */
    #[must_use]
    pub fn install(&self, primitive: Arc<dyn Require>) -> Arc<dyn Require> {
        if primitive.is_patched() {
            trace!("require is already patched, skipping install");
            return primitive;
        }
        debug!(root = %self.root.display(), "installing patched require");
        Arc::new(PatchedRequire {
            resolver: self.clone(),
            cache: primitive.cache().clone(),
            extensions: primitive.extensions().clone(),
            stubs: primitive.stubs().clone(),
            primitive,
        })
    }

    fn builtin_candidate(&self, name: &str) -> PathBuf {
        let modules = self.fs.join(&self.root, Path::new(MODULES_DIR_NAME));
        self.fs
            .join(&modules, &append_extension(name, MODULE_EXTENSION))
    }

    fn local_candidates(&self, name: &str) -> [PathBuf; 2] {
        let base = self
            .base_dir
            .get()
            .map_or_else(|| self.fs.working_directory(), Path::to_path_buf);
        let local = self.fs.absolute(&self.fs.join(&base, Path::new(name)));
        let local_js = append_extension(&local, MODULE_EXTENSION);
        [local, local_js]
    }
}

/**
    A `require` that looks for modules in this order, using the first match:

    1. Builtin modules, at `<root>/modules/<name>.js`
    2. Local modules, at `<base>/<name>` and then `<base>/<name>.js`, where
       `<base>` is the script base directory or the working directory
    3. Whatever the wrapped primitive loader finds for the raw name

    Registries are shared with the wrapped loader, not copied.
*/
#[derive(Debug)]
pub struct PatchedRequire {
    resolver: ModuleResolver,
    primitive: Arc<dyn Require>,
    cache: ModuleCache,
    extensions: ExtensionRegistry,
    stubs: StubRegistry,
}

impl PatchedRequire {
    fn load_path(&self, path: &Path) -> RequireResult<Exports> {
        self.primitive.require(&path.to_string_lossy())
    }
}

impl Require for PatchedRequire {
    fn require(&self, name: &str) -> RequireResult<Exports> {
        let fs = &self.resolver.fs;

        let builtin = self.resolver.builtin_candidate(name);
        if fs.is_file(&builtin) {
            trace!(name, path = %builtin.display(), "resolved builtin module");
            return self.load_path(&builtin);
        }

        if let Some(local) = self
            .resolver
            .local_candidates(name)
            .into_iter()
            .find(|candidate| fs.is_file(candidate))
        {
            trace!(name, path = %local.display(), "resolved local module");
            return self.load_path(&local);
        }

        trace!(name, "falling back to primitive require");
        self.primitive
            .require(name)
            .map_err(|source| RequireError::ModuleNotFound {
                name: name.to_string(),
                source: Box::new(source),
            })
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

    fn is_patched(&self) -> bool {
        true
    }
}
