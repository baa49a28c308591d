use std::{
    env::current_dir,
    fmt,
    fs::read_to_string,
    io::Result as IoResult,
    path::{Path, PathBuf, MAIN_SEPARATOR},
};

use crate::path::make_absolute;

/**
    File system capability used by the bootstrap.

    Every query except [`FileSystem::read`] is side-effect free. All methods
    have default implementations on top of [`std::fs`] and [`std::path`],
    so an implementation only has to say where its working directory is,
    and may override whichever queries it wants to answer differently.
*/
pub trait FileSystem: fmt::Debug + Send + Sync {
    /**
        The directory that relative paths are resolved against.
    */
    fn working_directory(&self) -> PathBuf;

    fn exists(&self, path: &Path) -> bool {
        self.absolute(path).exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        self.absolute(path).is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.absolute(path).is_dir()
    }

    /**
        Makes the given path absolute against the working directory, and cleans it.
    */
    fn absolute(&self, path: &Path) -> PathBuf {
        make_absolute(self.working_directory(), path)
    }

    /**
        Returns the directory component of the given path.

        Returns `None` for paths without any directory component,
        such as a bare file name, and for filesystem roots.
    */
    fn dirname(&self, path: &Path) -> Option<PathBuf> {
        path.parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }

    fn basename(&self, path: &Path) -> Option<String> {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    fn join(&self, base: &Path, segment: &Path) -> PathBuf {
        base.join(segment)
    }

    fn read(&self, path: &Path) -> IoResult<String> {
        read_to_string(self.absolute(path))
    }

    fn separator(&self) -> char {
        MAIN_SEPARATOR
    }
}

/**
    The host file system, anchored at a fixed working directory.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFs {
    cwd: PathBuf,
}

impl HostFs {
    /**
        Creates a host file system anchored at the current working directory.

        # Errors

        Errors if the current working directory is missing or inaccessible.
    */
    pub fn current() -> IoResult<Self> {
        let cwd = dunce::canonicalize(current_dir()?)?;
        Ok(Self { cwd })
    }

    /**
        Creates a host file system anchored at the given directory.

        Relative directories are resolved against the process working directory.
    */
    #[must_use]
    pub fn with_working_directory(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let cwd = match current_dir() {
            Ok(process_cwd) => make_absolute(process_cwd, &dir),
            Err(_) => dir,
        };
        Self { cwd }
    }
}

impl FileSystem for HostFs {
    fn working_directory(&self) -> PathBuf {
        self.cwd.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn dirname_of_bare_file_name_is_none() {
        let fs = HostFs::with_working_directory("/");
        assert_eq!(fs.dirname(Path::new("suite.js")), None);
        assert_eq!(
            fs.dirname(Path::new("tests/suite.js")),
            Some(PathBuf::from("tests"))
        );
    }

    #[test]
    fn basename_returns_last_component() {
        let fs = HostFs::with_working_directory("/");
        assert_eq!(
            fs.basename(Path::new("tests/suites/casper.js")).as_deref(),
            Some("casper.js")
        );
        assert_eq!(fs.basename(Path::new("/")), None);
    }

    #[test]
    fn queries_resolve_relative_to_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("modules")).unwrap();
        fs::write(dir.path().join("modules").join("utils.js"), "exports.ok = true;").unwrap();

        let host = HostFs::with_working_directory(dir.path());
        let rel = Path::new("modules/utils.js");

        assert!(host.exists(rel));
        assert!(host.is_file(rel));
        assert!(host.is_dir(Path::new("modules")));
        assert!(!host.is_file(Path::new("modules")));
        assert_eq!(host.read(rel).unwrap(), "exports.ok = true;");
        assert_eq!(host.absolute(rel), dir.path().join("modules").join("utils.js"));
    }
}
