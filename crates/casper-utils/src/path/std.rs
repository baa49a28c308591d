/*!
    Utilities for working with Rust standard library paths.
*/

use std::{
    env::current_exe,
    ffi::OsStr,
    io::Result as IoResult,
    path::{Path, PathBuf},
};

use path_clean::PathClean;

/**
    Gets the path to the current executable as an absolute path.

    This absolute path is canonicalized and does not contain any `.` or `..`
    components, and it is also in a friendly (non-UNC) format.

    # Errors

    Errors if the current executable can not be located or canonicalized.
*/
pub fn get_current_exe() -> IoResult<PathBuf> {
    dunce::canonicalize(current_exe()?)
}

/**
    Cleans a path.

    See the [`path_clean`] crate for more information on what cleaning a path does.
*/
#[must_use]
pub fn clean_path(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref().clean()
}

/**
    Makes a path absolute, if it is relative, and then cleans it.

    Relative paths are resolved against the given `base` directory,
    which is expected to already be absolute.
*/
#[must_use]
pub fn make_absolute(base: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_relative() {
        base.as_ref().join(path).clean()
    } else {
        path.clean()
    }
}

/**
    Appends the given extension to the path.

    Does not replace or modify any existing extension(s),
    so `lib/utils.min` becomes `lib/utils.min.js`.
*/
#[must_use]
pub fn append_extension(path: impl AsRef<Path>, ext: impl AsRef<OsStr>) -> PathBuf {
    let path = path.as_ref();
    match path.extension() {
        None => path.with_extension(ext),
        Some(curr_ext) => {
            let mut new_ext = curr_ext.to_os_string();
            new_ext.push(".");
            new_ext.push(ext);
            path.with_extension(new_ext)
        }
    }
}
