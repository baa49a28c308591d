#![allow(clippy::cargo_common_metadata)]

mod fs;
mod version;

pub mod fmt;
pub mod path;

pub use self::fs::{FileSystem, HostFs};
pub use self::version::{
    read_package_version, RuntimeVersion, VersionError, VersionRequirement, PACKAGE_FILE_NAME,
};
