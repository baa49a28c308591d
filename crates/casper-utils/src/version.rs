use std::{
    fmt,
    io::Error as IoError,
    path::{Path, PathBuf},
    str::FromStr,
};

use semver::Version;
use serde::Deserialize;
use thiserror::Error;

use crate::FileSystem;

pub const PACKAGE_FILE_NAME: &str = "package.json";

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("version string '{text}' is not valid semver: {source}")]
    Invalid {
        text: String,
        #[source]
        source: semver::Error,
    },
    #[error("unable to read version file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("version file {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported runtime version {found}, expected {requirement}")]
    Unsupported {
        found: RuntimeVersion,
        requirement: VersionRequirement,
    },
}

/**
    A `major.minor.patch[-ident]` version.

    Used both for the host runtime and for the tool itself,
    the latter being read from the installation's `package.json`.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub ident: Option<String>,
}

impl RuntimeVersion {
    /**
        Parses a version string such as `1.1.4` or `1.1.0-beta5`.

        # Errors

        Errors if the given string is not valid semver.
    */
    pub fn parse(text: impl AsRef<str>) -> Result<Self, VersionError> {
        let text = text.as_ref().trim();
        let semver = Version::parse(text).map_err(|source| VersionError::Invalid {
            text: text.to_string(),
            source,
        })?;
        let ident = if semver.pre.is_empty() {
            None
        } else {
            Some(semver.pre.as_str().to_string())
        };
        Ok(Self {
            major: semver.major,
            minor: semver.minor,
            patch: semver.patch,
            ident,
        })
    }
}

impl FromStr for RuntimeVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ident) = &self.ident {
            write!(f, "-{ident}")?;
        }
        Ok(())
    }
}

/**
    A single supported major version, with a minimum minor / patch floor.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRequirement {
    pub major: u64,
    pub min_minor: u64,
    pub min_patch: u64,
}

impl VersionRequirement {
    #[must_use]
    pub const fn new(major: u64, min_minor: u64, min_patch: u64) -> Self {
        Self {
            major,
            min_minor,
            min_patch,
        }
    }

    #[must_use]
    pub fn is_satisfied_by(&self, version: &RuntimeVersion) -> bool {
        version.major == self.major
            && (version.minor, version.patch) >= (self.min_minor, self.min_patch)
    }

    /**
        Checks the given version against this requirement.

        # Errors

        Errors with [`VersionError::Unsupported`] if the version does not satisfy it.
    */
    pub fn check(&self, version: &RuntimeVersion) -> Result<(), VersionError> {
        if self.is_satisfied_by(version) {
            Ok(())
        } else {
            Err(VersionError::Unsupported {
                found: version.clone(),
                requirement: *self,
            })
        }
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.x (>= {}.{}.{})",
            self.major, self.major, self.min_minor, self.min_patch
        )
    }
}

#[derive(Debug, Deserialize)]
struct PackageManifest {
    version: String,
}

/**
    Reads the `version` field of the `package.json` file in the given root directory.

    # Errors

    Errors if the file is missing or unreadable, is not valid JSON
    with a string `version` field, or if the version is not valid semver.
*/
pub fn read_package_version(
    fs: &dyn FileSystem,
    root: &Path,
) -> Result<RuntimeVersion, VersionError> {
    let path = fs.join(root, Path::new(PACKAGE_FILE_NAME));
    let contents = fs.read(&path).map_err(|source| VersionError::Unreadable {
        path: path.clone(),
        source,
    })?;
    let manifest: PackageManifest = serde_json::from_str(&contents)
        .map_err(|source| VersionError::Malformed { path, source })?;
    RuntimeVersion::parse(manifest.version)
}
