use crate::{ConfigError, fs::Visibility};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/**
 Configuration for a local storage backend.

 Holds the root every storage path is resolved against and the visibility applied
 to newly written files and directories.

 Can be built in code or loaded from TOML:

 ```
 use storefind::{StorageConfig, fs::Visibility};

 let config = StorageConfig::from_toml_str(r#"
     base_path = "/srv/uploads"
     visibility = "private"
 "#).unwrap();

 assert_eq!(config.base_path().to_str(), Some("/srv/uploads"));
 assert_eq!(config.visibility(), Visibility::Private);
 assert_eq!(config.directory_visibility(), Visibility::Public);
 ```
*/
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory all storage paths are relative to
    pub(crate) base_path: PathBuf,

    /// Visibility given to files on write
    pub(crate) visibility: Visibility,

    /// Visibility given to directories on creation
    pub(crate) directory_visibility: Visibility,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            visibility: Visibility::Public,
            directory_visibility: Visibility::Public,
        }
    }
}

impl StorageConfig {
    /// Creates a config rooted at `base_path` with public defaults
    #[must_use]
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Set the visibility for written files, defaults to public
    #[must_use]
    pub const fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Set the visibility for created directories, defaults to public
    #[must_use]
    pub const fn with_directory_visibility(mut self, visibility: Visibility) -> Self {
        self.directory_visibility = visibility;
        self
    }

    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[must_use]
    pub const fn directory_visibility(&self) -> Visibility {
        self.directory_visibility
    }

    /// Parses a config from TOML text; missing keys take their defaults
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /**
     Loads a config from a TOML file.

     A relative `base_path` is resolved against the directory containing the file.

     # Errors
     Returns [`ConfigError::Read`] if the file can't be read, or
     [`ConfigError::Parse`] if its contents are invalid.
    */
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if config.base_path.is_relative()
            && let Some(dir) = path.parent()
        {
            config.base_path = dir.join(&config.base_path);
        }
        tracing::debug!(config = ?config, "loaded storage config from {}", path.display());
        Ok(config)
    }
}
