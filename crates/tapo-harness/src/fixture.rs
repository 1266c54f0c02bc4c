//! Fixture loading.
//!
//! A fixture is a JSON object mapping method names to the value a device
//! would return for them. Several fixtures can be layered: a hub snapshot
//! first, then a child snapshot that adds its own keys and replaces the
//! hub's child list.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Simulated device state: method name to stored value.
pub type StateMap = Map<String, Value>;

/// Environment variable overriding the fixtures directory.
pub const FIXTURES_DIR_ENV: &str = "TAPO_FIXTURES_DIR";

/// Where relative fixture names are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Base directory for relative fixture names.
    pub fixtures_dir: PathBuf,
}

impl FixtureConfig {
    /// Resolve relative names against `fixtures_dir`.
    pub fn new(fixtures_dir: impl Into<PathBuf>) -> Self {
        Self { fixtures_dir: fixtures_dir.into() }
    }

    /// Fixtures shipped with this crate.
    pub fn bundled_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }
}

impl Default for FixtureConfig {
    /// Uses `TAPO_FIXTURES_DIR` when set, the bundled fixtures otherwise.
    fn default() -> Self {
        let fixtures_dir =
            std::env::var_os(FIXTURES_DIR_ENV).map_or_else(Self::bundled_dir, PathBuf::from);
        Self { fixtures_dir }
    }
}

/// Errors from loading fixtures.
///
/// None of these are recoverable: a harness that cannot build its initial
/// state has nothing to simulate.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Fixture file could not be read.
    #[error("failed to read fixture {}: {source}", path.display())]
    Io {
        /// Resolved fixture path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Fixture file is not valid JSON.
    #[error("failed to parse fixture {}: {source}", path.display())]
    Parse {
        /// Resolved fixture path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Fixture top level is not a JSON object.
    #[error("fixture {} is not a JSON object", path.display())]
    NotAnObject {
        /// Resolved fixture path.
        path: PathBuf,
    },
}

/// Reads fixture files into a [`StateMap`].
#[derive(Debug, Clone, Default)]
pub struct FixtureLoader {
    config: FixtureConfig,
}

impl FixtureLoader {
    /// Loader resolving names per `config`.
    pub fn new(config: FixtureConfig) -> Self {
        Self { config }
    }

    /// Loader over the fixtures shipped with this crate, ignoring the
    /// environment.
    pub fn bundled() -> Self {
        Self::new(FixtureConfig::new(FixtureConfig::bundled_dir()))
    }

    /// Active configuration.
    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// Absolute names are used as-is, relative ones join `fixtures_dir`.
    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        let name = name.as_ref();
        if name.is_absolute() { name.to_path_buf() } else { self.config.fixtures_dir.join(name) }
    }

    /// Load a single fixture.
    pub fn load(&self, name: impl AsRef<Path>) -> Result<StateMap, FixtureError> {
        let path = self.resolve(name);
        let raw = fs::read_to_string(&path)
            .map_err(|source| FixtureError::Io { path: path.clone(), source })?;
        let value: Value = serde_json::from_str(&raw)
            .map_err(|source| FixtureError::Parse { path: path.clone(), source })?;

        let Value::Object(state) = value else {
            return Err(FixtureError::NotAnObject { path });
        };

        tracing::debug!(path = %path.display(), keys = state.len(), "loaded fixture");
        Ok(state)
    }

    /// Load fixtures in order and merge them.
    ///
    /// Top-level keys of later fixtures replace those of earlier ones
    /// wholesale; nested values are never merged.
    pub fn load_merged<I, P>(&self, names: I) -> Result<StateMap, FixtureError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut merged = StateMap::new();
        for name in names {
            merged.extend(self.load(name)?);
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_names_join_fixtures_dir() {
        let loader = FixtureLoader::new(FixtureConfig::new("/data/fixtures"));
        assert_eq!(
            loader.resolve("hub_children/trv_ke100.json"),
            PathBuf::from("/data/fixtures/hub_children/trv_ke100.json")
        );
    }

    #[test]
    fn absolute_names_are_kept() {
        let loader = FixtureLoader::new(FixtureConfig::new("/data/fixtures"));
        assert_eq!(loader.resolve("/tmp/p100.json"), PathBuf::from("/tmp/p100.json"));
    }

    #[test]
    fn bundled_loader_points_at_crate_fixtures() {
        let loader = FixtureLoader::bundled();
        assert!(loader.config().fixtures_dir.ends_with("fixtures"));
    }

    #[test]
    fn empty_name_list_yields_empty_state() {
        let state = FixtureLoader::bundled().load_merged(Vec::<&str>::new()).expect("merge");
        assert!(state.is_empty());
    }
}
