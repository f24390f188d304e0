//! Main Config type for confbind
//!
//! A `Config` owns a merged configuration tree and the registry of named
//! types used to fill interface slots. Data is layered from files or text,
//! queried by dotted path, and bound onto application values with
//! [`Config::configure`].

use std::path::{Path, PathBuf};

use crate::bind::{Bind, Binder};
use crate::decode::{self, Format};
use crate::error::{Error, Result};
use crate::merge::merge_all;
use crate::registry::{Registration, TypeRegistry};
use crate::value::Value;

/// Specifies a file to load, either required or optional
///
/// Use this with [`Config::load_specs`] to load config files where some
/// files may or may not exist.
///
/// # Examples
///
/// ```no_run
/// use confbind_core::{Config, FileSpec};
///
/// let mut config = Config::new();
/// config.load_specs(&[
///     FileSpec::required("base.yaml"),
///     FileSpec::optional("local.toml"),  // Won't error if missing
/// ])?;
/// # Ok::<(), confbind_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub enum FileSpec {
    /// A required file - error if not found
    Required(PathBuf),
    /// An optional file - silently skip if not found
    Optional(PathBuf),
}

impl FileSpec {
    /// Create a required file spec
    pub fn required(path: impl Into<PathBuf>) -> Self {
        FileSpec::Required(path.into())
    }

    /// Create an optional file spec
    pub fn optional(path: impl Into<PathBuf>) -> Self {
        FileSpec::Optional(path.into())
    }

    /// Get the path of this file spec
    pub fn path(&self) -> &Path {
        match self {
            FileSpec::Required(p) | FileSpec::Optional(p) => p,
        }
    }

    /// Check if this file spec is optional
    pub fn is_optional(&self) -> bool {
        matches!(self, FileSpec::Optional(_))
    }
}

/// Layered configuration data plus the types it can construct
#[derive(Debug, Default)]
pub struct Config {
    data: Value,
    types: TypeRegistry,
}

impl Config {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration holding `value`
    pub fn from_value(value: Value) -> Self {
        Self {
            data: value,
            types: TypeRegistry::new(),
        }
    }

    /// Load configuration from a JSON string (comments allowed)
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_value(decode::decode(Format::Json, json)?))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(Self::from_value(decode::decode(Format::Yaml, yaml)?))
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml: &str) -> Result<Self> {
        Ok(Self::from_value(decode::decode(Format::Toml, toml)?))
    }

    /// Load files and merge them, in order, on top of the existing data.
    ///
    /// The format of each file is chosen by its extension. Loading stops at
    /// the first failure; files merged before it stay merged.
    pub fn load<I, P>(&mut self, files: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for file in files {
            let value = decode::load_file(file.as_ref())?;
            log::debug!("Merging {}", file.as_ref().display());
            self.merge(value);
        }
        Ok(())
    }

    /// Like [`Config::load`], but optional files that don't exist are skipped
    pub fn load_specs(&mut self, specs: &[FileSpec]) -> Result<()> {
        for spec in specs {
            let path = spec.path();
            if spec.is_optional() && !path.exists() {
                log::debug!("Skipping optional file {} (not found)", path.display());
                continue;
            }
            self.load([path])?;
        }
        Ok(())
    }

    /// Decode JSON text and merge it on top of the existing data
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        self.merge(decode::decode(Format::Json, json)?);
        Ok(())
    }

    /// Decode YAML text and merge it on top of the existing data
    pub fn load_yaml(&mut self, yaml: &str) -> Result<()> {
        self.merge(decode::decode(Format::Yaml, yaml)?);
        Ok(())
    }

    /// Decode TOML text and merge it on top of the existing data
    pub fn load_toml(&mut self, toml: &str) -> Result<()> {
        self.merge(decode::decode(Format::Toml, toml)?);
        Ok(())
    }

    /// Replace the data with the merge of `sources`, in order
    pub fn set_data<I>(&mut self, sources: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.data = merge_all(sources);
    }

    /// Merge `update` on top of the existing data
    pub fn merge(&mut self, update: Value) {
        self.data.merge(update);
    }

    /// The merged configuration tree
    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    /// Look up the value at a dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.data.get_path(path).ok()
    }

    /// Get the value at `path` converted to the type of `default`.
    ///
    /// Returns `default` when the path is missing or the value cannot be
    /// converted.
    pub fn get_or<T: Bind + Clone>(&self, path: &str, default: T) -> T {
        let Some(value) = self.get(path) else {
            return default;
        };
        let mut converted = default.clone();
        match Binder::new(&self.types).bind_root(&mut converted, value, path) {
            Ok(()) => converted,
            Err(e) => {
                log::debug!("Using the default for '{}': {}", path, e);
                default
            }
        }
    }

    /// Get the value at `path` converted to `T`, if present and convertible
    pub fn get_as<T: Bind + Default>(&self, path: &str) -> Option<T> {
        let value = self.get(path)?;
        let mut converted = T::default();
        Binder::new(&self.types)
            .bind_root(&mut converted, value, path)
            .ok()?;
        Some(converted)
    }

    /// Get a string value
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path)?.as_str().map(str::to_string)
    }

    /// Get an integer value
    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path)?.as_i64()
    }

    /// Get a float value (integers are widened)
    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get(path)?.as_f64()
    }

    /// Get a boolean value
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    /// Set the value at a dotted path, creating intermediate mappings
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        self.data.set_path(path, value.into())
    }

    /// Register a named type for interface slots.
    ///
    /// See [`TypeRegistry::register`].
    pub fn register<T, F>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> Result<Registration<'_, T>>
    where
        T: Bind,
        F: Fn() -> T + 'static,
    {
        self.types.register(name, factory)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.types
    }

    /// Populate `target` from the whole configuration tree
    pub fn configure<T: Bind>(&self, target: &mut T) -> Result<()> {
        Binder::new(&self.types).bind_root(target, &self.data, "")
    }

    /// Populate `target` from the subtree at `path`
    pub fn configure_at<T: Bind>(&self, target: &mut T, path: &str) -> Result<()> {
        let source = self
            .get(path)
            .ok_or_else(|| Error::path(path, "no configuration value was found"))?;
        Binder::new(&self.types).bind_root(target, source, path)
    }

    /// Export the data as JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.data).map_err(|e| Error::internal(e.to_string()))
    }

    /// Export the data as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.data).map_err(|e| Error::internal(e.to_string()))
    }
}

impl From<Value> for Config {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}
