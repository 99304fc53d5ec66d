use std::{
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use twoslash_commonmark::{settings::parse_literal, syntax::DEFAULT_THEME};

use crate::error::ConfigError;

/// Configuration for the twoslash CLI.
///
/// [`Config`] holds the options that control rendering: Markdown flavour,
/// highlighting theme, where scratch files go, which TypeScript compiler
/// checks samples, and the default Twoslash settings every document starts
/// from. Fields are typically loaded from a TOML or JSON config file, but can
/// also be set via CLI arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Enable GitHub Flavored Markdown extensions.
  pub gfm: bool,

  /// Theme used when a document does not choose one.
  pub highlight_theme: String,

  /// Directory for synthetic Markdown documents and checker inputs.
  /// Defaults to the system temporary directory.
  pub scratch_dir: Option<PathBuf>,

  /// TypeScript compiler used to check Twoslash samples.
  pub tsc: Option<PathBuf>,

  /// Extra arguments passed to every compiler invocation.
  pub tsc_args: Vec<String>,

  /// Default Twoslash settings, overridden by a document's settings comment.
  pub settings: Map<String, Value>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      gfm:             true,
      highlight_theme: DEFAULT_THEME.to_string(),
      scratch_dir:     None,
      tsc:             None,
      tsc_args:        Vec::new(),
      settings:        Map::new(),
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
      return Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )));
    };

    match ext.to_lowercase().as_str() {
      "json" => {
        serde_json::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse JSON config from {}: {}",
            path.display(),
            e
          ))
        })
      },
      "toml" => {
        toml::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse TOML config from {}: {}",
            path.display(),
            e
          ))
        })
      },
      _ => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from files and `KEY=VALUE` overrides.
  ///
  /// Explicit config files are merged in order. Without any, a config file is
  /// looked up in the usual locations; failing that the defaults are used.
  /// Overrides are applied last.
  ///
  /// # Errors
  ///
  /// Returns an error if a config file cannot be loaded or an override is
  /// invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged_config = Self::from_file(first)?;

      for config_path in rest {
        merged_config.merge(Self::from_file(config_path)?);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config)?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// Recognised keys are `gfm`, `highlight_theme`, `scratch_dir`, `tsc`,
  /// `tsc_args` (whitespace separated) and `settings.<name>`. Settings values
  /// are read as JavaScript literals when possible and as plain strings
  /// otherwise.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  ///
  /// # Example
  ///
  /// ```rust
  /// use twoslash_config::Config;
  ///
  /// let mut config = Config::default();
  /// config
  ///   .apply_overrides(&[
  ///     "gfm=false".to_string(),
  ///     "settings.themes=['Nord', 'Dracula']".to_string(),
  ///   ])
  ///   .unwrap();
  /// assert!(!config.gfm);
  /// assert_eq!(config.settings["themes"][1], "Dracula");
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a single override.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is unknown or the value is invalid.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    if let Some(name) = key.strip_prefix("settings.") {
      if name.is_empty() {
        return Err(ConfigError::Config(
          "Missing settings key in 'settings.'".to_string(),
        ));
      }
      let parsed = parse_literal(value)
        .unwrap_or_else(|_| Value::String(value.to_string()));
      self.settings.insert(name.to_string(), parsed);
      return Ok(());
    }

    match key {
      "gfm" => {
        self.gfm = match value.to_lowercase().as_str() {
          "true" | "yes" | "1" => true,
          "false" | "no" | "0" => false,
          _ => {
            return Err(ConfigError::Config(format!(
              "Invalid boolean value for 'gfm': '{value}'. Expected \
               true/false, yes/no, or 1/0"
            )));
          },
        };
      },
      "highlight_theme" => self.highlight_theme = value.to_string(),
      "scratch_dir" => {
        self.scratch_dir =
          (!value.is_empty()).then(|| PathBuf::from(value));
      },
      "tsc" => self.tsc = (!value.is_empty()).then(|| PathBuf::from(value)),
      "tsc_args" => {
        self.tsc_args = value.split_whitespace().map(str::to_string).collect();
      },
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'. See documentation for \
           supported keys."
        )));
      },
    }

    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - [`Vec<T>`] fields: Other's vec is appended to this config's vec
  /// - Plain fields (String, bool): Other's value always replaces
  /// - `settings`: Other's entries are merged in (can override individual
  ///   keys)
  pub fn merge(&mut self, other: Self) {
    self.gfm = other.gfm;
    self.highlight_theme = other.highlight_theme;
    if other.scratch_dir.is_some() {
      self.scratch_dir = other.scratch_dir;
    }
    if other.tsc.is_some() {
      self.tsc = other.tsc;
    }
    self.tsc_args.extend(other.tsc_args);
    self.settings.extend(other.settings);
  }

  /// The scratch directory, falling back to the system temporary directory.
  #[must_use]
  pub fn scratch_dir(&self) -> PathBuf {
    self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let config_filenames = [
          "twoslash.toml",
          "twoslash.json",
          ".twoslash.toml",
          ".twoslash.json",
          ".config/twoslash.toml",
          ".config/twoslash.json",
        ];

        let current_dir = std::env::current_dir().ok()?;
        for filename in &config_filenames {
          let config_path = current_dir.join(filename);
          if config_path.exists() {
            return Some(config_path);
          }
        }

        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
          let xdg_config_dir = PathBuf::from(xdg_config_home);
          for filename in &["twoslash.toml", "twoslash.json"] {
            let config_path = xdg_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        if let Ok(home) = std::env::var("HOME") {
          let home_config_dir =
            PathBuf::from(home).join(".config").join("twoslash");
          for filename in &["config.toml", "config.json"] {
            let config_path = home_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        None
      })
      .clone()
  }
}
