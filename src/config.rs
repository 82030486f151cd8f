//! Mechanism for loading and sharing the analysis configuration
//!
//! The configuration file format is deliberately simple: one `key value` pair
//! per line, with blank lines and `#` comments ignored. For example:
//!
//! ```text
//! # Where auxiliary maps live
//! data_dir                   /data/xenon1t/lax
//! drift_velocity_liquid      1.44e-4
//! ```
//!
//! Keys which are not present keep their default value.

use crate::numeric::Float;

use eyre::{bail, ensure, Report, Result, WrapErr};
use log::debug;

use std::{
    collections::HashSet,
    env, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Environment variable pointing to a configuration file
pub const CONFIG_ENV: &str = "LAX_CONFIG";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "LAX_DATA_DIR";

/// Analysis configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Directory holding auxiliary data files (light maps...)
    pub data_dir: PathBuf,

    /// Electron diffusion constant in liquid xenon (cm²/ns)
    pub diffusion_constant_liquid: Float,

    /// Electron drift velocity in liquid xenon (cm/ns)
    pub drift_velocity_liquid: Float,

    /// S2 width at the top of the TPC (ns)
    pub s2_width_w0: Float,
}
//
impl Default for Configuration {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            diffusion_constant_liquid: 22.8e-9,
            drift_velocity_liquid: 1.44e-4,
            s2_width_w0: 348.6,
        }
    }
}
//
impl Configuration {
    /// Load the configuration from a file and check it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::parse(&text)
            .wrap_err_with(|| format!("Invalid configuration file {}", path.display()))
    }

    /// Parse configuration text, starting from the defaults
    pub fn parse(text: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut seen = HashSet::new();

        for (line_idx, line) in text.lines().enumerate() {
            let line_no = line_idx + 1;

            // Strip comments and skip blank lines
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            // Split into key and value
            let mut words = line.split_whitespace();
            let (Some(key), Some(value), None) = (words.next(), words.next(), words.next()) else {
                bail!("Line {line_no} should look like \"key value\", found \"{line}\"");
            };
            ensure!(seen.insert(key), "Line {line_no} sets {key} a second time");

            let item = ConfigItem::new(key, value, line_no);
            match key {
                "data_dir" => config.data_dir = PathBuf::from(value),
                "diffusion_constant_liquid" => config.diffusion_constant_liquid = item.parse()?,
                "drift_velocity_liquid" => config.drift_velocity_liquid = item.parse()?,
                "s2_width_w0" => config.s2_width_w0 = item.parse()?,
                _ => bail!("Line {line_no} sets unknown configuration key {key}"),
            }
        }

        config.check()?;
        Ok(config)
    }

    /// Build the configuration from the environment
    ///
    /// If `LAX_CONFIG` is set, it points to a configuration file, otherwise
    /// defaults are used. `LAX_DATA_DIR` then overrides the data directory.
    ///
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(PathBuf::from(path))?,
            None => Self::default(),
        };
        if let Some(dir) = env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
            debug!("Data directory overridden to {}", config.data_dir.display());
        }
        Ok(config)
    }

    /// Physical sanity checks
    fn check(&self) -> Result<()> {
        ensure!(
            self.drift_velocity_liquid > 0.,
            "Drift velocity must be positive"
        );
        ensure!(
            self.diffusion_constant_liquid >= 0.,
            "Diffusion constant must be non-negative"
        );
        ensure!(self.s2_width_w0 > 0., "S2 width at the gate must be positive");
        Ok(())
    }

    /// Display the configuration at debug log level
    pub fn log(&self) {
        debug!("data_dir                  : {}", self.data_dir.display());
        debug!("diffusion_constant_liquid : {}", self.diffusion_constant_liquid);
        debug!("drift_velocity_liquid     : {}", self.drift_velocity_liquid);
        debug!("s2_width_w0               : {}", self.s2_width_w0);
    }
}

/// A value from the configuration file, tagged with its key and location for
/// error reporting purposes
struct ConfigItem<'data> {
    key: &'data str,
    data: &'data str,
    line_no: usize,
}
//
impl<'data> ConfigItem<'data> {
    fn new(key: &'data str, data: &'data str, line_no: usize) -> Self {
        Self { key, data, line_no }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.data.parse::<T>().map_err(Report::new).wrap_err_with(|| {
            format!(
                "Could not parse configuration of {} on line {}",
                self.key, self.line_no
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = Configuration::parse("").unwrap();
        assert_eq!(config, Configuration::default());
        assert_eq!(config.s2_width_w0, 348.6);
    }

    #[test]
    fn key_values() {
        let config = Configuration::parse(
            "# Detector constants\n\
             \n\
             drift_velocity_liquid   1.5e-4  # measured\n\
             data_dir /tmp/maps\n",
        )
        .unwrap();
        assert_eq!(config.drift_velocity_liquid, 1.5e-4);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/maps"));
        assert_eq!(config.diffusion_constant_liquid, 22.8e-9);
    }

    #[test]
    fn rejected_files() {
        for text in [
            "drift_velocity_liquid",
            "drift_velocity_liquid 1 2",
            "drift_velocity_liquid fast",
            "drift_velocity_liquid -1",
            "s2_width_w0 1\ns2_width_w0 2",
            "electron_lifetime 550",
        ] {
            assert!(Configuration::parse(text).is_err(), "{text}");
        }
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "s2_width_w0 350").unwrap();
        let config = Configuration::load(file.path()).unwrap();
        assert_eq!(config.s2_width_w0, 350.);

        let missing = file.path().with_extension("missing");
        let err = Configuration::load(&missing).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read configuration file"));
    }
}
