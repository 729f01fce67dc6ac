//! Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error in {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid config value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Tunables for extraction, filtering defaults and parallelism.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Morgan radius. Default: 2.
    pub fingerprint_radius: u32,
    /// Fingerprint length in bits. Default: 512.
    pub fingerprint_bits: usize,
    /// Decimal digits kept for `logp`. Default: 4.
    pub logp_decimals: u32,
    /// Molecular weight cutoff when a request omits one. Default: 1000.0.
    pub default_molwt_cutoff: f64,
    /// logP cutoff when a request omits one. Default: 20.0.
    pub default_logp_cutoff: f64,
    /// Row count at which extraction and similarity switch to rayon.
    /// Default: 256.
    pub parallel_threshold: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fingerprint_radius: 2,
            fingerprint_bits: 512,
            logp_decimals: 4,
            default_molwt_cutoff: 1000.0,
            default_logp_cutoff: 20.0,
            parallel_threshold: 256,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Self::parse(toml_str, "<string>")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    fn parse(toml_str: &str, path: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fingerprint_bits == 0 {
            return Err(ConfigError::Invalid {
                field: "fingerprint_bits".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.fingerprint_radius > 8 {
            return Err(ConfigError::Invalid {
                field: "fingerprint_radius".to_string(),
                message: "must be at most 8".to_string(),
            });
        }
        if self.logp_decimals > 15 {
            return Err(ConfigError::Invalid {
                field: "logp_decimals".to_string(),
                message: "must be at most 15".to_string(),
            });
        }
        for (field, value) in [
            ("default_molwt_cutoff", self.default_molwt_cutoff),
            ("default_logp_cutoff", self.default_logp_cutoff),
        ] {
            if value.is_nan() {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    message: "must not be NaN".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(PipelineConfig::from_toml_str("").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn partial_override() {
        let config =
            PipelineConfig::from_toml_str("fingerprint_bits = 1024\nparallel_threshold = 8\n")
                .unwrap();
        assert_eq!(config.fingerprint_bits, 1024);
        assert_eq!(config.parallel_threshold, 8);
        assert_eq!(config.fingerprint_radius, 2);
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(
            PipelineConfig::from_toml_str("fingerprint_bits = 0"),
            Err(ConfigError::Invalid { ref field, .. }) if field == "fingerprint_bits"
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("fingerprint_radius = 9"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("fingerprint_bits = \"many\""),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moldb.toml");
        std::fs::write(&path, "logp_decimals = 2\n").unwrap();
        assert_eq!(PipelineConfig::load(&path).unwrap().logp_decimals, 2);
        assert!(matches!(
            PipelineConfig::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
