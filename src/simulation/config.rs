//! Free parameters of the planner and their validation.
//!
//! Parameters come from a "partable": one `name value` pair per line. JSON with
//! the same names is accepted as well. All four parameters are required.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::simulation::error::ConfigError;

/// Number of kernels the occupancy grid is pooled into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Granularity {
    G12,
    G20,
    G30,
    G42,
    G72,
}

impl Granularity {
    pub const ALL: [Self; 5] = [Self::G12, Self::G20, Self::G30, Self::G42, Self::G72];

    /// Target kernel count.
    #[must_use]
    pub const fn count(self) -> u32 {
        match self {
            Self::G12 => 12,
            Self::G20 => 20,
            Self::G30 => 30,
            Self::G42 => 42,
            Self::G72 => 72,
        }
    }

    /// Mean kernel activation above which a kernel is rejected as obstacle-bearing.
    #[must_use]
    pub const fn rejection_threshold(self) -> f64 {
        match self {
            Self::G12 => 0.005,
            Self::G20 => 0.02,
            Self::G30 => 0.03,
            Self::G42 => 0.08,
            Self::G72 => 0.12,
        }
    }

    /// Parses a kernel count given as a float (partable values are floats).
    ///
    /// # Errors
    ///
    /// `UnsupportedGranularity` for anything outside the fixed set.
    pub fn from_value(value: f64) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|g| f64::from(g.count()) == value)
            .ok_or(ConfigError::UnsupportedGranularity { value })
    }
}

impl TryFrom<u32> for Granularity {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_value(f64::from(value))
    }
}

impl From<Granularity> for u32 {
    fn from(g: Granularity) -> Self {
        g.count()
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// Validated free parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(rename = "convolutionGranularity")]
    pub granularity: Granularity,
    /// `LL_SoC` below this level starts eroding `HL_SoC`.
    #[serde(rename = "CCLThreshold")]
    pub ccl_threshold: f64,
    /// `HL_SoC` gained whenever a new action goal is selected.
    #[serde(rename = "SoCBoost")]
    pub soc_boost: f64,
    #[serde(rename = "persistenceTimeWindow")]
    pub persistence_time_window: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            granularity: Granularity::G30,
            ccl_threshold: 0.5,
            soc_boost: 0.1,
            persistence_time_window: 3.0,
        }
    }
}

const GRANULARITY_KEY: &str = "convolutionGranularity";
const CCL_KEY: &str = "CCLThreshold";
const BOOST_KEY: &str = "SoCBoost";
const PERSISTENCE_KEY: &str = "persistenceTimeWindow";

impl Parameters {
    /// Checks every field against its legal range.
    ///
    /// # Errors
    ///
    /// `OutOfRange` naming the first offending parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.ccl_threshold) {
            return Err(ConfigError::OutOfRange {
                name: CCL_KEY,
                value: self.ccl_threshold,
                expected: "within [0, 1]",
            });
        }
        if !self.soc_boost.is_finite() {
            return Err(ConfigError::OutOfRange {
                name: BOOST_KEY,
                value: self.soc_boost,
                expected: "a finite number",
            });
        }
        if !self.persistence_time_window.is_finite() || self.persistence_time_window < 0.0 {
            return Err(ConfigError::OutOfRange {
                name: PERSISTENCE_KEY,
                value: self.persistence_time_window,
                expected: "a finite non-negative number",
            });
        }
        Ok(())
    }

    /// Parses partable text. Blank lines and `#` comments are skipped, unknown
    /// names are ignored.
    ///
    /// # Errors
    ///
    /// `Malformed` for lines that are not `name value`, `Missing` for absent
    /// required names, and any validation error.
    pub fn from_partable(text: &str) -> Result<Self, ConfigError> {
        let mut granularity = None;
        let mut ccl_threshold = None;
        let mut soc_boost = None;
        let mut persistence_time_window = None;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let malformed = || ConfigError::Malformed {
                line: index + 1,
                content: raw.to_string(),
            };
            let mut fields = line.split_whitespace();
            let (Some(name), Some(value), None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(malformed());
            };
            let value: f64 = value.parse().map_err(|_| malformed())?;

            match name {
                GRANULARITY_KEY => granularity = Some(value),
                CCL_KEY => ccl_threshold = Some(value),
                BOOST_KEY => soc_boost = Some(value),
                PERSISTENCE_KEY => persistence_time_window = Some(value),
                other => tracing::debug!(name = other, value, "ignoring unknown parameter"),
            }
        }

        let params = Self {
            granularity: Granularity::from_value(
                granularity.ok_or(ConfigError::Missing {
                    name: GRANULARITY_KEY,
                })?,
            )?,
            ccl_threshold: ccl_threshold.ok_or(ConfigError::Missing { name: CCL_KEY })?,
            soc_boost: soc_boost.ok_or(ConfigError::Missing { name: BOOST_KEY })?,
            persistence_time_window: persistence_time_window.ok_or(ConfigError::Missing {
                name: PERSISTENCE_KEY,
            })?,
        };
        params.validate()?;
        Ok(params)
    }

    /// Parses a JSON object with the partable names as keys.
    ///
    /// # Errors
    ///
    /// `Json` if a key is missing or mistyped, plus any validation error.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let params: Self =
            serde_json::from_str(text).map_err(|source| ConfigError::Json { source })?;
        params.validate()?;
        Ok(params)
    }

    /// Loads parameters from disk; `.json` files are read as JSON, anything else as a partable.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as the chosen parser.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_partable(&text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARTABLE: &str = "convolutionGranularity 20\nCCLThreshold 0.4\nSoCBoost 0.05\npersistenceTimeWindow 2\n";

    #[test]
    fn test_thresholds_cover_every_granularity() {
        for g in Granularity::ALL {
            let t = g.rejection_threshold();
            assert!(t > 0.0 && t < 1.0, "threshold for {g} = {t}");
        }
    }

    #[test]
    fn test_granularity_from_value() {
        assert_eq!(Granularity::from_value(42.0).unwrap(), Granularity::G42);
        assert!(matches!(
            Granularity::from_value(25.0),
            Err(ConfigError::UnsupportedGranularity { .. })
        ));
        assert!(Granularity::from_value(20.5).is_err());
    }

    #[test]
    fn test_partable_parses() {
        let params = Parameters::from_partable(PARTABLE).unwrap();
        assert_eq!(params.granularity, Granularity::G20);
        assert!((params.ccl_threshold - 0.4).abs() < 1e-12);
        assert!((params.soc_boost - 0.05).abs() < 1e-12);
        assert!((params.persistence_time_window - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_partable_ignores_comments_and_unknown_names() {
        let text = format!("# model run\n\nHLSoCLoss 0.2\n{PARTABLE}");
        assert!(Parameters::from_partable(&text).is_ok());
    }

    #[test]
    fn test_partable_missing_parameter() {
        let text = "convolutionGranularity 20\nCCLThreshold 0.4\nSoCBoost 0.05\n";
        assert!(matches!(
            Parameters::from_partable(text),
            Err(ConfigError::Missing {
                name: "persistenceTimeWindow"
            })
        ));
    }

    #[test]
    fn test_partable_malformed_line() {
        let text = "convolutionGranularity twenty\n";
        assert!(matches!(
            Parameters::from_partable(text),
            Err(ConfigError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            Parameters::from_partable("SoCBoost 0.1 extra\n"),
            Err(ConfigError::Malformed { .. })
        ));
    }

    #[test]
    fn test_ccl_threshold_out_of_range() {
        let params = Parameters {
            ccl_threshold: 1.5,
            ..Parameters::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::OutOfRange {
                name: "CCLThreshold",
                ..
            })
        ));
    }

    #[test]
    fn test_json_uses_partable_names() {
        let json = r#"{"convolutionGranularity": 72, "CCLThreshold": 0.3, "SoCBoost": 0.2, "persistenceTimeWindow": 1.0}"#;
        let params = Parameters::from_json(json).unwrap();
        assert_eq!(params.granularity, Granularity::G72);

        let bad = r#"{"convolutionGranularity": 13, "CCLThreshold": 0.3, "SoCBoost": 0.2, "persistenceTimeWindow": 1.0}"#;
        assert!(matches!(
            Parameters::from_json(bad),
            Err(ConfigError::Json { .. })
        ));
    }
}
