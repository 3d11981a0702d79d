use thiserror::Error;

/// Configuration for [`AdaptiveLineSearch`](super::AdaptiveLineSearch).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawConfig"))]
pub struct Config {
    alpha_max: f64,
    contraction: f64,
    slope: f64,
    max_contractions: usize,
    boundary_fraction: f64,
}

/// Errors that can occur when validating a line search config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("alpha_max must be positive")]
    AlphaMax,

    #[error("contraction must be in (0, 1)")]
    Contraction,

    #[error("slope must be in [0, 1)")]
    Slope,

    #[error("boundary_fraction must be in (0, 1)")]
    BoundaryFraction,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1.0, 0.5, 1e-4, 10, 0.995).unwrap()
    }
}

impl Config {
    /// Creates a new validated config.
    ///
    /// `alpha_max` may be infinite.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is outside its allowed range.
    pub fn new(
        alpha_max: f64,
        contraction: f64,
        slope: f64,
        max_contractions: usize,
        boundary_fraction: f64,
    ) -> Result<Self, ConfigError> {
        if alpha_max.is_nan() || alpha_max <= 0.0 {
            return Err(ConfigError::AlphaMax);
        }
        if !(contraction > 0.0 && contraction < 1.0) {
            return Err(ConfigError::Contraction);
        }
        if !(0.0..1.0).contains(&slope) {
            return Err(ConfigError::Slope);
        }
        if !(boundary_fraction > 0.0 && boundary_fraction < 1.0) {
            return Err(ConfigError::BoundaryFraction);
        }

        Ok(Self {
            alpha_max,
            contraction,
            slope,
            max_contractions,
            boundary_fraction,
        })
    }

    /// Returns a copy with a different maximum step length.
    ///
    /// # Errors
    ///
    /// Returns an error if `alpha_max` is not positive.
    pub fn with_alpha_max(self, alpha_max: f64) -> Result<Self, ConfigError> {
        Self::new(
            alpha_max,
            self.contraction,
            self.slope,
            self.max_contractions,
            self.boundary_fraction,
        )
    }

    /// Returns a copy with a different contraction limit.
    #[must_use]
    pub fn with_max_contractions(self, max_contractions: usize) -> Self {
        Self {
            max_contractions,
            ..self
        }
    }

    /// Returns the upper limit on the step length.
    #[must_use]
    pub fn alpha_max(&self) -> f64 {
        self.alpha_max
    }

    /// Returns the factor applied to alpha after a rejected trial.
    #[must_use]
    pub fn contraction(&self) -> f64 {
        self.contraction
    }

    /// Returns the sufficient-decrease slope `c`.
    #[must_use]
    pub fn slope(&self) -> f64 {
        self.slope
    }

    #[must_use]
    pub fn max_contractions(&self) -> usize {
        self.max_contractions
    }

    /// Returns the fraction of the distance to the nearest bound a step may cover.
    #[must_use]
    pub fn boundary_fraction(&self) -> f64 {
        self.boundary_fraction
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    alpha_max: f64,
    contraction: f64,
    slope: f64,
    max_contractions: usize,
    boundary_fraction: f64,
}

#[cfg(feature = "serde")]
impl Default for RawConfig {
    fn default() -> Self {
        let config = Config::default();
        Self {
            alpha_max: config.alpha_max,
            contraction: config.contraction,
            slope: config.slope,
            max_contractions: config.max_contractions,
            boundary_fraction: config.boundary_fraction,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        Self::new(
            raw.alpha_max,
            raw.contraction,
            raw.slope,
            raw.max_contractions,
            raw.boundary_fraction,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn default_values() {
        let config = Config::default();
        assert_relative_eq!(config.alpha_max(), 1.0);
        assert_relative_eq!(config.contraction(), 0.5);
        assert_relative_eq!(config.slope(), 1e-4);
        assert_eq!(config.max_contractions(), 10);
        assert_relative_eq!(config.boundary_fraction(), 0.995);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            Config::new(0.0, 0.5, 1e-4, 10, 0.995),
            Err(ConfigError::AlphaMax)
        );
        assert_eq!(
            Config::new(1.0, 1.0, 1e-4, 10, 0.995),
            Err(ConfigError::Contraction)
        );
        assert_eq!(
            Config::new(1.0, 0.5, -1e-4, 10, 0.995),
            Err(ConfigError::Slope)
        );
        assert_eq!(
            Config::new(1.0, 0.5, 1e-4, 10, 1.0),
            Err(ConfigError::BoundaryFraction)
        );
        assert_eq!(
            Config::default().with_alpha_max(f64::NAN),
            Err(ConfigError::AlphaMax)
        );
    }

    #[test]
    fn infinite_alpha_max_is_allowed() {
        let config = Config::default()
            .with_alpha_max(f64::INFINITY)
            .expect("valid");
        assert!(config.alpha_max().is_infinite());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_with_defaults_and_validation() {
        let config: Config =
            serde_json::from_str(r#"{ "alpha_max": 3.0, "max_contractions": 4 }"#).expect("valid");
        assert_relative_eq!(config.alpha_max(), 3.0);
        assert_eq!(config.max_contractions(), 4);
        assert_relative_eq!(config.contraction(), 0.5);

        let invalid = serde_json::from_str::<Config>(r#"{ "contraction": 2.0 }"#);
        assert!(invalid.is_err());

        let unknown = serde_json::from_str::<Config>(r#"{ "alpha": 1.0 }"#);
        assert!(unknown.is_err());
    }
}
