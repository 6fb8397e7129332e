//=========================================================================
// Loader Configuration
//=========================================================================
//
// Timing parameters for scene transitions.
//
// Built fluently in code (`LoaderConfig::new().with_fade_time(..)`) or
// read from a TOML document. Missing keys fall back to defaults.
//
//   fade_time            = 1.0   # seconds, each way
//   loading_time         = 3.0   # seconds, fake minimum
//   post_load_delay      = 0.1   # seconds, after each scene load
//   activation_threshold = 0.9   # progress that releases activation
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::error::ConfigError;

//=== LoaderConfig ========================================================

/// Progress at which engines park a load while activation is withheld.
/// Thresholds above it would never be reached.
pub const MAX_ACTIVATION_THRESHOLD: f32 = 0.9;

/// Timing configuration for a [`SceneLoader`](crate::core::scene::SceneLoader).
///
/// # Default Values
///
/// - **fade_time**: 1.0 s
/// - **loading_time**: 3.0 s
/// - **post_load_delay**: 0.1 s
/// - **activation_threshold**: 0.9
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Seconds the loading screen takes to fade in, and again to fade out.
    pub fade_time: f32,

    /// Artificial minimum loading duration in seconds.
    pub loading_time: f32,

    /// Pause in seconds after each scene load completes.
    pub post_load_delay: f32,

    /// Reported load progress at which scene activation is released.
    pub activation_threshold: f32,
}

impl LoaderConfig {
    //--- Construction -----------------------------------------------------

    /// Creates a config with default timings.
    pub fn new() -> Self {
        Self {
            fade_time: 1.0,
            loading_time: 3.0,
            post_load_delay: 0.1,
            activation_threshold: 0.9,
        }
    }

    /// Sets the fade duration in seconds.
    ///
    /// # Panics
    ///
    /// Panics if `seconds` is negative or not finite.
    pub fn with_fade_time(mut self, seconds: f32) -> Self {
        assert!(
            seconds.is_finite() && seconds >= 0.0,
            "Fade time must be non-negative, got {}",
            seconds
        );
        self.fade_time = seconds;
        self
    }

    /// Sets the fake loading duration in seconds.
    ///
    /// # Panics
    ///
    /// Panics if `seconds` is negative or not finite.
    pub fn with_loading_time(mut self, seconds: f32) -> Self {
        assert!(
            seconds.is_finite() && seconds >= 0.0,
            "Loading time must be non-negative, got {}",
            seconds
        );
        self.loading_time = seconds;
        self
    }

    /// Sets the pause after each scene load in seconds.
    ///
    /// # Panics
    ///
    /// Panics if `seconds` is negative or not finite.
    pub fn with_post_load_delay(mut self, seconds: f32) -> Self {
        assert!(
            seconds.is_finite() && seconds >= 0.0,
            "Post-load delay must be non-negative, got {}",
            seconds
        );
        self.post_load_delay = seconds;
        self
    }

    /// Sets the progress at which scene activation is released.
    ///
    /// # Panics
    ///
    /// Panics unless `threshold` is in `(0.0, MAX_ACTIVATION_THRESHOLD]`.
    pub fn with_activation_threshold(mut self, threshold: f32) -> Self {
        assert!(
            threshold > 0.0 && threshold <= MAX_ACTIVATION_THRESHOLD,
            "Activation threshold must be in (0, {}], got {}",
            MAX_ACTIVATION_THRESHOLD,
            threshold
        );
        self.activation_threshold = threshold;
        self
    }

    //--- Loading ----------------------------------------------------------

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        debug!("Loading scene loader config from {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Checks every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_seconds("fade_time", self.fade_time)?;
        check_seconds("loading_time", self.loading_time)?;
        check_seconds("post_load_delay", self.post_load_delay)?;

        let t = self.activation_threshold;
        if !(t > 0.0 && t <= MAX_ACTIVATION_THRESHOLD) {
            return Err(ConfigError::Invalid {
                field: "activation_threshold",
                reason: format!("{} is outside (0, {}]", t, MAX_ACTIVATION_THRESHOLD),
            });
        }
        Ok(())
    }

    //--- Durations --------------------------------------------------------

    pub fn fade_duration(&self) -> Duration {
        seconds_to_duration(self.fade_time)
    }

    pub fn loading_duration(&self) -> Duration {
        seconds_to_duration(self.loading_time)
    }

    pub fn post_load_duration(&self) -> Duration {
        seconds_to_duration(self.post_load_delay)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::new()
    }
}

//--- Helpers -------------------------------------------------------------

fn check_seconds(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{} is not a non-negative number of seconds", value),
        })
    }
}

// Out-of-range values collapse to zero; validated configs never hit this.
fn seconds_to_duration(seconds: f32) -> Duration {
    Duration::try_from_secs_f32(seconds).unwrap_or(Duration::ZERO)
}

//=========================================================================
// Unit Tests
//=========================================================================
