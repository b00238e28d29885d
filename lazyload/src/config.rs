//! Lazy-load configuration.
//!
//! [`LazyLoadConfig`] is the resolved configuration a session runs with.
//! Callers describe only what they want to change through
//! [`LazyLoadOptions`]; every field left unset falls back to the documented
//! default.
//!
//! # Example
//!
//! ```
//! use lazyload::config::LazyLoadOptions;
//!
//! let options = LazyLoadOptions::from_json(r#"{"on": "scroll resize", "concurrent": 2}"#)?;
//! let config = options.resolve()?;
//!
//! assert_eq!(config.concurrent, 2);
//! assert_eq!(config.attribute, "data-original");
//! assert_eq!(config.events().collect::<Vec<_>>(), vec!["scroll", "resize"]);
//! # Ok::<(), lazyload::ConfigError>(())
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::loader::DrainSettings;

// =============================================================================
// Defaults
// =============================================================================

/// Default trigger events (space-separated).
pub const DEFAULT_EVENTS: &str = "scroll";

/// Default look-ahead margin in pixels.
pub const DEFAULT_THRESHOLD: f64 = 1000.0;

/// Default display effect name.
pub const DEFAULT_EFFECT: &str = "show";

/// Default candidate selector.
pub const DEFAULT_SELECTOR: &str = "[data-original]";

/// Default attribute holding the real image URL.
pub const DEFAULT_ATTRIBUTE: &str = "data-original";

/// Default loader concurrency ceiling.
pub const DEFAULT_CONCURRENT: usize = 5;

/// Default fade-in duration in milliseconds.
pub const DEFAULT_SPEED_MS: u64 = 50;

// =============================================================================
// Resolved configuration
// =============================================================================

/// Configuration a session runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct LazyLoadConfig {
    /// Space-separated container events that trigger recalculation.
    pub on: String,

    /// Look-ahead margin in pixels.
    ///
    /// Carried and validated, but not applied to the visibility test.
    pub threshold: f64,

    /// Display effect name. Reserved.
    pub effect: String,

    /// Selector used to find candidate elements inside the container.
    pub selector: String,

    /// Attribute holding the real image URL.
    pub attribute: String,

    /// Maximum number of fetches in flight.
    pub concurrent: usize,

    /// Fade-in duration for swapped images.
    pub speed: Duration,
}

impl Default for LazyLoadConfig {
    fn default() -> Self {
        Self {
            on: DEFAULT_EVENTS.to_string(),
            threshold: DEFAULT_THRESHOLD,
            effect: DEFAULT_EFFECT.to_string(),
            selector: DEFAULT_SELECTOR.to_string(),
            attribute: DEFAULT_ATTRIBUTE.to_string(),
            concurrent: DEFAULT_CONCURRENT,
            speed: Duration::from_millis(DEFAULT_SPEED_MS),
        }
    }
}

impl LazyLoadConfig {
    /// Iterates the configured trigger event names.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.on.split_whitespace()
    }

    /// The event synthesized once when a session starts.
    pub fn first_event(&self) -> Option<&str> {
        self.events().next()
    }

    /// Set the trigger events.
    pub fn with_events(mut self, on: impl Into<String>) -> Self {
        self.on = on.into();
        self
    }

    /// Set the candidate selector.
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    /// Set the source attribute.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = attribute.into();
        self
    }

    /// Set the concurrency ceiling.
    pub fn with_concurrent(mut self, concurrent: usize) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Set the fade-in duration.
    pub fn with_speed(mut self, speed: Duration) -> Self {
        self.speed = speed;
        self
    }

    /// Checks the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrent == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.first_event().is_none() {
            return Err(ConfigError::NoEvents);
        }
        if self.selector.trim().is_empty() {
            return Err(ConfigError::EmptySelector);
        }
        if self.attribute.trim().is_empty() {
            return Err(ConfigError::EmptyAttribute);
        }
        if !self.threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }

    /// The subset of the configuration the loader needs.
    pub fn drain_settings(&self) -> DrainSettings {
        DrainSettings {
            concurrent: self.concurrent,
            speed: self.speed,
        }
    }
}

// =============================================================================
// Caller overrides
// =============================================================================

/// Caller-supplied overrides; unset fields keep their defaults.
///
/// Deserializes from the same keys the options object accepts:
/// `on`, `threshold`, `effect`, `selector`, `attribute`, `concurrent` and
/// `speed` (milliseconds).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LazyLoadOptions {
    pub on: Option<String>,
    pub threshold: Option<f64>,
    pub effect: Option<String>,
    pub selector: Option<String>,
    pub attribute: Option<String>,
    pub concurrent: Option<usize>,
    pub speed: Option<f64>,
}

impl LazyLoadOptions {
    /// Parses overrides from a JSON object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Merges the overrides over the defaults and validates the result.
    pub fn resolve(&self) -> Result<LazyLoadConfig, ConfigError> {
        let defaults = LazyLoadConfig::default();

        let speed = match self.speed {
            Some(ms) if !ms.is_finite() || ms < 0.0 => return Err(ConfigError::InvalidSpeed(ms)),
            Some(ms) => Duration::from_micros((ms * 1000.0).round() as u64),
            None => defaults.speed,
        };

        let config = LazyLoadConfig {
            on: self.on.clone().unwrap_or(defaults.on),
            threshold: self.threshold.unwrap_or(defaults.threshold),
            effect: self.effect.clone().unwrap_or(defaults.effect),
            selector: self.selector.clone().unwrap_or(defaults.selector),
            attribute: self.attribute.clone().unwrap_or(defaults.attribute),
            concurrent: self.concurrent.unwrap_or(defaults.concurrent),
            speed,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LazyLoadConfig::default();
        assert_eq!(config.on, "scroll");
        assert_eq!(config.threshold, 1000.0);
        assert_eq!(config.selector, "[data-original]");
        assert_eq!(config.attribute, "data-original");
        assert_eq!(config.concurrent, 5);
        assert_eq!(config.speed, Duration::from_millis(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_options_resolve_to_defaults() {
        let config = LazyLoadOptions::default().resolve().unwrap();
        assert_eq!(config, LazyLoadConfig::default());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let options = LazyLoadOptions {
            on: Some("scroll resize".to_string()),
            concurrent: Some(1),
            speed: Some(200.0),
            ..Default::default()
        };
        let config = options.resolve().unwrap();

        assert_eq!(config.concurrent, 1);
        assert_eq!(config.speed, Duration::from_millis(200));
        assert_eq!(config.first_event(), Some("scroll"));
        assert_eq!(config.events().count(), 2);
        assert_eq!(config.selector, DEFAULT_SELECTOR);
    }

    #[test]
    fn test_events_ignore_repeated_spaces() {
        let config = LazyLoadConfig::default().with_events("  scroll   touchmove ");
        assert_eq!(config.events().collect::<Vec<_>>(), vec!["scroll", "touchmove"]);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let options = LazyLoadOptions {
            concurrent: Some(0),
            ..Default::default()
        };
        assert!(matches!(options.resolve(), Err(ConfigError::ZeroConcurrency)));
    }

    #[test]
    fn test_blank_events_rejected() {
        let options = LazyLoadOptions {
            on: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(options.resolve(), Err(ConfigError::NoEvents)));
    }

    #[test]
    fn test_negative_speed_rejected() {
        let options = LazyLoadOptions {
            speed: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(options.resolve(), Err(ConfigError::InvalidSpeed(_))));
    }

    #[test]
    fn test_empty_selector_and_attribute_rejected() {
        let config = LazyLoadConfig::default().with_selector("");
        assert!(matches!(config.validate(), Err(ConfigError::EmptySelector)));

        let config = LazyLoadConfig::default().with_attribute(" ");
        assert!(matches!(config.validate(), Err(ConfigError::EmptyAttribute)));
    }

    #[test]
    fn test_non_numeric_concurrent_fails_to_parse() {
        let result = LazyLoadOptions::from_json(r#"{"concurrent": "many"}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_key_fails_to_parse() {
        let result = LazyLoadOptions::from_json(r#"{"concurency": 3}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_json_with_all_keys() {
        let options = LazyLoadOptions::from_json(
            r#"{
                "on": "scroll",
                "threshold": 250,
                "effect": "fadeIn",
                "selector": "[data-src]",
                "attribute": "data-src",
                "concurrent": 3,
                "speed": 120
            }"#,
        )
        .unwrap();
        let config = options.resolve().unwrap();

        assert_eq!(config.threshold, 250.0);
        assert_eq!(config.effect, "fadeIn");
        assert_eq!(config.attribute, "data-src");
        assert_eq!(config.drain_settings().concurrent, 3);
        assert_eq!(config.drain_settings().speed, Duration::from_millis(120));
    }
}
