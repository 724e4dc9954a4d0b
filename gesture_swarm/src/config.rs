//! TOML configuration.
//!
//! Every field has a default, so an empty or partial file is valid.  The file
//! is looked up at `--config <path>` first, then in the platform config
//! directory (`…/gesture_swarm/config.toml`); if neither exists the defaults
//! are used as-is.
//!
//! ```toml
//! [swarm]
//! particle_count = 15000
//! idle_extent    = 6.0
//!
//! [tracking]
//! grace_ms           = 500
//! detect_interval_ms = 50
//!
//! [fireworks]
//! cooldown_ms     = 700
//! burst_particles = 2400
//! lifetime_ms     = 1400
//!
//! [text]
//! phrases = ["Would you", "Would you\nbe my", "Would you\nbe my\nValentine?"]
//!
//! [window]
//! width  = 1280
//! height = 720
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::Deserialize;
use swarm_engine::FireworkConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwarmSection {
    pub particle_count: usize,
    pub idle_extent:    f32,
}

impl Default for SwarmSection {
    fn default() -> Self {
        SwarmSection { particle_count: 15_000, idle_extent: 6.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackingSection {
    pub grace_ms:           f64,
    pub detect_interval_ms: f64,
}

impl Default for TrackingSection {
    fn default() -> Self {
        TrackingSection { grace_ms: 500.0, detect_interval_ms: 50.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FireworksSection {
    pub cooldown_ms:     f64,
    pub burst_particles: usize,
    pub lifetime_ms:     f64,
}

impl Default for FireworksSection {
    fn default() -> Self {
        let d = FireworkConfig::default();
        FireworksSection {
            cooldown_ms:     d.cooldown_ms,
            burst_particles: d.particles,
            lifetime_ms:     d.lifetime_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextSection {
    /// Ordered shortest to longest; one, two and three raised fingers pick
    /// the first, second and third entry.
    pub phrases: Vec<String>,
}

impl Default for TextSection {
    fn default() -> Self {
        TextSection {
            phrases: vec![
                "Would you".to_string(),
                "Would you\nbe my".to_string(),
                "Would you\nbe my\nValentine?".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSection {
    pub width:  usize,
    pub height: usize,
}

impl Default for WindowSection {
    fn default() -> Self {
        WindowSection { width: 1280, height: 720 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub swarm:     SwarmSection,
    pub tracking:  TrackingSection,
    pub fireworks: FireworksSection,
    pub text:      TextSection,
    pub window:    WindowSection,
}

impl Config {
    /// Resolve and load the configuration.
    ///
    /// Returns the config together with the file it came from, or `None`
    /// when the built-in defaults were used.
    pub fn load(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }
        match default_path() {
            Some(path) if path.exists() => Ok((Self::from_file(&path)?, Some(path))),
            Some(path) => {
                debug!("no config at {}, using defaults", path.display());
                Ok((Config::default(), None))
            }
            None => Ok((Config::default(), None)),
        }
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let txt = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Config = toml::from_str(&txt).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        info!("loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bad = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.swarm.particle_count == 0 {
            return bad("swarm.particle_count must be positive");
        }
        if !(self.swarm.idle_extent > 0.0 && self.swarm.idle_extent.is_finite()) {
            return bad("swarm.idle_extent must be a positive number");
        }
        if !(self.tracking.grace_ms > 0.0) || !(self.tracking.detect_interval_ms > 0.0) {
            return bad("tracking intervals must be positive durations");
        }
        if !(self.fireworks.cooldown_ms > 0.0) || !(self.fireworks.lifetime_ms > 0.0) {
            return bad("fireworks durations must be positive");
        }
        if self.fireworks.burst_particles == 0 {
            return bad("fireworks.burst_particles must be positive");
        }
        if self.text.phrases.is_empty() {
            return bad("text.phrases needs at least one phrase");
        }
        if self.window.width == 0 || self.window.height == 0 {
            return bad("window size must be positive");
        }
        Ok(())
    }

    pub fn firework_config(&self) -> FireworkConfig {
        FireworkConfig {
            cooldown_ms: self.fireworks.cooldown_ms,
            particles:   self.fireworks.burst_particles,
            lifetime_ms: self.fireworks.lifetime_ms,
        }
    }
}

/// `<config dir>/gesture_swarm/config.toml`, if the platform has one.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "gesture_swarm").map(|d| d.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(txt: &str) -> Config {
        toml::from_str(txt).unwrap()
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = parse("");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.swarm.particle_count, 15_000);
        assert_eq!(cfg.text.phrases.len(), 3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = parse("[swarm]\nparticle_count = 3000\n\n[fireworks]\ncooldown_ms = 250\n");
        assert_eq!(cfg.swarm.particle_count, 3000);
        assert_eq!(cfg.swarm.idle_extent, 6.0);
        assert_eq!(cfg.fireworks.cooldown_ms, 250.0);
        assert_eq!(cfg.fireworks.burst_particles, 2400);
        assert_eq!(cfg.firework_config().cooldown_ms, 250.0);
    }

    #[test]
    fn custom_phrases() {
        let cfg = parse("[text]\nphrases = [\"Hello\", \"Hello\\nworld\"]\n");
        assert_eq!(cfg.text.phrases, vec!["Hello".to_string(), "Hello\nworld".to_string()]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("[swarm]\nparticles = 10\n").is_err());
    }

    #[test]
    fn validation_catches_nonsense() {
        let mut cfg = Config::default();
        cfg.swarm.particle_count = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = Config::default();
        cfg.text.phrases.clear();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.tracking.detect_interval_ms = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.fireworks.lifetime_ms = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
