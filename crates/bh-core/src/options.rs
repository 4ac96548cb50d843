//! Combat options and configuration
//!
//! Tunable durations and limits read by the turn controller and the projectile
//! engine. Options come from defaults, an rc-style text file, or JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime-tunable combat settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatOptions {
    // Player protection
    pub immunity_duration: f32,
    pub blink_interval: f32,
    pub death_defiance_duration: f32,
    pub death_defiance_defense: i32,

    // Projectiles
    pub explosion_duration: f32,
    pub max_bullet_age: f32,
    pub compact_threshold: usize,

    // Turn flow
    pub attack_sequence_duration: f32,
    pub confirm_presses: u32,

    // Display
    pub bar_speed: f32,
}

impl Default for CombatOptions {
    fn default() -> Self {
        Self {
            immunity_duration: 1.0,
            blink_interval: 0.1,
            death_defiance_duration: 3.0,
            death_defiance_defense: 9999,

            explosion_duration: 0.25,
            max_bullet_age: 20.0,
            compact_threshold: 64,

            attack_sequence_duration: 0.8,
            confirm_presses: 2,

            bar_speed: 6.0,
        }
    }
}

impl CombatOptions {
    /// Load options from a file; `.json` files are parsed as JSON, anything else as rc text
    pub fn load_from_file(path: &Path) -> Result<Self, OptionsError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| OptionsError::Io(e.to_string()))?;

        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            Self::from_json(&contents)
        } else {
            Self::parse_config(&contents)
        }
    }

    /// Parse options from JSON; missing fields keep their defaults
    pub fn from_json(contents: &str) -> Result<Self, OptionsError> {
        serde_json::from_str(contents).map_err(|e| OptionsError::Json(e.to_string()))
    }

    /// Parse options from a config string (`OPTIONS=key:value,...` lines)
    pub fn parse_config(contents: &str) -> Result<Self, OptionsError> {
        let mut options = Self::default();

        for line in contents.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(opts) = line.strip_prefix("OPTIONS=") {
                for opt in opts.split(',') {
                    options.parse_option(opt.trim())?;
                }
            } else {
                return Err(OptionsError::Parse(line.to_string()));
            }
        }

        Ok(options)
    }

    fn parse_option(&mut self, opt: &str) -> Result<(), OptionsError> {
        if opt.is_empty() {
            return Ok(());
        }
        if let Some((key, value)) = opt.split_once(':').or_else(|| opt.split_once('=')) {
            return self.set_option(key.trim(), value.trim());
        }
        Err(OptionsError::MissingValue(opt.to_string()))
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionsError> {
        match name {
            "immunity_duration" => self.immunity_duration = parse_seconds(name, value)?,
            "blink_interval" => self.blink_interval = parse_seconds(name, value)?,
            "death_defiance_duration" => self.death_defiance_duration = parse_seconds(name, value)?,
            "death_defiance_defense" => self.death_defiance_defense = parse_value(name, value)?,
            "explosion_duration" => self.explosion_duration = parse_seconds(name, value)?,
            "max_bullet_age" => self.max_bullet_age = parse_seconds(name, value)?,
            "compact_threshold" => self.compact_threshold = parse_value(name, value)?,
            "attack_sequence_duration" => {
                self.attack_sequence_duration = parse_seconds(name, value)?
            }
            "confirm_presses" => self.confirm_presses = parse_value(name, value)?,
            "bar_speed" => self.bar_speed = parse_seconds(name, value)?,
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    /// Convert options to config file format
    pub fn to_config_string(&self) -> String {
        let mut lines = Vec::new();
        lines.push("# bh combat options".to_string());
        lines.push(String::new());

        lines.push("# Player protection".to_string());
        lines.push(format!("OPTIONS=immunity_duration:{}", self.immunity_duration));
        lines.push(format!("OPTIONS=blink_interval:{}", self.blink_interval));
        lines.push(format!(
            "OPTIONS=death_defiance_duration:{},death_defiance_defense:{}",
            self.death_defiance_duration, self.death_defiance_defense
        ));

        lines.push(String::new());
        lines.push("# Projectiles".to_string());
        lines.push(format!("OPTIONS=explosion_duration:{}", self.explosion_duration));
        lines.push(format!("OPTIONS=max_bullet_age:{}", self.max_bullet_age));
        lines.push(format!("OPTIONS=compact_threshold:{}", self.compact_threshold));

        lines.push(String::new());
        lines.push("# Turn flow".to_string());
        lines.push(format!(
            "OPTIONS=attack_sequence_duration:{}",
            self.attack_sequence_duration
        ));
        lines.push(format!("OPTIONS=confirm_presses:{}", self.confirm_presses));
        lines.push(format!("OPTIONS=bar_speed:{}", self.bar_speed));

        lines.join("\n")
    }
}

fn parse_value<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, OptionsError> {
    value
        .parse()
        .map_err(|_| OptionsError::InvalidValue(name.to_string(), value.to_string()))
}

/// Durations and rates must be finite and non-negative
fn parse_seconds(name: &str, value: &str) -> Result<f32, OptionsError> {
    let v: f32 = parse_value(name, value)?;
    if !v.is_finite() || v < 0.0 {
        return Err(OptionsError::InvalidValue(name.to_string(), value.to_string()));
    }
    Ok(v)
}

/// Options loading errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Invalid value '{1}' for option '{0}'")]
    InvalidValue(String, String),

    #[error("Missing value for option: {0}")]
    MissingValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = CombatOptions::default();
        assert_eq!(opts.confirm_presses, 2);
        assert!(opts.death_defiance_defense > 1000);
    }

    #[test]
    fn test_parse_value_options() {
        let config = "# tuned\nOPTIONS=immunity_duration:0.5,confirm_presses=3";
        let opts = CombatOptions::parse_config(config).unwrap();
        assert_eq!(opts.immunity_duration, 0.5);
        assert_eq!(opts.confirm_presses, 3);
        assert_eq!(opts.blink_interval, 0.1);
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = CombatOptions::parse_config("OPTIONS=warp_speed:9").unwrap_err();
        assert_eq!(err, OptionsError::UnknownOption("warp_speed".to_string()));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let err = CombatOptions::parse_config("OPTIONS=immunity_duration:-1").unwrap_err();
        assert!(matches!(err, OptionsError::InvalidValue(..)));
    }

    #[test]
    fn test_missing_value() {
        let err = CombatOptions::parse_config("OPTIONS=bar_speed").unwrap_err();
        assert_eq!(err, OptionsError::MissingValue("bar_speed".to_string()));
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let opts = CombatOptions::from_json(r#"{ "explosion_duration": 0.5 }"#).unwrap();
        assert_eq!(opts.explosion_duration, 0.5);
        assert_eq!(opts.immunity_duration, 1.0);
    }

    #[test]
    fn test_roundtrip() {
        let mut opts = CombatOptions::default();
        opts.immunity_duration = 1.5;
        opts.compact_threshold = 10;
        let parsed = CombatOptions::parse_config(&opts.to_config_string()).unwrap();
        assert_eq!(parsed, opts);
    }
}
