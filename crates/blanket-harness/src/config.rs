//! Loading [`BlanketConfig`] overrides from TOML.
//!
//! Every field is optional; missing ones keep their defaults:
//!
//! ```toml
//! velocity_threshold = 80.0
//!
//! [release_spring]
//! mass = 1.0
//! stiffness = 300.0
//! damping = 24.0
//! ```

use std::path::Path;

use blanket_core::BlanketConfig;
use blanket_core::animation::SpringParams;

use crate::error::{HarnessError, Result};

/// Parse and validate a TOML config.
pub fn from_toml_str(s: &str) -> Result<BlanketConfig> {
    let config: BlanketConfig = toml::from_str(s)?;
    validate(&config)?;
    Ok(config)
}

/// Read, parse and validate a TOML config file.
pub fn load(path: impl AsRef<Path>) -> Result<BlanketConfig> {
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).map_err(|e| HarnessError::read_file(path, e))?;
    from_toml_str(&content)
}

/// Check ranges the controller relies on.
pub fn validate(config: &BlanketConfig) -> Result<()> {
    let mut errors = Vec::new();

    let mut non_negative = |name: &str, value: f64| {
        if !(value.is_finite() && value >= 0.0) {
            errors.push(format!("{name} must be a finite non-negative number, got {value}"));
        }
    };
    non_negative("detent_margin", config.detent_margin);
    non_negative("velocity_threshold", config.velocity_threshold);
    non_negative("dismiss_offset_threshold", config.dismiss_offset_threshold);
    non_negative("moving_band_length", config.moving_band_length);
    non_negative("overscroll_band_length", config.overscroll_band_length);

    check_spring("release_spring", &config.release_spring, &mut errors);
    check_spring("entrance_spring", &config.entrance_spring, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::InvalidConfig { errors })
    }
}

fn check_spring(name: &str, params: &SpringParams, errors: &mut Vec<String>) {
    if !(params.mass.is_finite() && params.mass > 0.0) {
        errors.push(format!("{name}.mass must be positive, got {}", params.mass));
    }
    if !(params.stiffness.is_finite() && params.stiffness > 0.0) {
        errors.push(format!(
            "{name}.stiffness must be positive, got {}",
            params.stiffness
        ));
    }
    if !(params.damping.is_finite() && params.damping >= 0.0) {
        errors.push(format!(
            "{name}.damping must be non-negative, got {}",
            params.damping
        ));
    }
}
