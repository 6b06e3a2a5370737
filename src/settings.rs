//! Simulation run settings
//!
//! Persisted as JSON, separately from the physical constants.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SimError, SimResult};

/// Longest accepted time step (seconds)
pub const MAX_DT: f64 = 1.0;

/// Time step presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StepPreset {
    Coarse,
    #[default]
    Standard,
    Fine,
}

impl StepPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepPreset::Coarse => "Coarse",
            StepPreset::Standard => "Standard",
            StepPreset::Fine => "Fine",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "coarse" | "low" => Some(StepPreset::Coarse),
            "standard" | "std" => Some(StepPreset::Standard),
            "fine" | "high" => Some(StepPreset::Fine),
            _ => None,
        }
    }

    /// Integration time step for this preset (seconds)
    pub fn dt(&self) -> f64 {
        match self {
            StepPreset::Coarse => 1.0 / 60.0,
            StepPreset::Standard => 1.0 / 240.0,
            StepPreset::Fine => 1.0 / 1000.0,
        }
    }
}

/// Run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Time step preset
    pub preset: StepPreset,
    /// Explicit time step override (seconds); takes precedence over the preset
    pub dt: Option<f64>,
    /// Step cap for `Simulation::run`
    pub max_steps: u64,
    /// Zero threshold for velocity, contact velocity and vertical spin
    pub tolerance: f64,
    /// Fraction of normal speed kept through a cushion collision (0..=1)
    pub cushion_restitution: f64,
    /// Extra distance within which a ball counts as touching a cushion (m)
    pub contact_slop: f64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            preset: StepPreset::Standard,
            dt: None,
            max_steps: 100_000,
            tolerance: 1e-9,
            cushion_restitution: 0.85,
            contact_slop: 1e-9,
        }
    }
}

impl SimSettings {
    /// Create settings from a time step preset
    pub fn from_preset(preset: StepPreset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    /// Effective time step (override, else preset)
    pub fn time_step(&self) -> f64 {
        self.dt.unwrap_or_else(|| self.preset.dt())
    }

    /// Reject values the stepper cannot work with
    pub fn validate(&self) -> SimResult<()> {
        let dt = self.time_step();
        if !(dt > 0.0 && dt <= MAX_DT) {
            return Err(SimError::configuration("dt", dt));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SimError::configuration("tolerance", self.tolerance));
        }
        if !(0.0..=1.0).contains(&self.cushion_restitution) {
            return Err(SimError::configuration(
                "cushion_restitution",
                self.cushion_restitution,
            ));
        }
        if !(self.contact_slop.is_finite() && self.contact_slop >= 0.0) {
            return Err(SimError::configuration("contact_slop", self.contact_slop));
        }
        Ok(())
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path.as_ref())?;
        let settings: SimSettings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}
