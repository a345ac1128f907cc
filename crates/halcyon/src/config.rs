//! # Engine Configuration
//!
//! Loaded once at startup, usually from a `halcyon.toml` next to the game:
//!
//! ```toml
//! max_entities = 2000
//! fixed_fps = 60
//! colliders_visible = true
//! resolution = { w = 800.0, h = 450.0 }
//! ```
//!
//! Missing keys keep their defaults.

use std::path::Path;

use halcyon_core::{Color, Size2D, WorldConfig, MAX_COMPONENT_TYPES};
use serde::Deserialize;
use tracing::info;

use crate::error::{EngineError, EngineResult};

/// Default cap on live entities.
pub const DEFAULT_MAX_ENTITIES: usize = 1000;

/// Largest expected sprite edge, in pixels. Spatial hash cells are twice this.
pub const DEFAULT_MAX_SPRITE_SIZE: f32 = 32.0;

/// Engine-wide settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of live entities.
    pub max_entities: usize,
    /// Maximum number of component types (at most 64).
    pub max_component_types: usize,
    /// Largest expected sprite edge; sets the spatial hash cell size.
    pub max_sprite_size: f32,
    /// Fixed-update rate in passes per second.
    pub fixed_fps: u32,
    /// Frame rate the budget warnings are measured against.
    pub target_fps: u32,
    /// Cap on fixed-update passes in one frame.
    pub max_fixed_steps_per_frame: u32,
    /// Per-subscriber event queue length.
    pub event_capacity: usize,
    /// Draw collider outlines.
    pub colliders_visible: bool,
    /// Clear color for every frame.
    pub background_color: Color,
    /// Window resolution in pixels.
    pub resolution: Size2D,
    /// Seed for animation stagger.
    pub rng_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            max_component_types: MAX_COMPONENT_TYPES,
            max_sprite_size: DEFAULT_MAX_SPRITE_SIZE,
            fixed_fps: 60,
            target_fps: 60,
            max_fixed_steps_per_frame: 5,
            event_capacity: 1024,
            colliders_visible: false,
            background_color: Color::new(33.0 / 255.0, 33.0 / 255.0, 33.0 / 255.0, 1.0),
            resolution: Size2D::new(800.0, 600.0),
            rng_seed: 0,
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigParse`] on malformed TOML and
    /// [`EngineError::InvalidConfig`] on out-of-range values.
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigIo`] if the file cannot be read, or any
    /// error of [`EngineConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the first bad key.
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_component_types == 0 || self.max_component_types > MAX_COMPONENT_TYPES {
            return Err(EngineError::InvalidConfig(format!(
                "max_component_types must be in 1..={MAX_COMPONENT_TYPES}, got {}",
                self.max_component_types
            )));
        }
        if self.max_entities == 0 {
            return Err(EngineError::InvalidConfig("max_entities must be positive".into()));
        }
        if !(self.max_sprite_size.is_finite() && self.max_sprite_size > 0.0) {
            return Err(EngineError::InvalidConfig(
                "max_sprite_size must be a positive number".into(),
            ));
        }
        if self.fixed_fps == 0 || self.target_fps == 0 {
            return Err(EngineError::InvalidConfig("frame rates must be positive".into()));
        }
        Ok(())
    }

    /// Spatial hash cell edge.
    #[inline]
    #[must_use]
    pub fn spatial_cell_size(&self) -> f32 {
        self.max_sprite_size * 2.0
    }

    /// Length of one fixed-update step, in seconds.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fixed_delta(&self) -> f32 {
        1.0 / self.fixed_fps.max(1) as f32
    }

    /// Frame budget implied by `target_fps`, in seconds.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn frame_budget(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }

    /// World sizing derived from this config.
    #[must_use]
    pub const fn world_config(&self) -> WorldConfig {
        WorldConfig {
            max_entities: self.max_entities,
            max_component_types: self.max_component_types,
        }
    }
}
