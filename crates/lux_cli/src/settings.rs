//! Render settings read from a JSON file.
//!
//! Every field has a default, so `{}` is a valid settings file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or validating settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    OnOff,
    Flat,
    PointLight,
    PathTracer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraKind {
    Perspective,
    Orthogonal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenePreset {
    Demo,
    Furnace,
    Csg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    pub renderer: RendererKind,
    pub scene: ScenePreset,
    pub width: u32,
    pub height: u32,
    /// Antialiasing grid per pixel side; 0 and 1 disable it
    pub samples_per_side: u32,
    pub num_of_rays: u32,
    pub max_depth: u32,
    pub russian_roulette_limit: u32,
    pub seed: u64,
    pub init_seq: u64,
    pub background: [f32; 3],
    pub camera: CameraKind,
    /// Camera position before the rotation about Z
    pub camera_position: [f32; 3],
    /// Rotation of the camera about the world Z axis, in degrees
    pub camera_angle_deg: f32,
    /// Eye to screen distance of the perspective camera
    pub screen_distance: f32,
    pub output_path: PathBuf,
    pub gamma: f32,
    pub luminosity_factor: f32,
    pub parallel: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            renderer: RendererKind::PathTracer,
            scene: ScenePreset::Demo,
            width: 640,
            height: 480,
            samples_per_side: 0,
            num_of_rays: 10,
            max_depth: 2,
            russian_roulette_limit: 3,
            seed: 42,
            init_seq: 54,
            background: [0.0, 0.0, 0.0],
            camera: CameraKind::Perspective,
            camera_position: [-1.0, 0.0, 1.0],
            camera_angle_deg: 0.0,
            screen_distance: 1.0,
            output_path: PathBuf::from("lux.png"),
            gamma: 1.0,
            luminosity_factor: 0.6,
            parallel: true,
        }
    }
}

impl RenderSettings {
    /// Parse settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: RenderSettings = serde_json::from_str(json)?;
        Ok(settings)
    }

    /// Read settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::Invalid("width and height must be positive".into()));
        }

        if self.max_depth == 0 && self.renderer == RendererKind::PathTracer {
            return Err(SettingsError::Invalid("maxDepth must be at least 1".into()));
        }

        if !(self.screen_distance > 0.0) {
            return Err(SettingsError::Invalid("screenDistance must be positive".into()));
        }

        if !(self.gamma > 0.0) || !(self.luminosity_factor > 0.0) {
            return Err(SettingsError::Invalid("gamma and luminosityFactor must be positive".into()));
        }

        let finite = |v: [f32; 3]| v.iter().all(|c| c.is_finite());
        if !finite(self.background) || !finite(self.camera_position) || !self.camera_angle_deg.is_finite() {
            return Err(SettingsError::Invalid("camera and background values must be finite".into()));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(SettingsError::Invalid("outputPath must not be empty".into()));
        }

        Ok(())
    }
}
