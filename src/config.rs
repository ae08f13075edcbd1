// config.rs - Scene layout and asset configuration
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::math::Colour;

pub const DEFAULT_MODEL_URI: &str = "static/skyscraper.glb";

/// Every tunable of the composed scene. Missing JSON fields fall back to
/// the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub model_uri: String,
    pub plane_width: f32,
    pub plane_height: f32,
    pub wall_colour: Colour,
    pub sphere_radius: f32,
    pub sphere_segments: u32,
    pub sphere_height: f32,
    pub sphere_colour: Colour,
    pub mesh_colour: Colour,
    pub mesh_offset: [f32; 3],
    pub mesh_scale: f32,
    pub light_position: [f32; 3],
    pub light_colour: Colour,
    pub open_panel: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model_uri: DEFAULT_MODEL_URI.to_string(),
            plane_width: 25.0,
            plane_height: 25.0,
            wall_colour: Colour::WHITE,
            sphere_radius: 1.0,
            sphere_segments: 20,
            sphere_height: 1.0,
            sphere_colour: Colour::from_rgb(0x44, 0xaa, 0x88),
            mesh_colour: Colour::from_rgb(0xcc, 0xcc, 0xcc),
            mesh_offset: [4.0, 5.25, -3.0],
            mesh_scale: 3.0,
            light_position: [2.0, 8.0, 5.0],
            light_colour: Colour::WHITE,
            open_panel: true,
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid scene configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("While parsing {:?}", path))
    }

    /// Resolves the configuration for a run: the optional file, then the
    /// `GLTF_FILE` environment variable, then an explicit model path.
    pub fn resolve(config_path: Option<&Path>, model: Option<&str>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_model_overrides(std::env::var("GLTF_FILE").ok(), model);
        Ok(config)
    }

    /// `env_model` only replaces the default model path; `cli_model`
    /// replaces whatever is set.
    pub fn apply_model_overrides(&mut self, env_model: Option<String>, cli_model: Option<&str>) {
        if let Some(uri) = env_model.filter(|_| self.model_uri == DEFAULT_MODEL_URI) {
            self.model_uri = uri;
        }
        if let Some(uri) = cli_model {
            self.model_uri = uri.to_string();
        }
    }
}
