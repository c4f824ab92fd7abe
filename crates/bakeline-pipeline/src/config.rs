//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use bakeline_scene::AttributeDomain;

use crate::backend::RenderSettings;
use crate::bake::PassKind;
use crate::error::{PipelineError, PipelineResult};
use crate::policy::BakeDomain;

/// When to add an edge-split modifier before a vertex bake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSplitMode {
    Never,
    /// Only meshes with an auto-smooth angle.
    AutoSmooth,
    #[default]
    Always,
}

/// Global settings for one pipeline run.
///
/// Every field is optional in the JSON form and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Install the permanent vertex-color preview shader on PROPS+VERT groups.
    pub preview_mode: bool,
    pub edge_split: EdgeSplitMode,
    /// Split angle for meshes without an auto-smooth angle.
    pub default_split_angle_deg: f32,
    pub texture_samples: u32,
    pub vertex_samples: u32,
    pub texture_denoise: bool,
    pub vertex_denoise: bool,
    /// 3x3 median filter over baked images before they are saved.
    pub median_filter: bool,
    pub resolution_multiplier: f32,
    /// Domain of the created `Bake` channel.
    pub vertex_color_domain: AttributeDomain,
    /// Domain the channel is converted to after baking.
    pub vertex_color_convert_to: AttributeDomain,
    pub texture_pass: PassKind,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            preview_mode: true,
            edge_split: EdgeSplitMode::Always,
            default_split_angle_deg: 30.0,
            texture_samples: 512,
            vertex_samples: 4096,
            texture_denoise: true,
            vertex_denoise: false,
            median_filter: false,
            resolution_multiplier: 2.0,
            vertex_color_domain: AttributeDomain::Point,
            vertex_color_convert_to: AttributeDomain::Corner,
            texture_pass: PassKind::Combined,
        }
    }
}

impl PipelineConfig {
    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(PipelineError::ConfigParse)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON config file.
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if !self.resolution_multiplier.is_finite() || self.resolution_multiplier <= 0.0 {
            return Err(PipelineError::invalid_config(format!(
                "resolution_multiplier must be finite and > 0, got {}",
                self.resolution_multiplier
            )));
        }
        if !self.default_split_angle_deg.is_finite()
            || !(0.0..=180.0).contains(&self.default_split_angle_deg)
        {
            return Err(PipelineError::invalid_config(format!(
                "default_split_angle_deg must be within 0..=180, got {}",
                self.default_split_angle_deg
            )));
        }
        if self.texture_samples == 0 || self.vertex_samples == 0 {
            return Err(PipelineError::invalid_config(
                "sample counts must be at least 1",
            ));
        }
        Ok(())
    }

    /// Sample count and denoising for a bake domain.
    pub fn render_settings(&self, domain: BakeDomain) -> RenderSettings {
        match domain {
            BakeDomain::Vert => RenderSettings {
                samples: self.vertex_samples,
                denoise: self.vertex_denoise,
            },
            BakeDomain::Tex => RenderSettings {
                samples: self.texture_samples,
                denoise: self.texture_denoise,
            },
        }
    }

    pub fn preview_mode(mut self, enabled: bool) -> Self {
        self.preview_mode = enabled;
        self
    }

    pub fn edge_split(mut self, mode: EdgeSplitMode) -> Self {
        self.edge_split = mode;
        self
    }

    pub fn resolution_multiplier(mut self, multiplier: f32) -> Self {
        self.resolution_multiplier = multiplier;
        self
    }

    pub fn median_filter(mut self, enabled: bool) -> Self {
        self.median_filter = enabled;
        self
    }

    pub fn texture_pass(mut self, pass: PassKind) -> Self {
        self.texture_pass = pass;
        self
    }

    /// Sets the channel's bake domain and post-bake domain.
    pub fn vertex_color_domains(mut self, bake: AttributeDomain, convert_to: AttributeDomain) -> Self {
        self.vertex_color_domain = bake;
        self.vertex_color_convert_to = convert_to;
        self
    }

    /// Sets texture and vertex sample counts.
    pub fn samples(mut self, texture: u32, vertex: u32) -> Self {
        self.texture_samples = texture;
        self.vertex_samples = vertex;
        self
    }
}
