/// Pipeline configuration.
///
/// One explicit struct handed to every stage's `initialize` through the
/// configure context. Values that used to be hardcoded per stage (default
/// scene, ray t-min, channel format) live here instead.

use std::path::PathBuf;
use glam::{UVec2, Vec4};
use crate::device::TextureFormat;

/// Deployment-level settings shared by every stage of a pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Initial output width in pixels
    pub output_width: u32,
    /// Initial output height in pixels
    pub output_height: u32,
    /// Scene the host should load when none is given explicitly
    pub default_scene: Option<PathBuf>,
    /// Format used by channels requested without an explicit descriptor
    pub default_channel_format: TextureFormat,
    /// Minimum ray distance used by ray tracing stages
    pub min_t_distance: f32,
    /// Value cleared into output channels that have no source
    pub clear_color: Vec4,
    /// Seed for stochastic stages (jitter, lens sampling)
    pub random_seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_width: 1920,
            output_height: 1080,
            default_scene: None,
            default_channel_format: TextureFormat::R32G32B32A32_SFLOAT,
            min_t_distance: 1.0e-4,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            random_seed: 0,
        }
    }
}

impl PipelineConfig {
    /// Set the initial output size
    pub fn with_output_size(mut self, width: u32, height: u32) -> Self {
        self.output_width = width;
        self.output_height = height;
        self
    }

    /// Set the scene loaded by the host when none is given
    pub fn with_default_scene(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_scene = Some(path.into());
        self
    }

    /// Set the default channel format
    pub fn with_default_channel_format(mut self, format: TextureFormat) -> Self {
        self.default_channel_format = format;
        self
    }

    /// Set the minimum ray distance
    pub fn with_min_t_distance(mut self, min_t: f32) -> Self {
        self.min_t_distance = min_t;
        self
    }

    /// Set the output clear color
    pub fn with_clear_color(mut self, color: Vec4) -> Self {
        self.clear_color = color;
        self
    }

    /// Set the seed for stochastic stages
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Initial output size as a vector
    pub fn output_size(&self) -> UVec2 {
        UVec2::new(self.output_width, self.output_height)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
