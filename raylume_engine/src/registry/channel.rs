/// Channel descriptors

use glam::UVec2;
use crate::device::{TextureFormat, TextureUsage};

/// Size policy of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSize {
    /// Tracks the pipeline's output size
    Screen,
    /// Explicit size, never touched by resizes
    Fixed { width: u32, height: u32 },
}

/// Declaration of a channel: what a stage needs from the named slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelDesc {
    pub format: TextureFormat,
    pub size: ChannelSize,
    pub usage: TextureUsage,
}

impl ChannelDesc {
    /// Screen-sized channel of `format` with the default usage
    pub fn new(format: TextureFormat) -> Self {
        Self {
            format,
            size: ChannelSize::Screen,
            usage: TextureUsage::default(),
        }
    }

    /// Fixed-size channel of `format`
    pub fn fixed(format: TextureFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            size: ChannelSize::Fixed { width, height },
            usage: TextureUsage::default(),
        }
    }

    /// Screen-sized depth/stencil channel
    pub fn depth() -> Self {
        Self {
            format: TextureFormat::D24_UNORM_S8_UINT,
            size: ChannelSize::Screen,
            usage: TextureUsage::DEPTH_STENCIL | TextureUsage::SHADER_RESOURCE,
        }
    }

    /// Replace the usage flags
    pub fn with_usage(mut self, usage: TextureUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Two declarations may share a channel when format and size policy agree.
    /// Usage flags never conflict: they are merged.
    pub fn is_compatible(&self, other: &ChannelDesc) -> bool {
        self.format == other.format && self.size == other.size
    }

    /// Concrete size for the given output size
    pub fn resolve_size(&self, output_size: UVec2) -> UVec2 {
        match self.size {
            ChannelSize::Screen => output_size,
            ChannelSize::Fixed { width, height } => UVec2::new(width, height),
        }
    }
}

impl Default for ChannelDesc {
    fn default() -> Self {
        Self::new(TextureFormat::R32G32B32A32_SFLOAT)
    }
}
