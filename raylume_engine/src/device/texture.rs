/// Texture descriptor, texture info and format types

use bitflags::bitflags;

/// Texel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    R16G16B16A16_SFLOAT,
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32A32_SFLOAT,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
}

impl TextureFormat {
    /// Bytes per texel as stored by a GPU backend
    pub fn bytes_per_texel(&self) -> u32 {
        match self {
            TextureFormat::R8G8B8A8_UNORM | TextureFormat::R8G8B8A8_SRGB => 4,
            TextureFormat::R16G16B16A16_SFLOAT => 8,
            TextureFormat::R32_SFLOAT => 4,
            TextureFormat::R32G32_SFLOAT => 8,
            TextureFormat::R32G32B32A32_SFLOAT => 16,
            TextureFormat::D32_FLOAT => 4,
            TextureFormat::D24_UNORM_S8_UINT => 4,
        }
    }

    /// True for depth/stencil formats
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::D32_FLOAT | TextureFormat::D24_UNORM_S8_UINT)
    }
}

bitflags! {
    /// How a texture may be accessed by programs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Readable from programs
        const SHADER_RESOURCE = 1 << 0;
        /// Writable as a fullscreen render target
        const RENDER_TARGET = 1 << 1;
        /// Read/write from compute and ray tracing programs
        const UNORDERED_ACCESS = 1 << 2;
        /// Depth/stencil attachment
        const DEPTH_STENCIL = 1 << 3;
    }
}

impl Default for TextureUsage {
    fn default() -> Self {
        TextureUsage::SHADER_RESOURCE | TextureUsage::RENDER_TARGET | TextureUsage::UNORDERED_ACCESS
    }
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    /// Debug name
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Texel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
}

// ===== TEXTURE INFO =====

/// Read-only properties of a created texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Texel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
}

impl TextureInfo {
    /// Number of texels
    pub fn texel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
