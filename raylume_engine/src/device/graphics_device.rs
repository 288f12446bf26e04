/// Execution backend trait
///
/// Everything the pipeline needs from a GPU (or a stand-in for one):
/// textures addressed by opaque handles, program compilation, bindings and
/// dispatch. Dispatches against the same texture are ordered in submission
/// order, so a stage reading a channel observes every earlier write.

use glam::{UVec2, Vec4};
use slotmap::new_key_type;
use crate::error::Result;
use crate::scene::Scene;
use super::program::{BindingSlot, ProgramDesc, ShaderValue};
use super::texture::{TextureDesc, TextureInfo};

// ===== HANDLES =====

new_key_type! {
    /// Opaque handle to a device texture
    pub struct TextureId;
}

new_key_type! {
    /// Opaque handle to a compiled program
    pub struct ProgramId;
}

/// Optional backend features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Compute and ray tracing dispatch available
    pub compute: bool,
    /// Hardware ray tracing available
    pub ray_tracing: bool,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self { compute: true, ray_tracing: true }
    }
}

// ===== GRAPHICS DEVICE TRAIT =====

/// Execution backend consumed by the pipeline
pub trait GraphicsDevice {
    /// Backend feature set
    fn capabilities(&self) -> DeviceCapabilities;

    /// Create a texture (contents zeroed on backends that can afford it)
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureId>;

    /// Reallocate a texture in place; contents are undefined afterwards
    fn resize_texture(&mut self, texture: TextureId, width: u32, height: u32) -> Result<()>;

    /// Destroy a texture
    fn destroy_texture(&mut self, texture: TextureId);

    /// Query texture properties
    fn texture_info(&self, texture: TextureId) -> Option<TextureInfo>;

    /// Clear every texel to `value`
    fn clear_texture(&mut self, texture: TextureId, value: Vec4) -> Result<()>;

    /// Upload row-major texels; the length must match the texture's area
    fn write_texels(&mut self, texture: TextureId, texels: &[Vec4]) -> Result<()>;

    /// Blit `src` into `dst`, scaling if sizes differ
    fn copy_texture(&mut self, src: TextureId, dst: TextureId) -> Result<()>;

    /// Build a program; fails with `Error::CompileError`
    fn compile_program(&mut self, desc: &ProgramDesc) -> Result<ProgramId>;

    /// Release a program and its bindings
    fn destroy_program(&mut self, program: ProgramId);

    /// Bind a texture to a program slot
    fn bind_texture(&mut self, program: ProgramId, slot: &BindingSlot, texture: TextureId) -> Result<()>;

    /// Set a constant on a program slot
    fn set_constant(&mut self, program: ProgramId, slot: &BindingSlot, value: ShaderValue) -> Result<()>;

    /// Bind scene geometry to a ray tracing program
    fn bind_scene(&mut self, program: ProgramId, scene: &dyn Scene) -> Result<()>;

    /// Run a program over `extent` pixels
    fn dispatch(&mut self, program: ProgramId, extent: UVec2) -> Result<()>;
}
