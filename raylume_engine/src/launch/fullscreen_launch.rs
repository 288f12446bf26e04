/// FullscreenLaunch - a fullscreen program plus its bindings
///
/// Stages own one of these instead of talking to `ProgramId`s directly.
/// All bindings go to the global scope; the render target is `gTarget`.

use glam::UVec2;
use crate::device::{BindingSlot, GraphicsDevice, ProgramDesc, ProgramId, ShaderValue, TextureId};
use crate::error::Result;
use crate::shaders;
use crate::stage::ConfigureContext;

/// Compiled fullscreen program
#[derive(Debug)]
pub struct FullscreenLaunch {
    source: String,
    program: ProgramId,
}

impl FullscreenLaunch {
    /// Compile `source` as a fullscreen program
    ///
    /// # Errors
    ///
    /// `CompileError` if the backend cannot build it.
    pub fn new(ctx: &mut ConfigureContext<'_>, source: &str) -> Result<Self> {
        let program = ctx.compile_program(&ProgramDesc::fullscreen(source))?;
        Ok(Self { source: source.to_string(), program })
    }

    /// Bind a texture input by name
    pub fn bind_texture(&self, device: &mut dyn GraphicsDevice, name: &str, texture: TextureId) -> Result<()> {
        device.bind_texture(self.program, &BindingSlot::global(name), texture)
    }

    /// Set a constant by name
    pub fn set_constant(
        &self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        value: impl Into<ShaderValue>,
    ) -> Result<()> {
        device.set_constant(self.program, &BindingSlot::global(name), value.into())
    }

    /// Bind the render target
    pub fn set_target(&self, device: &mut dyn GraphicsDevice, texture: TextureId) -> Result<()> {
        self.bind_texture(device, shaders::TARGET_SLOT, texture)
    }

    /// Run the program over `extent`
    pub fn execute(&self, device: &mut dyn GraphicsDevice, extent: UVec2) -> Result<()> {
        device.dispatch(self.program, extent)
    }

    // ===== GETTERS =====

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Destroy the program
    pub fn release(self, device: &mut dyn GraphicsDevice) {
        device.destroy_program(self.program);
    }
}

#[cfg(test)]
#[path = "fullscreen_launch_tests.rs"]
mod tests;
