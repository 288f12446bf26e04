/// Phase-split contexts handed to stages.
///
/// `ConfigureContext` carries `&mut ResourceRegistry` and exists only during
/// lifecycle events (initialize, scene load, resize). `FrameContext` carries
/// `&ResourceRegistry`: during a frame a stage can read, clear and write
/// channel contents through the device, but it cannot allocate or resize.

use glam::{UVec2, Vec4};
use crate::config::PipelineConfig;
use crate::device::{GraphicsDevice, ProgramDesc, ProgramId, TextureDesc, TextureId};
use crate::error::Result;
use crate::registry::{ChannelDesc, ChannelHandle, ResourceRegistry};
use crate::scene::Scene;

// ===== CONFIGURE CONTEXT =====

/// Context for lifecycle events that may allocate
pub struct ConfigureContext<'a> {
    registry: &'a mut ResourceRegistry,
    device: &'a mut dyn GraphicsDevice,
    config: &'a PipelineConfig,
}

impl<'a> ConfigureContext<'a> {
    pub fn new(
        registry: &'a mut ResourceRegistry,
        device: &'a mut dyn GraphicsDevice,
        config: &'a PipelineConfig,
    ) -> Self {
        Self { registry, device, config }
    }

    /// Declare a screen-sized channel in the configured default format
    pub fn request_channel(&mut self, name: &str) -> Result<ChannelHandle> {
        let desc = ChannelDesc::new(self.config.default_channel_format);
        self.registry.request_channel(&mut *self.device, name, desc)
    }

    /// Declare several default channels
    pub fn request_channels(&mut self, names: &[&str]) -> Result<()> {
        for name in names {
            self.request_channel(name)?;
        }
        Ok(())
    }

    /// Declare a channel with an explicit descriptor
    pub fn request_channel_with(&mut self, name: &str, desc: ChannelDesc) -> Result<ChannelHandle> {
        self.registry.request_channel(&mut *self.device, name, desc)
    }

    /// Join the fixed-size environment map
    pub fn environment_map(&mut self) -> Result<ChannelHandle> {
        self.registry.request_environment_map(&mut *self.device)
    }

    /// Upload new environment map texels (row-major)
    pub fn update_environment_map(&mut self, width: u32, height: u32, texels: &[Vec4]) -> Result<ChannelHandle> {
        self.registry.update_environment_map(&mut *self.device, width, height, texels)
    }

    /// Build a program on the execution backend
    pub fn compile_program(&mut self, desc: &ProgramDesc) -> Result<ProgramId> {
        self.device.compile_program(desc)
    }

    /// Allocate a stage-owned texture (not registered as a channel)
    pub fn create_texture(&mut self, name: &str, size: UVec2) -> Result<TextureId> {
        self.device.create_texture(&TextureDesc {
            name: name.to_string(),
            width: size.x,
            height: size.y,
            format: self.config.default_channel_format,
            usage: Default::default(),
        })
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &*self.registry
    }

    pub fn device(&mut self) -> &mut dyn GraphicsDevice {
        &mut *self.device
    }

    pub fn config(&self) -> &PipelineConfig {
        self.config
    }

    /// Current output size
    pub fn output_size(&self) -> UVec2 {
        self.registry.output_size()
    }

    /// Size of a declared channel's backing texture
    pub fn channel_size(&self, name: &str) -> Option<UVec2> {
        let texture = self.registry.channel(name)?;
        let info = self.device.texture_info(texture)?;
        Some(UVec2::new(info.width, info.height))
    }
}

// ===== FRAME CONTEXT =====

/// Context for one `execute` call
pub struct FrameContext<'a> {
    registry: &'a ResourceRegistry,
    device: &'a mut dyn GraphicsDevice,
    scene: Option<&'a dyn Scene>,
    config: &'a PipelineConfig,
    frame_index: u64,
}

impl<'a> FrameContext<'a> {
    pub fn new(
        registry: &'a ResourceRegistry,
        device: &'a mut dyn GraphicsDevice,
        scene: Option<&'a dyn Scene>,
        config: &'a PipelineConfig,
        frame_index: u64,
    ) -> Self {
        Self { registry, device, scene, config, frame_index }
    }

    /// Backing texture of a channel, if declared
    pub fn channel(&self, name: &str) -> Option<TextureId> {
        self.registry.channel(name)
    }

    /// Backing texture of a channel after clearing it
    pub fn cleared_channel(&mut self, name: &str, value: Vec4) -> Result<Option<TextureId>> {
        self.registry.cleared_channel(&mut *self.device, name, value)
    }

    pub fn registry(&self) -> &ResourceRegistry {
        self.registry
    }

    pub fn device(&mut self) -> &mut dyn GraphicsDevice {
        &mut *self.device
    }

    /// Currently loaded scene
    pub fn scene(&self) -> Option<&'a dyn Scene> {
        self.scene
    }

    pub fn config(&self) -> &PipelineConfig {
        self.config
    }

    /// Monotonic frame counter shared by every stage
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Current output size
    pub fn output_size(&self) -> UVec2 {
        self.registry.output_size()
    }
}
