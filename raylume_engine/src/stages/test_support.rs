/// Shared fixtures for stage unit tests

use glam::Vec4;
use crate::config::PipelineConfig;
use crate::device::{GraphicsDevice, SoftwareDevice, TextureId};
use crate::registry::ResourceRegistry;
use crate::scene::Scene;
use crate::stage::{ConfigureContext, FrameContext, RenderStage};

/// Device, registry and config wired together the way a pipeline would
pub struct StageHarness {
    pub device: SoftwareDevice,
    pub registry: ResourceRegistry,
    pub config: PipelineConfig,
}

impl StageHarness {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_device(width, height, SoftwareDevice::new())
    }

    pub fn with_device(width: u32, height: u32, device: SoftwareDevice) -> Self {
        Self {
            device,
            registry: ResourceRegistry::new(width, height),
            config: PipelineConfig::default().with_output_size(width, height),
        }
    }

    pub fn configure(&mut self) -> ConfigureContext<'_> {
        ConfigureContext::new(&mut self.registry, &mut self.device, &self.config)
    }

    pub fn frame(&mut self, frame_index: u64) -> FrameContext<'_> {
        FrameContext::new(&self.registry, &mut self.device, None, &self.config, frame_index)
    }

    pub fn frame_with<'a>(&'a mut self, scene: &'a dyn Scene, frame_index: u64) -> FrameContext<'a> {
        FrameContext::new(&self.registry, &mut self.device, Some(scene), &self.config, frame_index)
    }

    pub fn initialize(&mut self, stage: &mut dyn RenderStage) {
        stage.initialize(&mut self.configure()).unwrap();
    }

    /// Registry resize followed by the stage's `on_resize`
    pub fn resize(&mut self, stage: &mut dyn RenderStage, width: u32, height: u32) {
        self.registry.resize_all(&mut self.device, width, height).unwrap();
        stage.on_resize(&mut self.configure(), width, height).unwrap();
    }

    pub fn texture(&self, channel: &str) -> TextureId {
        self.registry.channel(channel).unwrap()
    }

    /// Fill a channel with one value
    pub fn fill(&mut self, channel: &str, value: Vec4) {
        let texture = self.texture(channel);
        self.device.clear_texture(texture, value).unwrap();
    }

    /// Texel (0, 0) of a channel
    pub fn read(&self, channel: &str) -> Vec4 {
        self.device.texel(self.texture(channel), 0, 0).unwrap()
    }

    /// Every texel of a channel
    pub fn read_all(&self, channel: &str) -> Vec<Vec4> {
        self.device.texels(self.texture(channel)).unwrap().to_vec()
    }
}
