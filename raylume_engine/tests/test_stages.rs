#![allow(dead_code)]
//! Test stages shared by the integration tests
//!
//! Minimal `RenderStage` implementations that write known values into
//! channels, so frame results can be checked through `SoftwareDevice`.

use std::any::Any;
use raylume_engine::glam::Vec4;
use raylume_engine::raylume::device::SoftwareDevice;
use raylume_engine::raylume::pipeline::Pipeline;
use raylume_engine::raylume::stage::{ConfigureContext, FrameContext, RenderStage};
use raylume_engine::raylume::Result;

/// Fills `channel` with the current frame index every frame
pub struct FrameIndexSource {
    channel: String,
}

impl FrameIndexSource {
    pub fn new(channel: &str) -> Self {
        Self { channel: channel.to_string() }
    }
}

impl RenderStage for FrameIndexSource {
    fn name(&self) -> &str {
        "Frame Index Source"
    }

    fn initialize(&mut self, ctx: &mut ConfigureContext<'_>) -> Result<()> {
        ctx.request_channel(&self.channel)?;
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        let value = Vec4::splat(ctx.frame_index() as f32);
        ctx.cleared_channel(&self.channel, value)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Copies `from` into `to` every frame
pub struct ChannelCopy {
    from: String,
    to: String,
}

impl ChannelCopy {
    pub fn new(from: &str, to: &str) -> Self {
        Self { from: from.to_string(), to: to.to_string() }
    }
}

impl RenderStage for ChannelCopy {
    fn name(&self) -> &str {
        "Channel Copy"
    }

    fn initialize(&mut self, ctx: &mut ConfigureContext<'_>) -> Result<()> {
        ctx.request_channels(&[self.from.as_str(), self.to.as_str()])
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        let (Some(src), Some(dst)) = (ctx.channel(&self.from), ctx.channel(&self.to)) else {
            return Ok(());
        };
        ctx.device().copy_texture(src, dst)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Texel (0, 0) of `channel`
pub fn read_channel(pipeline: &Pipeline<SoftwareDevice>, channel: &str) -> Vec4 {
    let texture = pipeline.registry().channel(channel).expect("channel declared");
    pipeline.device().texel(texture, 0, 0).expect("texture alive")
}
