/// Temporal accumulation stage
///
/// Keeps a running average of a noisy source channel while the camera holds
/// still. Per frame:
///
/// 1. Disabled or missing inputs: do nothing.
/// 2. If the active camera's view matrix changed since the last frame, restart
///    (`frames_accumulated = 0`). Scene loads, resizes and forced refreshes
///    restart immediately when they happen.
/// 3. Combine `(acc * n + src) / (n + 1)` into an internal target. With
///    `n == 0` the result is exactly `src`, so a restart needs no clear.
/// 4. Copy the result into the accumulator channel and into the stage-owned
///    last-frame buffer read by the next combine.
/// 5. `frames_accumulated += 1`.

use std::any::Any;
use glam::{Mat4, UVec2};
use crate::device::{GraphicsDevice, TextureId};
use crate::error::Result;
use crate::launch::FullscreenLaunch;
use crate::scene::Scene;
use crate::shaders;
use crate::stage::{ConfigureContext, DiagnosticUi, FrameContext, RenderStage};
use crate::{engine_debug, engine_trace};

const SOURCE: &str = "raylume::TemporalAccumulation";

/// Running average of a source channel
pub struct TemporalAccumulationStage {
    source_channel: String,
    accumulator_channel: String,
    enabled: bool,
    frames_accumulated: u32,
    last_camera_transform: Option<Mat4>,
    launch: Option<FullscreenLaunch>,
    /// Previous combined result
    last_frame: Option<TextureId>,
    /// Combine target, copied out after each dispatch
    combined: Option<TextureId>,
}

impl TemporalAccumulationStage {
    /// Accumulate `channel` in place
    pub fn new(channel: &str) -> Self {
        Self::with_accumulator(channel, channel)
    }

    /// Accumulate `source` into a separate `accumulator` channel
    pub fn with_accumulator(source: &str, accumulator: &str) -> Self {
        Self {
            source_channel: source.to_string(),
            accumulator_channel: accumulator.to_string(),
            enabled: true,
            frames_accumulated: 0,
            last_camera_transform: None,
            launch: None,
            last_frame: None,
            combined: None,
        }
    }

    // ===== GETTERS =====

    /// Weight of the accumulated history
    pub fn frames_accumulated(&self) -> u32 {
        self.frames_accumulated
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn source_channel(&self) -> &str {
        &self.source_channel
    }

    pub fn accumulator_channel(&self) -> &str {
        &self.accumulator_channel
    }

    /// View matrix observed at the last executed frame
    pub fn last_camera_transform(&self) -> Option<&Mat4> {
        self.last_camera_transform.as_ref()
    }

    // ===== SETTERS =====

    /// Turn accumulation on or off; any change restarts the average
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.reset("toggled");
        }
    }

    fn reset(&mut self, reason: &str) {
        if self.frames_accumulated > 0 {
            engine_debug!(SOURCE, "Reset after {} frames ({})", self.frames_accumulated, reason);
        }
        self.frames_accumulated = 0;
    }

    fn release_buffers(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(texture) = self.last_frame.take() {
            device.destroy_texture(texture);
        }
        if let Some(texture) = self.combined.take() {
            device.destroy_texture(texture);
        }
    }

    /// (Re)create the last-frame and combine buffers at the accumulator's size
    fn rebuild_buffers(&mut self, ctx: &mut ConfigureContext<'_>) -> Result<()> {
        self.release_buffers(ctx.device());
        let size = ctx
            .channel_size(&self.accumulator_channel)
            .unwrap_or_else(|| ctx.output_size());
        self.last_frame = Some(ctx.create_texture("TemporalAccumulation.LastFrame", size)?);
        self.combined = Some(ctx.create_texture("TemporalAccumulation.Combined", size)?);
        Ok(())
    }

    fn camera_moved(&mut self, scene: Option<&dyn Scene>) -> bool {
        let Some(view) = scene.and_then(|s| s.active_camera()).map(|c| *c.view_matrix()) else {
            return false;
        };
        let moved = self.last_camera_transform != Some(view);
        self.last_camera_transform = Some(view);
        moved
    }
}

impl RenderStage for TemporalAccumulationStage {
    fn name(&self) -> &str {
        "Temporal Accumulation"
    }

    fn initialize(&mut self, ctx: &mut ConfigureContext<'_>) -> Result<()> {
        ctx.request_channel(&self.source_channel)?;
        ctx.request_channel(&self.accumulator_channel)?;
        if let Some(old) = self.launch.take() {
            old.release(ctx.device());
        }
        self.launch = Some(FullscreenLaunch::new(ctx, shaders::ACCUMULATION_SOURCE)?);
        self.rebuild_buffers(ctx)?;
        self.frames_accumulated = 0;
        Ok(())
    }

    fn on_scene_loaded(&mut self, _ctx: &mut ConfigureContext<'_>, scene: &dyn Scene) -> Result<()> {
        self.last_camera_transform = scene.active_camera().map(|c| *c.view_matrix());
        self.reset("scene loaded");
        Ok(())
    }

    fn on_resize(&mut self, ctx: &mut ConfigureContext<'_>, width: u32, height: u32) -> Result<()> {
        self.rebuild_buffers(ctx)?;
        self.reset("resized");
        engine_trace!(SOURCE, "Buffers rebuilt for {}x{}", width, height);
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let (Some(source), Some(accumulator)) = (
            ctx.channel(&self.source_channel),
            ctx.channel(&self.accumulator_channel),
        ) else {
            return Ok(());
        };
        if self.camera_moved(ctx.scene()) {
            self.reset("camera moved");
        }
        let (Some(launch), Some(last_frame), Some(combined)) =
            (self.launch.as_ref(), self.last_frame, self.combined)
        else {
            return Ok(());
        };

        let device = ctx.device();
        let Some(info) = device.texture_info(combined) else {
            return Ok(());
        };
        launch.bind_texture(device, shaders::CURRENT_FRAME_SLOT, source)?;
        launch.bind_texture(device, shaders::LAST_FRAME_SLOT, last_frame)?;
        launch.set_constant(device, shaders::ACCUM_COUNT_SLOT, self.frames_accumulated)?;
        launch.set_target(device, combined)?;
        launch.execute(device, UVec2::new(info.width, info.height))?;

        device.copy_texture(combined, accumulator)?;
        device.copy_texture(combined, last_frame)?;
        self.frames_accumulated = self.frames_accumulated.saturating_add(1);
        Ok(())
    }

    fn on_forced_refresh(&mut self) {
        self.reset("forced refresh");
    }

    fn render_gui(&mut self, ui: &mut dyn DiagnosticUi) -> bool {
        let changed = ui.checkbox("Accumulating samples temporally", &mut self.enabled);
        ui.text(&format!("Frames accumulated: {}", self.frames_accumulated));
        changed
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.release_buffers(device);
        if let Some(launch) = self.launch.take() {
            launch.release(device);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "temporal_accumulation_tests.rs"]
mod tests;
