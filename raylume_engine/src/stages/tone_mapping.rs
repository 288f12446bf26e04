/// ToneMappingStage - HDR channel to displayable channel

use std::any::Any;
use glam::UVec2;
use crate::device::{GraphicsDevice, TONE_OPERATOR_CLAMP, TONE_OPERATOR_REINHARD};
use crate::error::Result;
use crate::launch::FullscreenLaunch;
use crate::shaders;
use crate::stage::{ConfigureContext, DiagnosticUi, FrameContext, RenderStage};

/// Tone mapping operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToneMapOperator {
    /// Clamp to [0, 1]
    #[default]
    Clamp,
    /// `c / (1 + c)`
    Reinhard,
}

impl ToneMapOperator {
    const NAMES: [&'static str; 2] = ["Clamp", "Reinhard"];

    fn id(self) -> u32 {
        match self {
            ToneMapOperator::Clamp => TONE_OPERATOR_CLAMP,
            ToneMapOperator::Reinhard => TONE_OPERATOR_REINHARD,
        }
    }

    fn index(self) -> usize {
        match self {
            ToneMapOperator::Clamp => 0,
            ToneMapOperator::Reinhard => 1,
        }
    }

    fn from_index(index: usize) -> Self {
        match index {
            1 => ToneMapOperator::Reinhard,
            _ => ToneMapOperator::Clamp,
        }
    }
}

/// Maps `input` into `output` with an exposure scale
pub struct ToneMappingStage {
    input_channel: String,
    output_channel: String,
    operator: ToneMapOperator,
    exposure: f32,
    launch: Option<FullscreenLaunch>,
}

impl ToneMappingStage {
    pub fn new(input: &str, output: &str) -> Self {
        Self {
            input_channel: input.to_string(),
            output_channel: output.to_string(),
            operator: ToneMapOperator::Clamp,
            exposure: 1.0,
            launch: None,
        }
    }

    pub fn with_operator(mut self, operator: ToneMapOperator) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_exposure(mut self, exposure: f32) -> Self {
        self.exposure = exposure.max(0.0);
        self
    }

    // ===== GETTERS =====

    pub fn operator(&self) -> ToneMapOperator {
        self.operator
    }

    pub fn exposure(&self) -> f32 {
        self.exposure
    }

    pub fn input_channel(&self) -> &str {
        &self.input_channel
    }

    pub fn output_channel(&self) -> &str {
        &self.output_channel
    }

    // ===== SETTERS =====

    pub fn set_operator(&mut self, operator: ToneMapOperator) {
        self.operator = operator;
    }

    pub fn set_exposure(&mut self, exposure: f32) {
        self.exposure = exposure.max(0.0);
    }
}

impl RenderStage for ToneMappingStage {
    fn name(&self) -> &str {
        "Tone Mapping"
    }

    fn initialize(&mut self, ctx: &mut ConfigureContext<'_>) -> Result<()> {
        ctx.request_channel(&self.input_channel)?;
        ctx.request_channel(&self.output_channel)?;
        if let Some(old) = self.launch.take() {
            old.release(ctx.device());
        }
        self.launch = Some(FullscreenLaunch::new(ctx, shaders::TONE_MAPPING_SOURCE)?);
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        let (Some(input), Some(output), Some(launch)) = (
            ctx.channel(&self.input_channel),
            ctx.channel(&self.output_channel),
            self.launch.as_ref(),
        ) else {
            return Ok(());
        };
        let device = ctx.device();
        let Some(info) = device.texture_info(output) else {
            return Ok(());
        };
        launch.bind_texture(device, shaders::TONE_INPUT_SLOT, input)?;
        launch.set_constant(device, shaders::TONE_OPERATOR_SLOT, self.operator.id())?;
        launch.set_constant(device, shaders::TONE_EXPOSURE_SLOT, self.exposure)?;
        launch.set_target(device, output)?;
        launch.execute(device, UVec2::new(info.width, info.height))
    }

    fn render_gui(&mut self, ui: &mut dyn DiagnosticUi) -> bool {
        let options: Vec<String> = ToneMapOperator::NAMES.iter().map(|s| s.to_string()).collect();
        let mut selected = self.operator.index();
        let mut changed = ui.dropdown("Operator", &options, &mut selected);
        self.operator = ToneMapOperator::from_index(selected);
        changed |= ui.float_var("Exposure", &mut self.exposure, 0.0, 16.0);
        changed
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
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
#[path = "tone_mapping_tests.rs"]
mod tests;
