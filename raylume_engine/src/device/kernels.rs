/// Built-in CPU kernels for the fullscreen programs shipped with the engine.
///
/// Ray tracing programs have no built-in kernel: hosts running on the
/// software device register their own (see `SoftwareDevice::register_kernel`).

use glam::{Vec3, Vec4};
use crate::error::Result;
use crate::shaders;
use super::software_device::{KernelContext, SoftwareDevice};

/// Tone mapping operator ids passed through `gOperator`
pub const TONE_OPERATOR_CLAMP: u32 = 0;
pub const TONE_OPERATOR_REINHARD: u32 = 1;

pub(crate) fn register_builtin(device: &mut SoftwareDevice) {
    device.register_kernel(shaders::ACCUMULATION_SOURCE, accumulate);
    device.register_kernel(shaders::TONE_MAPPING_SOURCE, tone_map);
}

/// Weighted running average of the previous result and the current frame.
///
/// With `n` frames already accumulated: `(last * n + current) / (n + 1)`.
/// `n == 0` returns the current frame exactly, whatever the previous buffer holds.
pub fn accumulate(ctx: &mut KernelContext<'_>) -> Result<()> {
    let current = ctx.load_global(shaders::CURRENT_FRAME_SLOT)?;
    let count = ctx
        .constant_global(shaders::ACCUM_COUNT_SLOT)
        .and_then(|v| v.as_u32())
        .unwrap_or(0);

    let result = if count == 0 {
        current
    } else {
        let last = ctx.load_global(shaders::LAST_FRAME_SLOT)?;
        let n = count as f32;
        (last * n + current) / (n + 1.0)
    };
    ctx.store_global(shaders::TARGET_SLOT, result)
}

/// Exposure-scaled tone mapping; alpha passes through
pub fn tone_map(ctx: &mut KernelContext<'_>) -> Result<()> {
    let input = ctx.load_global(shaders::TONE_INPUT_SLOT)?;
    let exposure = ctx
        .constant_global(shaders::TONE_EXPOSURE_SLOT)
        .and_then(|v| v.as_f32())
        .unwrap_or(1.0);
    let operator = ctx
        .constant_global(shaders::TONE_OPERATOR_SLOT)
        .and_then(|v| v.as_u32())
        .unwrap_or(TONE_OPERATOR_CLAMP);

    let color = input.truncate() * exposure;
    let mapped = match operator {
        TONE_OPERATOR_REINHARD => {
            let color = color.max(Vec3::ZERO);
            color / (Vec3::ONE + color)
        }
        _ => color.clamp(Vec3::ZERO, Vec3::ONE),
    };
    ctx.store_global(shaders::TARGET_SLOT, Vec4::new(mapped.x, mapped.y, mapped.z, input.w))
}

#[cfg(test)]
#[path = "kernels_tests.rs"]
mod tests;
