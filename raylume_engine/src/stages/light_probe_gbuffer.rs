/// LightProbeGBufferStage - G-buffer whose background is an environment map
///
/// Binds the scene like `RayTracedGBufferStage`, but writes only
/// WorldPosition, WorldNormal and MaterialDiffuse. Primary rays that miss
/// sample `EnvironmentMap` (bound to miss 0) into MaterialDiffuse.
///
/// The environment map texels are handed over at construction and uploaded
/// during `initialize`; without them the stage joins whatever map the
/// registry holds (a black 1x1 placeholder by default).

use std::any::Any;
use glam::Vec4;
use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::launch::RayLaunch;
use crate::registry::ENVIRONMENT_MAP;
use crate::scene::Scene;
use crate::shaders;
use crate::stage::{ConfigureContext, FrameContext, RenderStage};
use crate::engine_debug;
use super::ray_traced_gbuffer::{MATERIAL_DIFFUSE, WORLD_NORMAL, WORLD_POSITION};

const SOURCE: &str = "raylume::LightProbeGBuffer";

struct EnvironmentTexels {
    width: u32,
    height: u32,
    texels: Vec<Vec4>,
}

/// G-buffer with an environment-mapped background
pub struct LightProbeGBufferStage {
    environment: Option<EnvironmentTexels>,
    launch: RayLaunch,
}

impl LightProbeGBufferStage {
    /// Use the registry's current environment map
    pub fn new() -> Self {
        Self {
            environment: None,
            launch: RayLaunch::new(shaders::LIGHT_PROBE_GBUFFER_SOURCE, shaders::LIGHT_PROBE_RAY_GEN),
        }
    }

    /// Upload `width` x `height` row-major texels as the environment map
    pub fn with_environment_map(mut self, width: u32, height: u32, texels: Vec<Vec4>) -> Self {
        self.environment = Some(EnvironmentTexels { width, height, texels });
        self
    }

    pub fn launch(&self) -> &RayLaunch {
        &self.launch
    }
}

impl Default for LightProbeGBufferStage {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderStage for LightProbeGBufferStage {
    fn name(&self) -> &str {
        "Light Probe G-Buffer"
    }

    fn requires_scene(&self) -> bool {
        true
    }

    fn requires_compute_backend(&self) -> bool {
        true
    }

    fn binds_scene(&self) -> bool {
        true
    }

    fn initialize(&mut self, ctx: &mut ConfigureContext<'_>) -> Result<()> {
        ctx.request_channels(&[WORLD_POSITION, WORLD_NORMAL, MATERIAL_DIFFUSE])?;
        match &self.environment {
            Some(env) => {
                ctx.update_environment_map(env.width, env.height, &env.texels)?;
            }
            None => {
                ctx.environment_map()?;
                engine_debug!(SOURCE, "No environment map given, using the registry's");
            }
        }

        self.launch.release(ctx.device());
        self.launch = RayLaunch::new(shaders::LIGHT_PROBE_GBUFFER_SOURCE, shaders::LIGHT_PROBE_RAY_GEN);
        self.launch.add_miss_shader(shaders::LIGHT_PROBE_MISS);
        self.launch.add_hit_shader(Some(shaders::LIGHT_PROBE_CLOSEST_HIT), Some(shaders::LIGHT_PROBE_ANY_HIT));
        self.launch.compile(ctx)
    }

    fn on_scene_loaded(&mut self, ctx: &mut ConfigureContext<'_>, scene: &dyn Scene) -> Result<()> {
        self.launch.set_scene(ctx.device(), scene)?;
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        if !self.launch.ready_to_render() {
            return Ok(());
        }
        let (Some(position), Some(normal), Some(diffuse), Some(env_map)) = (
            ctx.channel(WORLD_POSITION),
            ctx.channel(WORLD_NORMAL),
            ctx.channel(MATERIAL_DIFFUSE),
            ctx.channel(ENVIRONMENT_MAP),
        ) else {
            return Ok(());
        };
        let extent = ctx.output_size();

        let device = ctx.device();
        self.launch.ray_gen_texture(device, shaders::POSITION_SLOT, position)?;
        self.launch.ray_gen_texture(device, shaders::NORMAL_SLOT, normal)?;
        self.launch.hit_texture(device, 0, shaders::DIFFUSE_SLOT, diffuse)?;
        self.launch.miss_texture(device, 0, shaders::ENV_MAP_SLOT, env_map)?;
        self.launch.miss_texture(device, 0, shaders::DIFFUSE_SLOT, diffuse)?;
        self.launch.execute(device, extent)
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.launch.release(device);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "light_probe_gbuffer_tests.rs"]
mod tests;
