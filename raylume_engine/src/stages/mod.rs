/// Built-in render stages

pub mod temporal_accumulation;
pub mod copy_to_output;
pub mod tone_mapping;
pub mod ray_traced_gbuffer;
pub mod ambient_occlusion;
pub mod diffuse_gi;
pub mod lambertian_shadows;
pub mod light_probe_gbuffer;

#[cfg(test)]
pub(crate) mod test_support;

pub use temporal_accumulation::TemporalAccumulationStage;
pub use copy_to_output::CopyToOutputStage;
pub use tone_mapping::{ToneMapOperator, ToneMappingStage};
pub use ray_traced_gbuffer::{
    RayTracedGBufferStage, EMISSIVE, MATERIAL_DIFFUSE, MATERIAL_EXTRA_PARAMS, MATERIAL_SPEC_ROUGH,
    WORLD_NORMAL, WORLD_POSITION,
};
pub use ambient_occlusion::AmbientOcclusionStage;
pub use diffuse_gi::{DiffuseGiStage, DEFAULT_ENV_MAP_MISS_INDEX};
pub use lambertian_shadows::LambertianShadowsStage;
pub use light_probe_gbuffer::LightProbeGBufferStage;
