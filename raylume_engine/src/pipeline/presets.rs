/// Ready-made stage lists for common pipelines
///
/// Each preset returns boxed stages in dependency order, to be appended
/// with `Pipeline::add_stages`.

use glam::Vec4;
use crate::registry::OUTPUT_CHANNEL;
use crate::stage::RenderStage;
use crate::stages::{
    AmbientOcclusionStage, CopyToOutputStage, DiffuseGiStage, LambertianShadowsStage,
    LightProbeGBufferStage, RayTracedGBufferStage, TemporalAccumulationStage, ToneMappingStage,
    MATERIAL_DIFFUSE,
};

/// HDR channel shared by the GI preset's stages
pub const HDR_OUTPUT: &str = "HDROutput";

/// G-buffer followed by ambient occlusion into `OutputChannel`
pub fn ambient_occlusion() -> Vec<Box<dyn RenderStage>> {
    vec![
        Box::new(RayTracedGBufferStage::new()),
        Box::new(AmbientOcclusionStage::new()),
    ]
}

/// Ambient occlusion accumulated over frames in place
pub fn temporal_accumulation() -> Vec<Box<dyn RenderStage>> {
    let mut stages = ambient_occlusion();
    stages.push(Box::new(TemporalAccumulationStage::new(OUTPUT_CHANNEL)));
    stages
}

/// Thin-lens G-buffer, Lambertian shading with shadows, accumulated in place
pub fn lambertian_shadows() -> Vec<Box<dyn RenderStage>> {
    vec![
        Box::new(RayTracedGBufferStage::new().with_thin_lens(true)),
        Box::new(LambertianShadowsStage::new()),
        Box::new(TemporalAccumulationStage::new(OUTPUT_CHANNEL)),
    ]
}

/// Environment-mapped G-buffer, displaying MaterialDiffuse
pub fn light_probe(width: u32, height: u32, texels: Vec<Vec4>) -> Vec<Box<dyn RenderStage>> {
    vec![
        Box::new(LightProbeGBufferStage::new().with_environment_map(width, height, texels)),
        Box::new(CopyToOutputStage::displaying(MATERIAL_DIFFUSE)),
    ]
}

/// Diffuse GI into an HDR channel, accumulated, then tone mapped for display
pub fn diffuse_gi() -> Vec<Box<dyn RenderStage>> {
    vec![
        Box::new(RayTracedGBufferStage::new()),
        Box::new(DiffuseGiStage::with_output(HDR_OUTPUT)),
        Box::new(TemporalAccumulationStage::new(HDR_OUTPUT)),
        Box::new(ToneMappingStage::new(HDR_OUTPUT, OUTPUT_CHANNEL)),
    ]
}
