//! Program sources, entry points and binding names used by the built-in stages
//!
//! Backends resolve programs by their source reference, so these strings are
//! the contract between a stage and whatever compiles its programs.

// ===== FULLSCREEN PROGRAMS =====

/// Running-average combine
pub const ACCUMULATION_SOURCE: &str = "raylume/accumulation.ps";
/// HDR to displayable mapping
pub const TONE_MAPPING_SOURCE: &str = "raylume/tone_mapping.ps";

// ===== RAY TRACING PROGRAMS =====

pub const GBUFFER_SOURCE: &str = "raylume/ray_traced_gbuffer.rt";
pub const GBUFFER_RAY_GEN: &str = "GBufferRayGen";
pub const GBUFFER_PRIMARY_MISS: &str = "PrimaryMiss";
pub const GBUFFER_PRIMARY_CLOSEST_HIT: &str = "PrimaryClosestHit";
pub const GBUFFER_PRIMARY_ANY_HIT: &str = "PrimaryAnyHit";

pub const AO_SOURCE: &str = "raylume/ambient_occlusion.rt";
pub const AO_RAY_GEN: &str = "AoRayGen";
pub const AO_MISS: &str = "AoMiss";
pub const AO_ANY_HIT: &str = "AoAnyHit";

pub const DIFFUSE_GI_SOURCE: &str = "raylume/diffuse_gi.rt";
pub const DIFFUSE_GI_RAY_GEN: &str = "DiffuseGIRayGen";
pub const SHADOW_MISS: &str = "ShadowMiss";
pub const SHADOW_CLOSEST_HIT: &str = "ShadowClosestHit";
pub const SHADOW_ANY_HIT: &str = "ShadowAnyHit";
pub const GI_MISS: &str = "GIMiss";
pub const GI_CLOSEST_HIT: &str = "GIClosestHit";
pub const GI_ANY_HIT: &str = "GIAnyHit";

pub const LAMBERTIAN_SHADOWS_SOURCE: &str = "raylume/lambertian_shadows.rt";
pub const LAMBERTIAN_SHADOWS_RAY_GEN: &str = "LambertAndShadowsRayGen";

pub const LIGHT_PROBE_GBUFFER_SOURCE: &str = "raylume/light_probe_gbuffer.rt";
pub const LIGHT_PROBE_RAY_GEN: &str = "EnvLightProbeRayGen";
pub const LIGHT_PROBE_MISS: &str = "EnvLightProbeMiss";
pub const LIGHT_PROBE_CLOSEST_HIT: &str = "EnvLightProbeClosestHit";
pub const LIGHT_PROBE_ANY_HIT: &str = "EnvLightProbeAnyHit";

// ===== BINDING NAMES =====

/// Render target written by fullscreen programs
pub const TARGET_SLOT: &str = "gTarget";

pub const LAST_FRAME_SLOT: &str = "gLastFrame";
pub const CURRENT_FRAME_SLOT: &str = "gCurFrame";
pub const ACCUM_COUNT_SLOT: &str = "gAccumCount";

pub const TONE_INPUT_SLOT: &str = "gInput";
pub const TONE_OPERATOR_SLOT: &str = "gOperator";
pub const TONE_EXPOSURE_SLOT: &str = "gExposure";

pub const FRAME_COUNT_SLOT: &str = "gFrameCount";
pub const MIN_T_SLOT: &str = "gMinT";
pub const MAX_T_SLOT: &str = "gMaxT";
pub const OUTPUT_SLOT: &str = "gOutput";
pub const POSITION_SLOT: &str = "gWsPos";
pub const NORMAL_SLOT: &str = "gWsNorm";
pub const DIFFUSE_SLOT: &str = "gMatDif";
pub const SPEC_ROUGH_SLOT: &str = "gMatSpec";
pub const EXTRA_PARAMS_SLOT: &str = "gMatExtra";
pub const EMISSIVE_SLOT: &str = "gMatEmissive";
pub const ENV_MAP_SLOT: &str = "gEnvMap";

pub const AO_RADIUS_SLOT: &str = "gAoRadius";
pub const AO_NUM_RAYS_SLOT: &str = "gNumRays";

pub const DO_SHADOWS_SLOT: &str = "gDoDirectShadows";
pub const DO_GI_SLOT: &str = "gDoGI";
pub const DO_COS_SAMPLING_SLOT: &str = "gDoCosSampling";
pub const RECURSION_DEPTH_SLOT: &str = "gRecursionDepth";

pub const BACKGROUND_SLOT: &str = "gBgColor";
pub const JITTER_SLOT: &str = "gPixelJitter";
pub const LENS_RADIUS_SLOT: &str = "gLensRadius";
pub const FOCAL_DISTANCE_SLOT: &str = "gFocalDistance";
pub const LENS_SAMPLE_SLOT: &str = "gLensSample";
