/// Unit tests for LambertianShadowsStage.

use glam::Vec4;
use crate::device::{BindingSlot, ProgramScope, ShaderValue, SoftwareDevice};
use crate::registry::OUTPUT_CHANNEL;
use crate::scene::BasicScene;
use crate::shaders;
use crate::stage::RenderStage;
use crate::stages::test_support::StageHarness;
use crate::stages::{LambertianShadowsStage, MATERIAL_DIFFUSE, WORLD_NORMAL};

/// Shades with diffuse * N.z, as if lit straight from +Z
fn lambert_device() -> SoftwareDevice {
    let mut device = SoftwareDevice::new();
    device.register_kernel(shaders::LAMBERTIAN_SHADOWS_SOURCE, |ctx| {
        let normal = ctx.load(ProgramScope::RayGen, shaders::NORMAL_SLOT)?;
        let diffuse = ctx.load(ProgramScope::RayGen, shaders::DIFFUSE_SLOT)?;
        ctx.store(ProgramScope::RayGen, shaders::OUTPUT_SLOT, diffuse * normal.z.max(0.0))
    });
    device
}

fn ready(mut stage: LambertianShadowsStage, scene: &BasicScene) -> (StageHarness, LambertianShadowsStage) {
    let mut harness = StageHarness::with_device(2, 2, lambert_device());
    harness.initialize(&mut stage);
    stage.on_scene_loaded(&mut harness.configure(), scene).unwrap();
    (harness, stage)
}

#[test]
fn test_one_shadow_ray_type() {
    let (harness, stage) = ready(LambertianShadowsStage::new(), &BasicScene::new("room"));
    assert_eq!(stage.launch().miss_count(), 1);
    assert_eq!(stage.launch().hit_group_count(), 1);
    for name in ["WorldPosition", "WorldNormal", "MaterialDiffuse", OUTPUT_CHANNEL] {
        assert!(harness.registry.contains(name), "{} not declared", name);
    }
}

#[test]
fn test_shades_from_gbuffer_channels() {
    let scene = BasicScene::new("room");
    let (mut harness, mut stage) = ready(LambertianShadowsStage::new(), &scene);
    harness.fill(WORLD_NORMAL, Vec4::new(0.0, 0.0, 0.5, 0.0));
    harness.fill(MATERIAL_DIFFUSE, Vec4::new(1.0, 0.5, 0.0, 1.0));

    stage.execute(&mut harness.frame_with(&scene, 0)).unwrap();

    assert_eq!(harness.read(OUTPUT_CHANNEL), Vec4::new(0.5, 0.25, 0.0, 0.5));
    let program = stage.launch().program().unwrap();
    assert_eq!(
        harness.device.bound_constant(program, &BindingSlot::ray_gen(shaders::MIN_T_SLOT)),
        Some(ShaderValue::Float(harness.config.min_t_distance))
    );
}

#[test]
fn test_output_cleared_even_without_ray_tracing() {
    let scene = BasicScene::new("raster").with_ray_tracing(false);
    let (mut harness, mut stage) = ready(LambertianShadowsStage::with_output("Lit"), &scene);
    harness.fill("Lit", Vec4::ONE);

    stage.execute(&mut harness.frame_with(&scene, 0)).unwrap();

    assert!(!stage.launch().ready_to_render());
    assert_eq!(harness.read("Lit"), Vec4::ZERO);
    assert!(!harness.registry.contains(OUTPUT_CHANNEL));
}

#[test]
fn test_release_destroys_program() {
    let (mut harness, mut stage) = ready(LambertianShadowsStage::new(), &BasicScene::new("room"));
    stage.release(&mut harness.device);
    assert_eq!(harness.device.program_count(), 0);
}
