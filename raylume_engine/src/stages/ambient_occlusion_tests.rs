/// Unit tests for AmbientOcclusionStage.

use glam::Vec4;
use crate::device::{BindingSlot, ProgramScope, ShaderValue, SoftwareDevice};
use crate::registry::OUTPUT_CHANNEL;
use crate::scene::BasicScene;
use crate::shaders;
use crate::stage::{RenderStage, UiEdit, UiRecorder};
use crate::stages::test_support::StageHarness;
use crate::stages::{AmbientOcclusionStage, WORLD_NORMAL};

/// Writes the normal's z as occlusion, only where it is positive
fn ao_device() -> SoftwareDevice {
    let mut device = SoftwareDevice::new();
    device.register_kernel(shaders::AO_SOURCE, |ctx| {
        let normal = ctx.load(ProgramScope::RayGen, shaders::NORMAL_SLOT)?;
        if normal.z > 0.0 {
            ctx.store(ProgramScope::RayGen, shaders::OUTPUT_SLOT, Vec4::splat(normal.z))?;
        }
        Ok(())
    });
    device
}

fn ready(scene: &BasicScene) -> (StageHarness, AmbientOcclusionStage) {
    let mut harness = StageHarness::with_device(2, 2, ao_device());
    let mut stage = AmbientOcclusionStage::new();
    harness.initialize(&mut stage);
    stage.on_scene_loaded(&mut harness.configure(), scene).unwrap();
    (harness, stage)
}

#[test]
fn test_radius_follows_scene_size() {
    let (_, stage) = ready(&BasicScene::new("big").with_bounding_radius(100.0));
    assert_eq!(stage.ao_radius(), 5.0);

    let (_, stage) = ready(&BasicScene::new("tiny").with_bounding_radius(0.5));
    assert_eq!(stage.ao_radius(), 0.1);
}

#[test]
fn test_program_has_one_miss_and_one_any_hit_group() {
    let (_, stage) = ready(&BasicScene::new("room"));
    assert_eq!(stage.launch().miss_count(), 1);
    assert_eq!(stage.launch().hit_group_count(), 1);
}

#[test]
fn test_output_is_cleared_before_tracing() {
    let scene = BasicScene::new("room");
    let (mut harness, mut stage) = ready(&scene);
    harness.fill(OUTPUT_CHANNEL, Vec4::ONE);
    harness.fill(WORLD_NORMAL, Vec4::new(0.0, 0.0, -1.0, 0.0));

    stage.execute(&mut harness.frame_with(&scene, 0)).unwrap();
    assert_eq!(harness.read(OUTPUT_CHANNEL), Vec4::ZERO);

    harness.fill(WORLD_NORMAL, Vec4::new(0.0, 0.0, 0.5, 0.0));
    stage.execute(&mut harness.frame_with(&scene, 1)).unwrap();
    assert_eq!(harness.read(OUTPUT_CHANNEL), Vec4::splat(0.5));
}

#[test]
fn test_execute_binds_constants_in_ray_gen_scope() {
    let scene = BasicScene::new("room").with_bounding_radius(40.0);
    let (mut harness, mut stage) = ready(&scene);
    stage.execute(&mut harness.frame_with(&scene, 0)).unwrap();
    stage.execute(&mut harness.frame_with(&scene, 1)).unwrap();

    let program = stage.launch().program().unwrap();
    let constant = |name: &str| harness.device.bound_constant(program, &BindingSlot::ray_gen(name));
    assert_eq!(constant(shaders::AO_RADIUS_SLOT), Some(ShaderValue::Float(2.0)));
    assert_eq!(constant(shaders::AO_NUM_RAYS_SLOT), Some(ShaderValue::Int(1)));
    assert_eq!(constant(shaders::FRAME_COUNT_SLOT), Some(ShaderValue::UInt(1)));
}

#[test]
fn test_without_scene_output_is_untouched() {
    let mut harness = StageHarness::with_device(2, 2, ao_device());
    let mut stage = AmbientOcclusionStage::new();
    harness.initialize(&mut stage);
    harness.fill(OUTPUT_CHANNEL, Vec4::ONE);

    stage.execute(&mut harness.frame(0)).unwrap();
    assert_eq!(harness.read(OUTPUT_CHANNEL), Vec4::ONE);
}

#[test]
fn test_gui_edits_are_clamped() {
    let mut stage = AmbientOcclusionStage::new();
    let mut ui = UiRecorder::new();
    ui.queue_edit("AO rays per pixel", UiEdit::Int(1000));

    assert!(stage.render_gui(&mut ui));
    assert_eq!(stage.rays_per_pixel(), 64);
}
