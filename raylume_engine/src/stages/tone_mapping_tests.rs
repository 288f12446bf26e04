/// Unit tests for ToneMappingStage.

use glam::Vec4;
use crate::registry::OUTPUT_CHANNEL;
use crate::shaders;
use crate::stage::{RenderStage, UiEdit, UiRecorder};
use crate::stages::test_support::StageHarness;
use crate::stages::{ToneMapOperator, ToneMappingStage};

fn setup(stage: &mut ToneMappingStage) -> StageHarness {
    let mut harness = StageHarness::new(2, 2);
    harness.initialize(stage);
    harness
}

#[test]
fn test_initialize_declares_both_channels() {
    let mut stage = ToneMappingStage::new("HDROutput", OUTPUT_CHANNEL);
    let harness = setup(&mut stage);

    assert_eq!(harness.registry.channel_names(), vec!["HDROutput", OUTPUT_CHANNEL]);
    assert_eq!(harness.device.programs_from(shaders::TONE_MAPPING_SOURCE).len(), 1);
}

#[test]
fn test_clamp_operator_is_default() {
    let mut stage = ToneMappingStage::new("HDROutput", OUTPUT_CHANNEL);
    let mut harness = setup(&mut stage);
    harness.fill("HDROutput", Vec4::new(3.0, 0.25, -2.0, 1.0));

    stage.execute(&mut harness.frame(0)).unwrap();

    assert_eq!(stage.operator(), ToneMapOperator::Clamp);
    assert_eq!(harness.read(OUTPUT_CHANNEL), Vec4::new(1.0, 0.25, 0.0, 1.0));
    assert_eq!(harness.read("HDROutput"), Vec4::new(3.0, 0.25, -2.0, 1.0));
}

#[test]
fn test_reinhard_with_exposure() {
    let mut stage = ToneMappingStage::new("HDROutput", OUTPUT_CHANNEL)
        .with_operator(ToneMapOperator::Reinhard)
        .with_exposure(2.0);
    let mut harness = setup(&mut stage);
    harness.fill("HDROutput", Vec4::new(0.5, 1.5, 0.0, 1.0));

    stage.execute(&mut harness.frame(0)).unwrap();

    assert_eq!(harness.read(OUTPUT_CHANNEL), Vec4::new(0.5, 0.75, 0.0, 1.0));
}

#[test]
fn test_negative_exposure_is_clamped() {
    let mut stage = ToneMappingStage::new("A", "B");
    stage.set_exposure(-1.0);
    assert_eq!(stage.exposure(), 0.0);
}

#[test]
fn test_gui_switches_operator() {
    let mut stage = ToneMappingStage::new("A", "B");
    let mut ui = UiRecorder::new();
    ui.queue_edit("Operator", UiEdit::Select(1));

    assert!(stage.render_gui(&mut ui));
    assert_eq!(stage.operator(), ToneMapOperator::Reinhard);
}
