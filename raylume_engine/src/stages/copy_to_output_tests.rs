/// Unit tests for CopyToOutputStage.

use glam::Vec4;
use crate::registry::OUTPUT_CHANNEL;
use crate::stage::{RenderStage, UiEdit, UiRecorder, UiWidget};
use crate::stages::test_support::StageHarness;
use crate::stages::CopyToOutputStage;

fn declare(harness: &mut StageHarness, names: &[&str]) {
    harness.configure().request_channels(names).unwrap();
}

#[test]
fn test_pipeline_update_lists_channels_except_output() {
    let mut harness = StageHarness::new(2, 2);
    declare(&mut harness, &["WorldPosition", "WorldNormal"]);
    let mut stage = CopyToOutputStage::new();
    harness.initialize(&mut stage);

    stage.on_pipeline_updated(&harness.registry);

    assert_eq!(stage.channels(), &["WorldPosition".to_string(), "WorldNormal".to_string()]);
    assert_eq!(stage.selected_channel(), Some("WorldPosition"));
}

#[test]
fn test_preferred_channel_is_selected() {
    let mut harness = StageHarness::new(2, 2);
    declare(&mut harness, &["A", "B"]);
    let mut stage = CopyToOutputStage::displaying("B");
    harness.initialize(&mut stage);
    stage.on_pipeline_updated(&harness.registry);

    assert_eq!(stage.selected_channel(), Some("B"));
}

#[test]
fn test_execute_blits_selected_channel() {
    let mut harness = StageHarness::new(2, 2);
    declare(&mut harness, &["A", "B"]);
    let mut stage = CopyToOutputStage::new();
    harness.initialize(&mut stage);
    stage.on_pipeline_updated(&harness.registry);
    harness.fill("B", Vec4::new(0.2, 0.4, 0.6, 1.0));

    assert!(stage.select("B"));
    stage.execute(&mut harness.frame(0)).unwrap();

    assert_eq!(harness.read(OUTPUT_CHANNEL), Vec4::new(0.2, 0.4, 0.6, 1.0));
}

#[test]
fn test_no_selection_clears_output_to_opaque_black() {
    let mut harness = StageHarness::new(2, 2);
    let mut stage = CopyToOutputStage::new();
    harness.initialize(&mut stage);
    stage.on_pipeline_updated(&harness.registry);
    harness.fill(OUTPUT_CHANNEL, Vec4::ONE);

    stage.execute(&mut harness.frame(0)).unwrap();

    assert_eq!(stage.selected_channel(), None);
    assert_eq!(harness.read(OUTPUT_CHANNEL), Vec4::new(0.0, 0.0, 0.0, 1.0));
}

#[test]
fn test_select_unknown_channel_keeps_selection() {
    let mut harness = StageHarness::new(2, 2);
    declare(&mut harness, &["A"]);
    let mut stage = CopyToOutputStage::new();
    harness.initialize(&mut stage);
    stage.on_pipeline_updated(&harness.registry);

    assert!(!stage.select("Missing"));
    assert_eq!(stage.selected_channel(), Some("A"));
}

#[test]
fn test_gui_dropdown_changes_selection() {
    let mut harness = StageHarness::new(2, 2);
    declare(&mut harness, &["A", "B"]);
    let mut stage = CopyToOutputStage::new();
    harness.initialize(&mut stage);
    stage.on_pipeline_updated(&harness.registry);

    let mut ui = UiRecorder::new();
    ui.queue_edit("Displayed", UiEdit::Select(1));
    assert!(stage.render_gui(&mut ui));
    assert_eq!(stage.selected_channel(), Some("B"));
    assert!(matches!(ui.widgets()[0], UiWidget::Dropdown { selected: 1, .. }));
}
