/// Unit tests for ResourceRegistry.

use glam::{UVec2, Vec4};
use crate::device::{DeviceEvent, GraphicsDevice, SoftwareDevice, TextureFormat, TextureUsage};
use crate::registry::{ChannelDesc, ChannelSize, ResourceRegistry, ENVIRONMENT_MAP, OUTPUT_CHANNEL};

fn setup() -> (ResourceRegistry, SoftwareDevice) {
    (ResourceRegistry::new(8, 4), SoftwareDevice::new())
}

// ============================================================================
// Tests: request_channel
// ============================================================================

#[test]
fn test_request_allocates_screen_sized_channel() {
    let (mut registry, mut device) = setup();
    registry.request_channel(&mut device, "WorldPosition", ChannelDesc::default()).unwrap();

    let texture = registry.channel("WorldPosition").unwrap();
    let info = device.texture_info(texture).unwrap();
    assert_eq!((info.width, info.height), (8, 4));
    assert_eq!(info.format, TextureFormat::R32G32B32A32_SFLOAT);
}

#[test]
fn test_request_is_idempotent_for_compatible_format() {
    let (mut registry, mut device) = setup();
    let first = registry.request_channel(&mut device, "X", ChannelDesc::default()).unwrap();
    let texture = registry.channel("X").unwrap();

    let second = registry.request_channel(&mut device, "X", ChannelDesc::default()).unwrap();

    assert_eq!(first, second);
    assert_eq!(registry.channel("X"), Some(texture));
    assert_eq!(registry.channel_count(), 1);
    assert_eq!(device.texture_count(), 1);
}

#[test]
fn test_request_incompatible_format_is_configuration_error() {
    let (mut registry, mut device) = setup();
    registry.request_channel(&mut device, "X", ChannelDesc::default()).unwrap();

    let err = registry
        .request_channel(&mut device, "X", ChannelDesc::new(TextureFormat::R8G8B8A8_UNORM))
        .unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(device.texture_count(), 1);
}

#[test]
fn test_request_incompatible_size_policy_is_configuration_error() {
    let (mut registry, mut device) = setup();
    registry.request_channel(&mut device, "X", ChannelDesc::default()).unwrap();
    let fixed = ChannelDesc::fixed(TextureFormat::R32G32B32A32_SFLOAT, 16, 16);
    assert!(registry.request_channel(&mut device, "X", fixed).unwrap_err().is_configuration());
}

#[test]
fn test_request_merges_usage_flags() {
    let (mut registry, mut device) = setup();
    let narrow = ChannelDesc::default().with_usage(TextureUsage::SHADER_RESOURCE);
    let handle = registry.request_channel(&mut device, "X", narrow).unwrap();

    let wide = ChannelDesc::default().with_usage(TextureUsage::UNORDERED_ACCESS);
    let again = registry.request_channel(&mut device, "X", wide).unwrap();

    assert_eq!(handle, again);
    let usage = registry.descriptor("X").unwrap().usage;
    assert!(usage.contains(TextureUsage::SHADER_RESOURCE | TextureUsage::UNORDERED_ACCESS));
    assert_eq!(device.texture_count(), 1);
    let texture = registry.channel("X").unwrap();
    assert_eq!(device.texture_info(texture).unwrap().usage, usage);
}

// ============================================================================
// Tests: channel / cleared_channel
// ============================================================================

#[test]
fn test_channel_before_request_is_absent_and_does_not_allocate() {
    let (registry, device) = setup();
    assert!(registry.channel("Never").is_none());
    assert!(registry.handle("Never").is_none());
    assert_eq!(registry.channel_count(), 0);
    assert_eq!(device.texture_count(), 0);
}

#[test]
fn test_cleared_channel_clears_contents() {
    let (mut registry, mut device) = setup();
    registry.request_channel(&mut device, OUTPUT_CHANNEL, ChannelDesc::default()).unwrap();
    let texture = registry.channel(OUTPUT_CHANNEL).unwrap();
    device.clear_texture(texture, Vec4::splat(9.0)).unwrap();

    let cleared = registry
        .cleared_channel(&mut device, OUTPUT_CHANNEL, Vec4::new(0.0, 0.0, 0.0, 1.0))
        .unwrap();

    assert_eq!(cleared, Some(texture));
    assert!(device.texels(texture).unwrap().iter().all(|t| *t == Vec4::new(0.0, 0.0, 0.0, 1.0)));
}

#[test]
fn test_cleared_channel_missing_is_none() {
    let (registry, mut device) = setup();
    assert_eq!(registry.cleared_channel(&mut device, "Missing", Vec4::ZERO).unwrap(), None);
    assert!(device.events().is_empty());
}

// ============================================================================
// Tests: resize_all
// ============================================================================

#[test]
fn test_resize_all_resizes_screen_channels_only() {
    let (mut registry, mut device) = setup();
    registry.request_channel(&mut device, "Screen", ChannelDesc::default()).unwrap();
    registry
        .request_channel(&mut device, "Lut", ChannelDesc::fixed(TextureFormat::R32_SFLOAT, 16, 1))
        .unwrap();
    let screen = registry.channel("Screen").unwrap();

    registry.resize_all(&mut device, 32, 16).unwrap();

    assert_eq!(registry.output_size(), UVec2::new(32, 16));
    assert_eq!(registry.channel("Screen"), Some(screen), "resized in place");
    let info = device.texture_info(screen).unwrap();
    assert_eq!((info.width, info.height), (32, 16));
    let lut = device.texture_info(registry.channel("Lut").unwrap()).unwrap();
    assert_eq!((lut.width, lut.height), (16, 1));
}

#[test]
fn test_channels_requested_after_resize_use_new_size() {
    let (mut registry, mut device) = setup();
    registry.resize_all(&mut device, 3, 3).unwrap();
    registry.request_channel(&mut device, "Late", ChannelDesc::default()).unwrap();
    let info = device.texture_info(registry.channel("Late").unwrap()).unwrap();
    assert_eq!((info.width, info.height), (3, 3));
}

// ============================================================================
// Tests: Environment map
// ============================================================================

#[test]
fn test_environment_map_placeholder_is_one_black_texel() {
    let (mut registry, mut device) = setup();
    let first = registry.request_environment_map(&mut device).unwrap();
    let second = registry.request_environment_map(&mut device).unwrap();

    assert_eq!(first, second);
    let texture = registry.channel(ENVIRONMENT_MAP).unwrap();
    assert_eq!(device.texels(texture).unwrap(), &[Vec4::ZERO]);
    assert_eq!(registry.descriptor(ENVIRONMENT_MAP).unwrap().size, ChannelSize::Fixed { width: 1, height: 1 });
}

#[test]
fn test_environment_map_survives_resize() {
    let (mut registry, mut device) = setup();
    registry.request_channel(&mut device, "Screen", ChannelDesc::default()).unwrap();
    registry
        .update_environment_map(&mut device, 2, 1, &[Vec4::splat(5.0), Vec4::splat(6.0)])
        .unwrap();

    registry.resize_all(&mut device, 16, 8).unwrap();

    let texture = registry.channel(ENVIRONMENT_MAP).unwrap();
    let info = device.texture_info(texture).unwrap();
    assert_eq!((info.width, info.height), (2, 1));
    assert_eq!(device.texels(texture).unwrap(), &[Vec4::splat(5.0), Vec4::splat(6.0)]);
    let screen = device.texture_info(registry.channel("Screen").unwrap()).unwrap();
    assert_eq!((screen.width, screen.height), (16, 8));
}

#[test]
fn test_environment_map_update_keeps_handle_across_sizes() {
    let (mut registry, mut device) = setup();
    let handle = registry.request_environment_map(&mut device).unwrap();
    let placeholder = registry.channel(ENVIRONMENT_MAP).unwrap();

    let updated = registry
        .update_environment_map(&mut device, 2, 2, &[Vec4::ONE; 4])
        .unwrap();

    assert_eq!(updated, handle);
    assert_ne!(registry.channel(ENVIRONMENT_MAP), Some(placeholder));
    assert_eq!(registry.channel_count(), 1);
    assert_eq!(device.texture_count(), 1);
    let info = device.texture_info(registry.channel(ENVIRONMENT_MAP).unwrap()).unwrap();
    assert_eq!((info.width, info.height), (2, 2));
}

#[test]
fn test_environment_map_texel_count_mismatch_is_configuration_error() {
    let (mut registry, mut device) = setup();
    let err = registry
        .update_environment_map(&mut device, 2, 2, &[Vec4::ONE; 3])
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(!registry.contains(ENVIRONMENT_MAP));
}

// ============================================================================
// Tests: Enumeration and release
// ============================================================================

#[test]
fn test_enumeration_follows_declaration_order() {
    let (mut registry, mut device) = setup();
    for name in ["B", "A", OUTPUT_CHANNEL] {
        registry.request_channel(&mut device, name, ChannelDesc::default()).unwrap();
    }
    registry.request_channel(&mut device, "A", ChannelDesc::default()).unwrap();

    assert_eq!(registry.channel_names(), vec!["B", "A", OUTPUT_CHANNEL]);
    assert_eq!(registry.channel_index(OUTPUT_CHANNEL), Some(2));
    assert_eq!(registry.channel_name(1), Some("A"));
    assert_eq!(registry.channel_name(3), None);
    assert!(registry.contains("B"));
    assert_eq!(registry.descriptor("B").unwrap().size, ChannelSize::Screen);
}

#[test]
fn test_handle_resolves_texture() {
    let (mut registry, mut device) = setup();
    let handle = registry.request_channel(&mut device, "X", ChannelDesc::default()).unwrap();
    assert_eq!(registry.texture(handle), registry.channel("X"));
    assert_eq!(registry.handle("X"), Some(handle));
}

#[test]
fn test_release_destroys_textures() {
    let (mut registry, mut device) = setup();
    registry.request_channel(&mut device, "A", ChannelDesc::default()).unwrap();
    registry.request_channel(&mut device, "B", ChannelDesc::default()).unwrap();

    registry.release(&mut device);

    assert_eq!(registry.channel_count(), 0);
    assert!(registry.channel("A").is_none());
    assert_eq!(device.texture_count(), 0);
    let destroyed = device
        .events()
        .iter()
        .filter(|e| matches!(e, DeviceEvent::DestroyTexture { .. }))
        .count();
    assert_eq!(destroyed, 2);
}
