/// Unit tests for FullscreenLaunch.

use glam::{UVec2, Vec4};
use crate::config::PipelineConfig;
use crate::device::{BindingSlot, GraphicsDevice, ShaderValue, SoftwareDevice};
use crate::launch::FullscreenLaunch;
use crate::registry::ResourceRegistry;
use crate::shaders;
use crate::stage::ConfigureContext;

#[test]
fn test_new_compiles_fullscreen_program() {
    let mut device = SoftwareDevice::new();
    let mut registry = ResourceRegistry::new(2, 2);
    let config = PipelineConfig::default();
    let mut ctx = ConfigureContext::new(&mut registry, &mut device, &config);

    let launch = FullscreenLaunch::new(&mut ctx, shaders::TONE_MAPPING_SOURCE).unwrap();

    assert_eq!(launch.source(), shaders::TONE_MAPPING_SOURCE);
    assert_eq!(device.programs_from(shaders::TONE_MAPPING_SOURCE), vec![launch.program()]);
}

#[test]
fn test_new_with_unknown_source_is_compile_error() {
    let mut device = SoftwareDevice::new();
    let mut registry = ResourceRegistry::new(2, 2);
    let config = PipelineConfig::default();
    let mut ctx = ConfigureContext::new(&mut registry, &mut device, &config);

    let err = FullscreenLaunch::new(&mut ctx, "raylume/missing.ps").unwrap_err();
    assert!(err.is_compile());
}

#[test]
fn test_bindings_land_in_global_scope_and_execute_writes_target() {
    let mut device = SoftwareDevice::new();
    let mut registry = ResourceRegistry::new(2, 2);
    let config = PipelineConfig::default();
    let launch = {
        let mut ctx = ConfigureContext::new(&mut registry, &mut device, &config);
        FullscreenLaunch::new(&mut ctx, shaders::TONE_MAPPING_SOURCE).unwrap()
    };
    let input = device.create_texture(&crate::device::TextureDesc {
        name: "in".to_string(),
        width: 2,
        height: 2,
        format: config.default_channel_format,
        usage: Default::default(),
    }).unwrap();
    let output = device.create_texture(&crate::device::TextureDesc {
        name: "out".to_string(),
        width: 2,
        height: 2,
        format: config.default_channel_format,
        usage: Default::default(),
    }).unwrap();
    device.clear_texture(input, Vec4::new(2.0, 0.5, -1.0, 1.0)).unwrap();

    launch.bind_texture(&mut device, shaders::TONE_INPUT_SLOT, input).unwrap();
    launch.set_constant(&mut device, shaders::TONE_EXPOSURE_SLOT, 1.0f32).unwrap();
    launch.set_target(&mut device, output).unwrap();
    launch.execute(&mut device, UVec2::new(2, 2)).unwrap();

    assert_eq!(
        device.bound_constant(launch.program(), &BindingSlot::global(shaders::TONE_EXPOSURE_SLOT)),
        Some(ShaderValue::Float(1.0))
    );
    assert_eq!(device.texel(output, 1, 1), Some(Vec4::new(1.0, 0.5, 0.0, 1.0)));
}

#[test]
fn test_release_destroys_program() {
    let mut device = SoftwareDevice::new();
    let mut registry = ResourceRegistry::new(2, 2);
    let config = PipelineConfig::default();
    let launch = {
        let mut ctx = ConfigureContext::new(&mut registry, &mut device, &config);
        FullscreenLaunch::new(&mut ctx, shaders::ACCUMULATION_SOURCE).unwrap()
    };
    assert_eq!(device.program_count(), 1);

    launch.release(&mut device);
    assert_eq!(device.program_count(), 0);
}
