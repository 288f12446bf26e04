/// Resource registry: the named channels shared by every stage of a pipeline.
///
/// Single-owner arena. Channels are addressed by name or by a stable
/// `ChannelHandle`; the backing textures belong to the execution backend and
/// are only ever allocated or resized through `&mut ResourceRegistry`, which
/// the pipeline hands out during lifecycle events and never during a frame.

use glam::{UVec2, Vec4};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::device::{GraphicsDevice, TextureDesc, TextureFormat, TextureId};
use crate::error::Result;
use crate::{config_bail, engine_debug, engine_info, engine_trace};
use super::channel::{ChannelDesc, ChannelSize};

const SOURCE: &str = "raylume::ResourceRegistry";

/// Channel presented to the host at the end of the pipeline
pub const OUTPUT_CHANNEL: &str = "OutputChannel";

/// Environment map sampled by rays that escape the scene
pub const ENVIRONMENT_MAP: &str = "EnvironmentMap";

/// Texel format of the environment map
pub const ENVIRONMENT_MAP_FORMAT: TextureFormat = TextureFormat::R32G32B32A32_SFLOAT;

new_key_type! {
    /// Stable key for a channel within a registry.
    ///
    /// Stays valid across resizes; invalid only after `release`.
    pub struct ChannelHandle;
}

struct Channel {
    name: String,
    desc: ChannelDesc,
    texture: TextureId,
}

/// Name-keyed arena of channels
pub struct ResourceRegistry {
    channels: SlotMap<ChannelHandle, Channel>,
    names: FxHashMap<String, ChannelHandle>,
    /// Declaration order
    order: Vec<ChannelHandle>,
    output_size: UVec2,
}

impl ResourceRegistry {
    /// Create an empty registry for the given output size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            channels: SlotMap::with_key(),
            names: FxHashMap::default(),
            order: Vec::new(),
            output_size: UVec2::new(width, height),
        }
    }

    /// Declare a channel, allocating it on first request
    ///
    /// Repeated requests with a compatible descriptor return the same handle
    /// and the same backing texture; new usage flags are merged in (the
    /// texture is recreated if that widens its usage).
    ///
    /// # Errors
    ///
    /// `ConfigurationError` if the name exists with another format or size policy.
    pub fn request_channel(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        desc: ChannelDesc,
    ) -> Result<ChannelHandle> {
        if let Some(&handle) = self.names.get(name) {
            let output_size = self.output_size;
            let Some(channel) = self.channels.get_mut(handle) else {
                config_bail!(SOURCE, "Channel '{}' is registered but has no storage", name);
            };
            if !channel.desc.is_compatible(&desc) {
                config_bail!(SOURCE,
                    "Channel '{}' requested as {:?}/{:?} but already declared as {:?}/{:?}",
                    name, desc.format, desc.size, channel.desc.format, channel.desc.size);
            }
            if !channel.desc.usage.contains(desc.usage) {
                let usage = channel.desc.usage | desc.usage;
                let size = channel.desc.resolve_size(output_size);
                let texture = device.create_texture(&TextureDesc {
                    name: name.to_string(),
                    width: size.x,
                    height: size.y,
                    format: channel.desc.format,
                    usage,
                })?;
                device.destroy_texture(channel.texture);
                channel.texture = texture;
                channel.desc.usage = usage;
                engine_debug!(SOURCE, "Channel '{}' usage widened to {:?}", name, usage);
            }
            return Ok(handle);
        }

        let size = desc.resolve_size(self.output_size);
        let texture = device.create_texture(&TextureDesc {
            name: name.to_string(),
            width: size.x,
            height: size.y,
            format: desc.format,
            usage: desc.usage,
        })?;
        let handle = self.channels.insert(Channel { name: name.to_string(), desc, texture });
        self.names.insert(name.to_string(), handle);
        self.order.push(handle);
        engine_debug!(SOURCE, "Channel '{}' allocated {}x{} {:?}", name, size.x, size.y, desc.format);
        Ok(handle)
    }

    /// Backing texture of a channel; never allocates
    pub fn channel(&self, name: &str) -> Option<TextureId> {
        let handle = self.names.get(name)?;
        self.channels.get(*handle).map(|c| c.texture)
    }

    /// Backing texture after clearing it to `value`
    ///
    /// Returns `Ok(None)` if the channel was never requested.
    pub fn cleared_channel(
        &self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        value: Vec4,
    ) -> Result<Option<TextureId>> {
        let Some(texture) = self.channel(name) else {
            engine_trace!(SOURCE, "Cleared channel '{}' requested but not declared", name);
            return Ok(None);
        };
        device.clear_texture(texture, value)?;
        Ok(Some(texture))
    }

    // ===== ENVIRONMENT MAP =====

    /// Join the environment map, declaring a 1x1 black one if none exists
    ///
    /// The environment map is fixed-size: resizes never touch it.
    pub fn request_environment_map(&mut self, device: &mut dyn GraphicsDevice) -> Result<ChannelHandle> {
        let desc = match self.descriptor(ENVIRONMENT_MAP) {
            Some(existing) => *existing,
            None => ChannelDesc::fixed(ENVIRONMENT_MAP_FORMAT, 1, 1),
        };
        self.request_channel(device, ENVIRONMENT_MAP, desc)
    }

    /// Replace the environment map contents with `width` x `height` row-major texels
    ///
    /// The handle survives a size change; the backing texture is recreated.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` if the texel count does not match the size, or
    /// if the channel was declared with another format.
    pub fn update_environment_map(
        &mut self,
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
        texels: &[Vec4],
    ) -> Result<ChannelHandle> {
        let area = width as usize * height as usize;
        if area == 0 || texels.len() != area {
            config_bail!(SOURCE, "Environment map {}x{} needs {} texels, got {}",
                width, height, area, texels.len());
        }
        let size = ChannelSize::Fixed { width, height };

        if let Some(&handle) = self.names.get(ENVIRONMENT_MAP) {
            if let Some(channel) = self.channels.get_mut(handle) {
                if channel.desc.format != ENVIRONMENT_MAP_FORMAT {
                    config_bail!(SOURCE, "Environment map declared as {:?}, expected {:?}",
                        channel.desc.format, ENVIRONMENT_MAP_FORMAT);
                }
                if channel.desc.size != size {
                    let texture = device.create_texture(&TextureDesc {
                        name: ENVIRONMENT_MAP.to_string(),
                        width,
                        height,
                        format: ENVIRONMENT_MAP_FORMAT,
                        usage: channel.desc.usage,
                    })?;
                    device.destroy_texture(channel.texture);
                    channel.texture = texture;
                    channel.desc.size = size;
                }
            }
        }

        let handle = self.request_channel(device, ENVIRONMENT_MAP, ChannelDesc::fixed(ENVIRONMENT_MAP_FORMAT, width, height))?;
        let Some(texture) = self.texture(handle) else {
            config_bail!(SOURCE, "Environment map has no storage");
        };
        device.write_texels(texture, texels)?;
        engine_info!(SOURCE, "Environment map updated ({}x{})", width, height);
        Ok(handle)
    }

    /// Reallocate every screen-sized channel to `width` x `height`
    ///
    /// Textures are resized in place so handles and texture ids stay valid;
    /// contents are undefined afterwards.
    pub fn resize_all(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<()> {
        self.output_size = UVec2::new(width, height);
        let mut resized = 0;
        for handle in &self.order {
            let Some(channel) = self.channels.get(*handle) else {
                continue;
            };
            if channel.desc.size == ChannelSize::Screen {
                device.resize_texture(channel.texture, width, height)?;
                resized += 1;
            }
        }
        engine_info!(SOURCE, "Resized {} channels to {}x{}", resized, width, height);
        Ok(())
    }

    /// Authoritative frame size all screen-sized channels conform to
    pub fn output_size(&self) -> UVec2 {
        self.output_size
    }

    // ===== ENUMERATION =====

    /// Handle of a channel
    pub fn handle(&self, name: &str) -> Option<ChannelHandle> {
        self.names.get(name).copied()
    }

    /// Backing texture of a handle
    pub fn texture(&self, handle: ChannelHandle) -> Option<TextureId> {
        self.channels.get(handle).map(|c| c.texture)
    }

    /// Descriptor a channel was declared with (usage merged)
    pub fn descriptor(&self, name: &str) -> Option<&ChannelDesc> {
        let handle = self.names.get(name)?;
        self.channels.get(*handle).map(|c| &c.desc)
    }

    /// True if the channel was requested
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.order.len()
    }

    /// Channel names in declaration order
    pub fn channel_names(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|h| self.channels.get(*h))
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Declaration index of a channel
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        let handle = self.names.get(name)?;
        self.order.iter().position(|h| h == handle)
    }

    /// Channel name at a declaration index
    pub fn channel_name(&self, index: usize) -> Option<&str> {
        let handle = self.order.get(index)?;
        self.channels.get(*handle).map(|c| c.name.as_str())
    }

    /// Destroy every backing texture and forget all channels
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        for handle in self.order.drain(..) {
            if let Some(channel) = self.channels.remove(handle) {
                device.destroy_texture(channel.texture);
            }
        }
        self.names.clear();
        engine_debug!(SOURCE, "Released all channels");
    }
}

#[cfg(test)]
#[path = "resource_registry_tests.rs"]
mod tests;
