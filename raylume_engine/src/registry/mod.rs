/// Resource registry and channel descriptors

pub mod channel;
pub mod resource_registry;

pub use channel::{ChannelDesc, ChannelSize};
pub use resource_registry::{
    ChannelHandle, ResourceRegistry, ENVIRONMENT_MAP, ENVIRONMENT_MAP_FORMAT, OUTPUT_CHANNEL,
};
