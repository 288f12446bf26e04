/// Execution backend interface and the CPU reference backend

pub mod texture;
pub mod program;
pub mod graphics_device;
pub mod software_device;
pub mod kernels;

pub use texture::*;
pub use program::*;
pub use graphics_device::*;
pub use software_device::{DeviceEvent, Kernel, KernelContext, SoftwareDevice};
pub use kernels::{TONE_OPERATOR_CLAMP, TONE_OPERATOR_REINHARD};
