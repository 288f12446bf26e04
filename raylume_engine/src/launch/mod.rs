/// Program launch helpers composed into stages

pub mod fullscreen_launch;
pub mod ray_launch;

pub use fullscreen_launch::FullscreenLaunch;
pub use ray_launch::RayLaunch;
