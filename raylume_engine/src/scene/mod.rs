/// Scene provider interface and camera

pub mod camera;
pub mod scene;

pub use camera::Camera;
pub use scene::{BasicScene, Scene};
