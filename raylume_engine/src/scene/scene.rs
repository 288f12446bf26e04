/// Scene provider interface.
///
/// The pipeline never inspects geometry. It asks a scene three things: its
/// name, its active camera, and whether it carries ray tracing data. The
/// last one is a capability query, checked when the scene is handed to a
/// stage, instead of a downcast to a ray-tracing scene type.

use super::camera::Camera;

/// Scene consumed by the pipeline and the execution backend
pub trait Scene {
    /// Display name (also used by backends to identify the bound scene)
    fn name(&self) -> &str;

    /// Camera the frame is rendered from
    fn active_camera(&self) -> Option<&Camera>;

    /// Mutable access to the active camera, for hosts driving it
    fn active_camera_mut(&mut self) -> Option<&mut Camera> {
        None
    }

    /// True if the scene has acceleration structures for ray tracing
    fn supports_ray_tracing(&self) -> bool;

    /// Radius of the scene's bounding sphere
    fn bounding_radius(&self) -> f32 {
        1.0
    }
}

/// Plain owned scene: a name, an optional camera and a capability flag
#[derive(Debug, Clone)]
pub struct BasicScene {
    name: String,
    camera: Option<Camera>,
    ray_tracing: bool,
    bounding_radius: f32,
}

impl BasicScene {
    /// Ray tracing capable scene without a camera
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            camera: None,
            ray_tracing: true,
            bounding_radius: 1.0,
        }
    }

    /// Attach an active camera
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Set the ray tracing capability
    pub fn with_ray_tracing(mut self, supported: bool) -> Self {
        self.ray_tracing = supported;
        self
    }

    /// Set the bounding sphere radius
    pub fn with_bounding_radius(mut self, radius: f32) -> Self {
        self.bounding_radius = radius;
        self
    }

    /// Active camera, mutable
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }
}

impl Scene for BasicScene {
    fn name(&self) -> &str {
        &self.name
    }

    fn active_camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    fn active_camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    fn supports_ray_tracing(&self) -> bool {
        self.ray_tracing
    }

    fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
