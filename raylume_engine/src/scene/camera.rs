/// Scene camera.
///
/// Plain matrices and thin lens parameters set by the host. Accumulation
/// compares view matrices between frames to detect motion; ray generation
/// reads the lens parameters.

use glam::Mat4;

/// View, projection and lens of the active viewpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    lens_radius: f32,
    focal_distance: f32,
}

impl Camera {
    /// Create a pinhole camera with the given matrices
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view_matrix: view,
            projection_matrix: projection,
            lens_radius: 0.0,
            focal_distance: 1.0,
        }
    }

    // ===== GETTERS =====

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Projection matrix (perspective or orthographic).
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Thin lens aperture radius (0 = pinhole)
    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }

    /// Distance to the plane in focus
    pub fn focal_distance(&self) -> f32 {
        self.focal_distance
    }

    // ===== SETTERS =====

    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.view_matrix = view;
    }

    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.projection_matrix = projection;
    }

    pub fn set_lens(&mut self, lens_radius: f32, focal_distance: f32) {
        self.lens_radius = lens_radius.max(0.0);
        self.focal_distance = focal_distance;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
