/// Unit tests for Camera.

use glam::{Mat4, Vec3};
use crate::scene::Camera;

fn look_at(eye: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y)
}

// ============================================================================
// Tests: Construction and getters
// ============================================================================

#[test]
fn test_new_stores_matrices() {
    let view = look_at(Vec3::new(0.0, 2.0, 5.0));
    let proj = Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 100.0);
    let camera = Camera::new(view, proj);

    assert_eq!(*camera.view_matrix(), view);
    assert_eq!(*camera.projection_matrix(), proj);
    assert_eq!(camera.view_projection_matrix(), proj * view);
    assert_eq!(camera.lens_radius(), 0.0);
}

#[test]
fn test_default_is_identity() {
    let camera = Camera::default();
    assert_eq!(*camera.view_matrix(), Mat4::IDENTITY);
    assert_eq!(*camera.projection_matrix(), Mat4::IDENTITY);
}

// ============================================================================
// Tests: Setters
// ============================================================================

#[test]
fn test_set_view_matrix_changes_view() {
    let mut camera = Camera::default();
    let moved = look_at(Vec3::new(1.0, 0.0, 3.0));
    camera.set_view_matrix(moved);
    assert_eq!(*camera.view_matrix(), moved);
}

#[test]
fn test_set_lens_clamps_negative_radius() {
    let mut camera = Camera::default();
    camera.set_lens(-1.0, 4.0);
    assert_eq!(camera.lens_radius(), 0.0);
    assert_eq!(camera.focal_distance(), 4.0);

    camera.set_lens(0.25, 2.0);
    assert_eq!(camera.lens_radius(), 0.25);
}
