/// Unit tests for Scene and BasicScene.

use glam::{Mat4, Vec3};
use crate::scene::{BasicScene, Camera, Scene};

#[test]
fn test_basic_scene_defaults() {
    let scene = BasicScene::new("pink_room");
    assert_eq!(scene.name(), "pink_room");
    assert!(scene.active_camera().is_none());
    assert!(scene.supports_ray_tracing());
    assert_eq!(scene.bounding_radius(), 1.0);
}

#[test]
fn test_basic_scene_builders() {
    let scene = BasicScene::new("raster_only")
        .with_camera(Camera::default())
        .with_ray_tracing(false)
        .with_bounding_radius(12.0);
    assert!(scene.active_camera().is_some());
    assert!(!scene.supports_ray_tracing());
    assert_eq!(scene.bounding_radius(), 12.0);
}

#[test]
fn test_active_camera_mut_through_trait_object() {
    let mut scene: Box<dyn Scene> = Box::new(BasicScene::new("s").with_camera(Camera::default()));
    let moved = Mat4::from_translation(Vec3::X);
    scene.active_camera_mut().unwrap().set_view_matrix(moved);
    assert_eq!(*scene.active_camera().unwrap().view_matrix(), moved);
}

#[test]
fn test_active_camera_mut_default_is_none() {
    struct FixedScene;
    impl Scene for FixedScene {
        fn name(&self) -> &str {
            "fixed"
        }
        fn active_camera(&self) -> Option<&Camera> {
            None
        }
        fn supports_ray_tracing(&self) -> bool {
            false
        }
    }
    let mut scene = FixedScene;
    assert!(scene.active_camera_mut().is_none());
}
