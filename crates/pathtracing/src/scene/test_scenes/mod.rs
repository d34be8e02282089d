//! Built-in scenes. The viewer renders `cornell_box`; the others are small scenes that are
//! useful when poking at the kernel.

use crate::{
    geometry::Vec3,
    materials::Material,
    scene::{Camera, CameraError, Cube, Rect, Scene, SceneError, Sphere},
};

pub struct TestSceneDescriptor {
    pub name: &'static str,
    pub scene_func: fn() -> Result<Scene, SceneError>,
    pub camera_func: fn(f32) -> Result<Camera, CameraError>,
}

const TEST_SCENES: &[TestSceneDescriptor] = &[
    TestSceneDescriptor {
        name: "cornell_box",
        scene_func: cornell_box,
        camera_func: cornell_box_camera,
    },
    TestSceneDescriptor {
        name: "material_spheres",
        scene_func: material_spheres,
        camera_func: material_spheres_camera,
    },
];

pub fn all_test_scenes() -> &'static [TestSceneDescriptor] {
    TEST_SCENES
}

pub fn find_test_scene(name: &str) -> Option<&'static TestSceneDescriptor> {
    all_test_scenes().iter().find(|s| s.name == name)
}

/// Open box of five walls lit by a ceiling panel and a small emissive sphere,
/// holding a diffuse box, two metal boxes and a glass sphere
pub fn cornell_box() -> Result<Scene, SceneError> {
    let lambertian = Material::lambertian;

    let primitives = vec![
        // back
        Rect::axis_aligned(Vec3(-5.0, -3.0, -2.0), Vec3(10.0, 6.0, 0.0), lambertian(Vec3(0.2, 0.3, 0.6)))?.into(),
        // left
        Rect::axis_aligned(Vec3(-5.0, -3.0, -2.0), Vec3(0.0, 6.0, 6.0), lambertian(Vec3(0.75, 0.35, 0.25)))?.into(),
        // right
        Rect::axis_aligned(Vec3(5.0, -3.0, -2.0), Vec3(0.0, 6.0, 6.0), lambertian(Vec3(0.12, 0.45, 0.15)))?
            .flipped()
            .into(),
        // floor
        Rect::axis_aligned(Vec3(-5.0, -3.0, -2.0), Vec3(10.0, 0.0, 6.0), lambertian(Vec3(0.8, 0.8, 0.8)))?.into(),
        // ceiling
        Rect::axis_aligned(Vec3(-5.0, 3.0, -2.0), Vec3(10.0, 0.0, 6.0), lambertian(Vec3(1.0, 1.0, 1.0)))?
            .flipped()
            .into(),
        // ceiling light, just below the ceiling to avoid z-fighting
        Rect::axis_aligned(Vec3(-3.0, 2.99, -1.0), Vec3(6.0, 0.0, 4.0), lambertian(Vec3(0.8, 0.8, 0.8)))?
            .with_emission(Vec3::splat(2.0))
            .flipped()
            .into(),
        Sphere::new(Vec3(-4.0, 0.0, 1.0), 0.2, lambertian(Vec3(0.4, 0.8, 0.8)))
            .with_emission(Vec3(3.0, 9.0, 6.5))
            .into(),
        Cube::new(Vec3(-2.5, -2.0, -1.0), Vec3(2.5, 2.5, 2.0), 20.0, lambertian(Vec3::splat(0.8))).into(),
        Cube::new(
            Vec3(-2.5, 1.5, 0.5),
            Vec3(1.0, 1.0, 1.0),
            20.0,
            Material::metallic(Vec3::splat(0.8), 0.1),
        )
        .into(),
        Cube::new(
            Vec3(2.3, 1.5, 0.5),
            Vec3(1.0, 1.0, 1.0),
            45.0,
            Material::metallic(Vec3(1.0, 0.4, 0.3), 0.1),
        )
        .into(),
        Sphere::new(Vec3(2.5, -1.0, 3.0), 1.0, Material::dielectric(Vec3::splat(1.0), 1.5)).into(),
    ];

    Ok(Scene::new(primitives))
}

pub fn cornell_box_camera(aspect: f32) -> Result<Camera, CameraError> {
    Camera::new(Vec3(0.0, 0.0, 16.0), Vec3::zero(), Vec3(0.0, 1.0, 0.0), 30.0, aspect)
}

/// One sphere of each material on a large floor, lit only by the sky
pub fn material_spheres() -> Result<Scene, SceneError> {
    let primitives = vec![
        Rect::axis_aligned(
            Vec3(-50.0, 0.0, -50.0),
            Vec3(100.0, 0.0, 100.0),
            Material::lambertian(Vec3::splat(0.5)),
        )?
        .into(),
        Sphere::new(Vec3(-2.2, 1.0, 0.0), 1.0, Material::lambertian(Vec3(0.7, 0.3, 0.3))).into(),
        Sphere::new(Vec3(0.0, 1.0, 0.0), 1.0, Material::metallic(Vec3(0.8, 0.6, 0.2), 0.3)).into(),
        Sphere::new(Vec3(2.2, 1.0, 0.0), 1.0, Material::dielectric(Vec3::splat(1.0), 1.5)).into(),
    ];

    Ok(Scene::new(primitives))
}

pub fn material_spheres_camera(aspect: f32) -> Result<Camera, CameraError> {
    Camera::new(Vec3(0.0, 2.0, 9.0), Vec3(0.0, 1.0, 0.0), Vec3(0.0, 1.0, 0.0), 35.0, aspect)
}
