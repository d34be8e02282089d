mod scene;
mod camera;
mod primitive;
pub mod test_scenes;

pub use scene::{Scene, build_scene};
pub use primitive::{
    Primitive, Rect, Cube, Sphere, GpuPrimitive, ShapeTag, SceneError
};
pub use camera::{Camera, CameraUniforms, CameraError};
