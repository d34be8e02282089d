use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::{backends::RenderingBackend, geometry::Vec3};

#[derive(Debug, Error, PartialEq)]
pub enum CameraError {
    #[error("eye, look-at and up must be finite")]
    NonFinite,
    #[error("eye and look-at target coincide, view direction is undefined")]
    CoincidentEyeAndTarget,
    #[error("up vector is parallel to the view direction")]
    ParallelUp,
    #[error("aspect ratio must be positive and finite, got {0}")]
    InvalidAspect(f32),
    #[error("vertical field of view must be in (0, 180) degrees, got {0}")]
    InvalidFov(f32),
}

/// Pinhole camera. The ray basis is derived once at construction and
/// uploaded once, the scene is static.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    pub vfov: f32, // degrees
    pub aspect: f32,

    forward: Vec3,
    right: Vec3,
    true_up: Vec3,
    half_width: f32,
    half_height: f32,
}

/// Camera state as laid out in the kernel's uniform buffer.
/// Primary ray direction for normalized raster coordinate `(s, t)` in `[-1, 1]` is
/// `forward + s * half_extent.x * right + t * half_extent.y * up`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct CameraUniforms {
    pub origin: [f32; 4],
    pub forward: [f32; 4],
    pub right: [f32; 4],
    pub up: [f32; 4],
    pub half_extent: [f32; 4],
}

// relative to |up|, below this the cross product is considered degenerate
const PARALLEL_EPSILON: f32 = 1e-6;

impl Camera {
    pub fn new(eye: Vec3, look_at: Vec3, up: Vec3, vfov: f32, aspect: f32) -> Result<Camera, CameraError> {
        if !(aspect.is_finite() && aspect > 0.0) {
            return Err(CameraError::InvalidAspect(aspect));
        }
        if !(vfov > 0.0 && vfov < 180.0) {
            return Err(CameraError::InvalidFov(vfov));
        }

        if !(eye.is_finite() && look_at.is_finite() && up.is_finite()) {
            return Err(CameraError::NonFinite);
        }

        let view = look_at - eye;
        if view.near_zero() {
            return Err(CameraError::CoincidentEyeAndTarget);
        }
        let forward = view.unit();

        let side = Vec3::cross(forward, up);
        if !(side.length() > PARALLEL_EPSILON * up.length()) || up.near_zero() {
            return Err(CameraError::ParallelUp);
        }
        let right = side.unit();
        let true_up = Vec3::cross(right, forward);

        let half_height = f32::tan(vfov.to_radians() / 2.0);
        let half_width = aspect * half_height;

        Ok(Camera {
            eye,
            look_at,
            up,
            vfov,
            aspect,
            forward,
            right,
            true_up,
            half_width,
            half_height,
        })
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn true_up(&self) -> Vec3 {
        self.true_up
    }

    /// Half width and half height of the viewport at unit distance from the eye
    pub fn half_extent(&self) -> (f32, f32) {
        (self.half_width, self.half_height)
    }

    pub fn uniforms(&self) -> CameraUniforms {
        CameraUniforms {
            origin: self.eye.extend(1.0),
            forward: self.forward.extend(0.0),
            right: self.right.extend(0.0),
            up: self.true_up.extend(0.0),
            half_extent: [self.half_width, self.half_height, 0.0, 0.0],
        }
    }

    /// Uploads the camera to the kernel. Needs to happen once before the first dispatch.
    pub fn bind<B: RenderingBackend + ?Sized>(&self, target: &mut B) {
        tracing::debug!(eye = ?self.eye, look_at = ?self.look_at, vfov = self.vfov, "binding camera");
        target.bind_camera(&self.uniforms());
    }
}
