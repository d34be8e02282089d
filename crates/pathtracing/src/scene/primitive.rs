//! Analytic primitives understood by the compute kernel.
//!
//! Every primitive, whatever its shape, is encoded into one [`GpuPrimitive`] record so that the
//! whole scene is a single flat array on the device that the kernel can index directly.
//! Slots a shape does not need are left zeroed.
//!
//! | slot       | Rect                | Cube               | Sphere          |
//! |------------|---------------------|--------------------|-----------------|
//! | `header`   | shape, material     | shape, material    | shape, material |
//! | `p0`       | origin, normal flip | min corner, angle  | center, radius  |
//! | `p1`       | edge u              | extent             | -               |
//! | `p2`       | edge v              | -                  | -               |
//! | `albedo`   | albedo, param       | albedo, param      | albedo, param   |
//! | `emission` | emission            | -                  | emission        |

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::geometry::Vec3;
use crate::materials::{Material, MaterialKind};

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("unknown shape tag {0} in primitive record")]
    UnknownShape(u32),
    #[error("unknown material kind {0} in primitive record")]
    UnknownMaterial(u32),
    #[error("axis aligned rect size {0:?} must have exactly one zero component")]
    DegenerateRect(Vec3),
    #[error("primitive buffer of {0} bytes is not a whole number of records")]
    TruncatedBuffer(usize),
}

/// Shape discriminants as stored in `header[0]`
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeTag {
    Rect = 0,
    Cube = 1,
    Sphere = 2,
}

impl ShapeTag {
    pub fn from_raw(raw: u32) -> Option<ShapeTag> {
        match raw {
            0 => Some(ShapeTag::Rect),
            1 => Some(ShapeTag::Cube),
            2 => Some(ShapeTag::Sphere),
            _ => None,
        }
    }
}

/// Parallelogram spanned by `u` and `v` from `origin`.
/// Its normal is `normalize(u x v) * normal_flip`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Vec3,
    pub u: Vec3,
    pub v: Vec3,
    pub material: Material,
    pub emission: Option<Vec3>,
    pub normal_flip: f32,
}

/// Box spanning `min..min + extent`, rotated by `angle` degrees around the
/// Y axis through its center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    pub min: Vec3,
    pub extent: Vec3,
    pub angle: f32,
    pub material: Material,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: Material,
    pub emission: Option<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Rect(Rect),
    Cube(Cube),
    Sphere(Sphere),
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GpuPrimitive {
    pub header: [u32; 4],
    pub p0: [f32; 4],
    pub p1: [f32; 4],
    pub p2: [f32; 4],
    pub albedo: [f32; 4],
    pub emission: [f32; 4],
}

impl Rect {
    pub fn new(origin: Vec3, u: Vec3, v: Vec3, material: Material) -> Rect {
        Rect { origin, u, v, material, emission: None, normal_flip: 1.0 }
    }

    /// Builds a rect lying in the plane named by the zero component of `size`.
    /// The unflipped normal points along the positive axis of that plane.
    pub fn axis_aligned(origin: Vec3, size: Vec3, material: Material) -> Result<Rect, SceneError> {
        let Vec3(sx, sy, sz) = size;
        let (u, v) = match (sx == 0.0, sy == 0.0, sz == 0.0) {
            (false, false, true) => (Vec3(sx, 0.0, 0.0), Vec3(0.0, sy, 0.0)),
            (false, true, false) => (Vec3(0.0, 0.0, sz), Vec3(sx, 0.0, 0.0)),
            (true, false, false) => (Vec3(0.0, sy, 0.0), Vec3(0.0, 0.0, sz)),
            _ => return Err(SceneError::DegenerateRect(size)),
        };

        Ok(Rect::new(origin, u, v, material))
    }

    pub fn with_emission(self, emission: Vec3) -> Rect {
        Rect { emission: Some(emission), ..self }
    }

    pub fn flipped(self) -> Rect {
        Rect { normal_flip: -self.normal_flip, ..self }
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::cross(self.u, self.v).unit() * self.normal_flip
    }
}

impl Cube {
    pub fn new(min: Vec3, extent: Vec3, angle: f32, material: Material) -> Cube {
        Cube { min, extent, angle, material }
    }
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Material) -> Sphere {
        Sphere { center, radius, material, emission: None }
    }

    pub fn with_emission(self, emission: Vec3) -> Sphere {
        Sphere { emission: Some(emission), ..self }
    }
}

fn encode_material(shape: ShapeTag, material: &Material) -> ([u32; 4], [f32; 4]) {
    let header = [shape as u32, material.kind as u32, 0, 0];
    (header, material.albedo.extend(material.param))
}

fn decode_material(record: &GpuPrimitive) -> Result<Material, SceneError> {
    let kind = MaterialKind::from_raw(record.header[1])
        .ok_or(SceneError::UnknownMaterial(record.header[1]))?;

    Ok(Material {
        kind,
        albedo: record.albedo.into(),
        param: record.albedo[3],
    })
}

// zero emission and no emission are the same thing to the kernel
fn decode_emission(slot: [f32; 4]) -> Option<Vec3> {
    let emission = Vec3::from(slot);
    if emission == Vec3::zero() { None } else { Some(emission) }
}

impl Primitive {
    pub fn material(&self) -> &Material {
        match self {
            Primitive::Rect(rect) => &rect.material,
            Primitive::Cube(cube) => &cube.material,
            Primitive::Sphere(sphere) => &sphere.material,
        }
    }

    pub fn emission(&self) -> Option<Vec3> {
        match self {
            Primitive::Rect(rect) => rect.emission,
            Primitive::Cube(_) => None,
            Primitive::Sphere(sphere) => sphere.emission,
        }
    }

    pub fn encode(&self) -> GpuPrimitive {
        let zero = Vec3::zero();
        match self {
            Primitive::Rect(rect) => {
                let (header, albedo) = encode_material(ShapeTag::Rect, &rect.material);
                GpuPrimitive {
                    header,
                    p0: rect.origin.extend(rect.normal_flip),
                    p1: rect.u.extend(0.0),
                    p2: rect.v.extend(0.0),
                    albedo,
                    emission: rect.emission.unwrap_or(zero).extend(0.0),
                }
            }
            Primitive::Cube(cube) => {
                let (header, albedo) = encode_material(ShapeTag::Cube, &cube.material);
                GpuPrimitive {
                    header,
                    p0: cube.min.extend(cube.angle),
                    p1: cube.extent.extend(0.0),
                    p2: [0.0; 4],
                    albedo,
                    emission: [0.0; 4],
                }
            }
            Primitive::Sphere(sphere) => {
                let (header, albedo) = encode_material(ShapeTag::Sphere, &sphere.material);
                GpuPrimitive {
                    header,
                    p0: sphere.center.extend(sphere.radius),
                    p1: [0.0; 4],
                    p2: [0.0; 4],
                    albedo,
                    emission: sphere.emission.unwrap_or(zero).extend(0.0),
                }
            }
        }
    }

    pub fn decode(record: &GpuPrimitive) -> Result<Primitive, SceneError> {
        let shape = ShapeTag::from_raw(record.header[0])
            .ok_or(SceneError::UnknownShape(record.header[0]))?;
        let material = decode_material(record)?;

        let primitive = match shape {
            ShapeTag::Rect => Primitive::Rect(Rect {
                origin: record.p0.into(),
                u: record.p1.into(),
                v: record.p2.into(),
                material,
                emission: decode_emission(record.emission),
                normal_flip: record.p0[3],
            }),
            ShapeTag::Cube => Primitive::Cube(Cube {
                min: record.p0.into(),
                extent: record.p1.into(),
                angle: record.p0[3],
                material,
            }),
            ShapeTag::Sphere => Primitive::Sphere(Sphere {
                center: record.p0.into(),
                radius: record.p0[3],
                material,
                emission: decode_emission(record.emission),
            }),
        };

        Ok(primitive)
    }

    /// Decodes a packed record array, e.g. one read back from the device
    pub fn decode_all(bytes: &[u8]) -> Result<Vec<Primitive>, SceneError> {
        let record_size = size_of::<GpuPrimitive>();
        if bytes.len() % record_size != 0 {
            return Err(SceneError::TruncatedBuffer(bytes.len()));
        }

        bytes
            .chunks_exact(record_size)
            .map(|chunk| Primitive::decode(&bytemuck::pod_read_unaligned(chunk)))
            .collect()
    }
}

impl From<Rect> for Primitive {
    fn from(value: Rect) -> Self {
        Primitive::Rect(value)
    }
}

impl From<Cube> for Primitive {
    fn from(value: Cube) -> Self {
        Primitive::Cube(value)
    }
}

impl From<Sphere> for Primitive {
    fn from(value: Sphere) -> Self {
        Primitive::Sphere(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(record: &GpuPrimitive) -> &[u8] {
        bytemuck::bytes_of(record)
    }

    #[test]
    fn record_is_vec4_aligned() {
        assert_eq!(size_of::<GpuPrimitive>(), 96);
        assert_eq!(size_of::<GpuPrimitive>() % 16, 0);
    }

    #[test]
    fn all_shapes_round_trip_through_one_record_array() {
        let primitives: Vec<Primitive> = vec![
            Rect::new(
                Vec3(-3.0, 2.99, -1.0),
                Vec3(0.0, 0.0, 4.0),
                Vec3(6.0, 0.0, 0.0),
                Material::lambertian(Vec3(0.8, 0.8, 0.8)),
            )
            .with_emission(Vec3(2.0, 2.0, 2.0))
            .flipped()
            .into(),
            Cube::new(
                Vec3(2.3, 1.5, 0.5),
                Vec3(1.0, 1.0, 1.0),
                45.0,
                Material::metallic(Vec3(1.0, 0.4, 0.3), 0.1),
            )
            .into(),
            Sphere::new(Vec3(2.5, -1.0, 3.0), 1.0, Material::dielectric(Vec3(1.0, 1.0, 1.0), 1.5)).into(),
        ];

        let records: Vec<GpuPrimitive> = primitives.iter().map(Primitive::encode).collect();
        let bytes: &[u8] = bytemuck::cast_slice(&records);
        assert_eq!(bytes.len(), 3 * size_of::<GpuPrimitive>());

        let decoded = Primitive::decode_all(bytes).unwrap();
        assert_eq!(decoded, primitives);

        // bit exactness, not just float equality
        for (original, decoded) in primitives.iter().zip(&decoded) {
            assert_eq!(bits(&original.encode()), bits(&decoded.encode()));
        }
    }

    #[test]
    fn unknown_tags_are_rejected() {
        let mut record = Primitive::from(Sphere::new(Vec3::zero(), 1.0, Material::lambertian(Vec3::splat(0.5)))).encode();
        record.header[0] = 7;
        assert_eq!(Primitive::decode(&record), Err(SceneError::UnknownShape(7)));

        record.header[0] = ShapeTag::Sphere as u32;
        record.header[1] = 9;
        assert_eq!(Primitive::decode(&record), Err(SceneError::UnknownMaterial(9)));
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let record = Primitive::from(Cube::new(Vec3::zero(), Vec3::splat(1.0), 0.0, Material::lambertian(Vec3::splat(0.5)))).encode();
        let bytes = bytemuck::bytes_of(&record);
        assert_eq!(
            Primitive::decode_all(&bytes[..40]),
            Err(SceneError::TruncatedBuffer(40))
        );
    }

    #[test]
    fn axis_aligned_rect_normals_follow_zero_component() {
        let white = Material::lambertian(Vec3::splat(0.8));

        let back = Rect::axis_aligned(Vec3(-5.0, -3.0, -2.0), Vec3(10.0, 6.0, 0.0), white).unwrap();
        assert_eq!(back.normal(), Vec3(0.0, 0.0, 1.0));

        let floor = Rect::axis_aligned(Vec3(-5.0, -3.0, -2.0), Vec3(10.0, 0.0, 6.0), white).unwrap();
        assert_eq!(floor.normal(), Vec3(0.0, 1.0, 0.0));

        let right = Rect::axis_aligned(Vec3(5.0, -3.0, -2.0), Vec3(0.0, 6.0, 6.0), white).unwrap().flipped();
        assert_eq!(right.normal(), Vec3(-1.0, 0.0, 0.0));

        assert_eq!(
            Rect::axis_aligned(Vec3::zero(), Vec3(1.0, 1.0, 1.0), white),
            Err(SceneError::DegenerateRect(Vec3(1.0, 1.0, 1.0)))
        );
    }
}
