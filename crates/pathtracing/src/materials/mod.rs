use crate::geometry::Vec3;

/// Scattering model selected by the kernel. Discriminants are the values
/// written into the header of each encoded primitive.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Lambertian = 0,
    Metallic = 1,
    Dielectric = 2,
}

impl MaterialKind {
    pub fn from_raw(raw: u32) -> Option<MaterialKind> {
        match raw {
            0 => Some(MaterialKind::Lambertian),
            1 => Some(MaterialKind::Metallic),
            2 => Some(MaterialKind::Dielectric),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    pub albedo: Vec3,

    // fuzz for metals, index of refraction for dielectrics
    // ignored by lambertian surfaces
    pub param: f32,
}

impl Material {
    pub fn lambertian(albedo: Vec3) -> Material {
        Material { kind: MaterialKind::Lambertian, albedo, param: 1.0 }
    }

    pub fn metallic(albedo: Vec3, fuzz: f32) -> Material {
        Material { kind: MaterialKind::Metallic, albedo, param: fuzz }
    }

    pub fn dielectric(albedo: Vec3, eta: f32) -> Material {
        Material { kind: MaterialKind::Dielectric, albedo, param: eta }
    }
}
