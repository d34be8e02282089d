use crate::scene::primitive::{GpuPrimitive, Primitive, SceneError};

/// Ordered, immutable list of primitives. The order is the index order on the device.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    primitives: Vec<Primitive>,
}

impl Scene {
    pub fn new(primitives: Vec<Primitive>) -> Scene {
        Scene { primitives }
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn emitter_count(&self) -> usize {
        self.primitives.iter().filter(|p| p.emission().is_some()).count()
    }

    /// Packs every primitive into the fixed-size record array uploaded to the kernel
    pub fn to_gpu(&self) -> Vec<GpuPrimitive> {
        self.primitives.iter().map(Primitive::encode).collect()
    }

    pub fn from_gpu(bytes: &[u8]) -> Result<Scene, SceneError> {
        Primitive::decode_all(bytes).map(Scene::new)
    }
}

/// The scene rendered by the viewer
pub fn build_scene() -> Result<Scene, SceneError> {
    super::test_scenes::cornell_box()
}
