use crate::{renderer::Dispatch, scene::CameraUniforms};

// the host side only decides what to trace; whatever runs the kernel implements this
pub trait RenderingBackend {
    /// Writes the camera into the kernel's constant state. Done once before the first dispatch.
    fn bind_camera(&mut self, camera: &CameraUniforms);

    /// Traces one chunk. Must finish recording all writes to the accumulation buffer
    /// before the display reads it.
    fn dispatch(&mut self, dispatch: &Dispatch);
}
