pub mod geometry;
pub mod materials;
pub mod renderer;
pub mod sampling;
pub mod scene;
pub mod settings;

mod backends;

pub use backends::RenderingBackend;

#[cfg(test)]
mod tests;
