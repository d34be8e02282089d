//! Progressive dispatch scheduling.
//!
//! The image is split into a `chunks_x * chunks_y` grid and each visual frame traces exactly one
//! chunk. Chunks are visited in row-major order, so after `chunk_count` frames every pixel has
//! received one more sample: that is one pass. The kernel is given the pass number (not the frame
//! number) as its iteration index, since a chunk is only resampled once per pass.

mod accumulate;
mod stats;

pub use accumulate::{incremental_mean, sanitize_radiance};
pub use stats::{PassReport, PassTimer};

use crate::{backends::RenderingBackend, settings::SettingsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: u32,
    pub y: u32,
}

/// Pixel rectangle covered by one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ChunkRect {
    pub fn origin(&self) -> [u32; 2] {
        [self.x, self.y]
    }

    pub fn extent(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Absolute pixel coordinates in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + use<> {
        let ChunkRect { x, y, width, height } = *self;
        (y..y + height).flat_map(move |py| (x..x + width).map(move |px| (px, py)))
    }
}

/// Chunk layout over an image. Only constructible when the grid divides the image evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkGrid {
    width: u32,
    height: u32,
    chunks_x: u32,
    chunks_y: u32,
}

impl ChunkGrid {
    pub fn new(width: u32, height: u32, chunks_x: u32, chunks_y: u32) -> Result<ChunkGrid, SettingsError> {
        if width == 0 || height == 0 {
            return Err(SettingsError::EmptyImage { width, height });
        }
        if chunks_x == 0 || chunks_y == 0 {
            return Err(SettingsError::EmptyChunkGrid { chunks_x, chunks_y });
        }
        if chunks_x.checked_mul(chunks_y).is_none() {
            return Err(SettingsError::TooManyChunks { chunks_x, chunks_y });
        }
        if width % chunks_x != 0 || height % chunks_y != 0 {
            return Err(SettingsError::UnevenChunkGrid { width, height, chunks_x, chunks_y });
        }

        Ok(ChunkGrid { width, height, chunks_x, chunks_y })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn chunks_x(&self) -> u32 {
        self.chunks_x
    }

    pub fn chunks_y(&self) -> u32 {
        self.chunks_y
    }

    pub fn chunk_count(&self) -> u32 {
        self.chunks_x * self.chunks_y
    }

    /// Size of every chunk in pixels
    pub fn extent(&self) -> [u32; 2] {
        [self.width / self.chunks_x, self.height / self.chunks_y]
    }

    pub fn chunk_for_frame(&self, frame: u64) -> ChunkCoord {
        let chunks_x = self.chunks_x as u64;
        let chunks_y = self.chunks_y as u64;
        ChunkCoord {
            x: (frame % chunks_x) as u32,
            y: ((frame / chunks_x) % chunks_y) as u32,
        }
    }

    pub fn iteration_for_frame(&self, frame: u64) -> u32 {
        let pass = frame / self.chunk_count() as u64;
        u32::try_from(pass).unwrap_or(u32::MAX)
    }

    pub fn chunk_rect(&self, chunk: ChunkCoord) -> ChunkRect {
        debug_assert!(chunk.x < self.chunks_x && chunk.y < self.chunks_y);
        let [width, height] = self.extent();
        // chunk.x < chunks_x, so the origin never exceeds the image size
        ChunkRect {
            x: chunk.x * width,
            y: chunk.y * height,
            width,
            height,
        }
    }

    /// All chunks in the order they are dispatched
    pub fn chunks(&self) -> impl Iterator<Item = ChunkCoord> + use<> {
        let ChunkGrid { chunks_x, chunks_y, .. } = *self;
        (0..chunks_y).flat_map(move |y| (0..chunks_x).map(move |x| ChunkCoord { x, y }))
    }
}

/// Work for one frame: which chunk to trace and which pass it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub frame: u64,
    pub iteration: u32,
    pub chunk: ChunkCoord,
    pub rect: ChunkRect,

    // true for the last chunk of a pass
    pub completes_pass: bool,
}

impl Dispatch {
    /// Workgroups needed to cover the chunk with `workgroup_size` invocations per axis
    pub fn workgroups(&self, workgroup_size: [u32; 2]) -> [u32; 3] {
        [
            u32::div_ceil(self.rect.width, workgroup_size[0]),
            u32::div_ceil(self.rect.height, workgroup_size[1]),
            1,
        ]
    }

    /// Samples every pixel of this chunk holds once the dispatch has run
    pub fn sample_count(&self) -> u32 {
        self.iteration.saturating_add(1)
    }
}

/// Owns the frame counter and turns it into dispatches
#[derive(Debug, Clone)]
pub struct ProgressiveScheduler {
    grid: ChunkGrid,
    frame: u64,
}

impl ProgressiveScheduler {
    pub fn new(grid: ChunkGrid) -> ProgressiveScheduler {
        ProgressiveScheduler { grid, frame: 0 }
    }

    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    /// Frames dispatched so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Passes over the full image finished so far
    pub fn completed_passes(&self) -> u64 {
        self.frame / self.grid.chunk_count() as u64
    }

    /// The dispatch the next call to `next_dispatch` will return
    pub fn peek(&self) -> Dispatch {
        let frame = self.frame;
        let chunk = self.grid.chunk_for_frame(frame);
        let n_chunks = self.grid.chunk_count() as u64;

        Dispatch {
            frame,
            iteration: self.grid.iteration_for_frame(frame),
            chunk,
            rect: self.grid.chunk_rect(chunk),
            completes_pass: (frame + 1) % n_chunks == 0,
        }
    }

    // chunk and iteration both come from the frame counter before it is advanced
    pub fn next_dispatch(&mut self) -> Dispatch {
        let dispatch = self.peek();
        self.frame += 1;
        dispatch
    }

    /// Schedules one frame and hands it to the backend
    pub fn step<B: RenderingBackend + ?Sized>(&mut self, backend: &mut B) -> Dispatch {
        let dispatch = self.next_dispatch();
        tracing::trace!(
            frame = dispatch.frame,
            iteration = dispatch.iteration,
            chunk_x = dispatch.chunk.x,
            chunk_y = dispatch.chunk.y,
            "dispatching chunk"
        );
        backend.dispatch(&dispatch);
        dispatch
    }
}
