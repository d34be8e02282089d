use rand::{SeedableRng, rngs::StdRng};

use crate::{
    RenderingBackend,
    renderer::{Dispatch, ProgressiveScheduler, incremental_mean},
    sampling::SeedBuffer,
    scene::{CameraUniforms, test_scenes},
    settings::RenderSettings,
};

/// Stands in for the GPU: runs a trivial "kernel" on the host that advances each
/// pixel's seed and folds a constant sample into its texel
struct HostBackend {
    width: u32,
    camera: Option<CameraUniforms>,
    seeds: Vec<u32>,
    touches: Vec<u32>,
    accumulation: Vec<[f32; 4]>,
    dispatches: Vec<Dispatch>,
}

impl HostBackend {
    fn new(seeds: &SeedBuffer) -> HostBackend {
        HostBackend {
            width: seeds.width(),
            camera: None,
            seeds: seeds.as_slice().to_vec(),
            touches: vec![0; seeds.len()],
            accumulation: vec![[0.0; 4]; seeds.len()],
            dispatches: Vec::new(),
        }
    }
}

fn xorshift(mut state: u32) -> u32 {
    state ^= state << 13;
    state ^= state >> 17;
    state ^= state << 5;
    state
}

impl RenderingBackend for HostBackend {
    fn bind_camera(&mut self, camera: &CameraUniforms) {
        self.camera = Some(*camera);
    }

    fn dispatch(&mut self, dispatch: &Dispatch) {
        assert!(self.camera.is_some(), "dispatch before camera was bound");

        for (x, y) in dispatch.rect.pixels() {
            let index = (y * self.width + x) as usize;
            self.seeds[index] = xorshift(self.seeds[index]);
            self.touches[index] += 1;
            self.accumulation[index] = incremental_mean(self.accumulation[index], [0.5, 1.0, 2.0, 1.0], dispatch.iteration);
        }
        self.dispatches.push(*dispatch);
    }
}

#[test]
fn every_seed_slot_touched_once_per_pass() {
    let settings = RenderSettings { width: 48, height: 30, chunks_x: 4, chunks_y: 3, ..Default::default() };
    let grid = settings.validate().unwrap();
    let seeds = SeedBuffer::new(settings.width, settings.height, &mut StdRng::seed_from_u64(5));
    assert_eq!(seeds.len(), settings.pixel_count());

    let camera = (test_scenes::find_test_scene("cornell_box").unwrap().camera_func)(settings.aspect()).unwrap();
    let mut backend = HostBackend::new(&seeds);
    camera.bind(&mut backend);

    let mut scheduler = ProgressiveScheduler::new(grid);
    for pass in 1..=5u32 {
        for _ in 0..grid.chunk_count() {
            scheduler.step(&mut backend);
        }
        assert!(backend.touches.iter().all(|&t| t == pass), "uneven coverage after pass {pass}");
        assert_eq!(scheduler.completed_passes(), pass as u64);
    }

    // the kernel owns the seeds and has advanced every one of them
    // (zero is a fixed point of xorshift)
    assert!(
        backend.seeds.iter()
            .zip(seeds.as_slice())
            .filter(|(_, initial)| **initial != 0)
            .all(|(now, initial)| now != initial)
    );
    assert!(backend.accumulation.iter().all(|texel| *texel == [0.5, 1.0, 2.0, 1.0]));
}

#[test]
fn full_hd_four_chunks_four_thousand_frames() {
    let settings = RenderSettings::default();
    let grid = settings.validate().unwrap();
    assert_eq!(grid.chunk_count(), 4);
    assert_eq!(grid.extent(), [960, 540]);

    // counting per chunk instead of per pixel keeps this fast; tiling is checked separately
    let mut scheduler = ProgressiveScheduler::new(grid);
    let mut per_chunk = [0u32; 4];
    let mut last = None;
    for _ in 0..4000 {
        let dispatch = scheduler.next_dispatch();
        per_chunk[(dispatch.chunk.y * grid.chunks_x() + dispatch.chunk.x) as usize] += 1;
        last = Some(dispatch);
    }

    assert_eq!(scheduler.frame(), 4000);
    assert_eq!(scheduler.completed_passes(), 1000);
    assert_eq!(grid.iteration_for_frame(scheduler.frame()), 1000);

    let last = last.unwrap();
    assert_eq!(last.iteration, 999);
    assert_eq!(last.sample_count(), 1000);
    assert!(last.completes_pass);

    let mut samples = vec![0u32; settings.pixel_count()];
    for chunk in grid.chunks() {
        let count = per_chunk[(chunk.y * grid.chunks_x() + chunk.x) as usize];
        for (x, y) in grid.chunk_rect(chunk).pixels() {
            samples[(y * settings.width + x) as usize] += count;
        }
    }
    assert!(samples.iter().all(|&s| s == 1000));
}

#[test]
fn kernel_sample_count_matches_pass_number() {
    let settings = RenderSettings { width: 16, height: 16, chunks_x: 2, chunks_y: 2, ..Default::default() };
    let seeds = SeedBuffer::new(16, 16, &mut StdRng::seed_from_u64(1));
    let mut backend = HostBackend::new(&seeds);
    backend.bind_camera(&CameraUniforms::default());

    let mut scheduler = ProgressiveScheduler::new(settings.validate().unwrap());
    for _ in 0..12 {
        scheduler.step(&mut backend);
    }

    let iterations: Vec<u32> = backend.dispatches.iter().map(|d| d.iteration).collect();
    assert_eq!(iterations, vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2]);
}
