use rand::{Rng, SeedableRng, rngs::StdRng};

/// Initial random state for every pixel, one `u32` per pixel in row-major order.
///
/// Each pixel gets its own stream so neighbouring pixels don't share correlated
/// samples. After upload the kernel owns the device copy and advances it in place;
/// the host never reads it back.
#[derive(Debug, Clone)]
pub struct SeedBuffer {
    width: u32,
    height: u32,
    seeds: Vec<u32>,
}

impl SeedBuffer {
    pub fn new<R: Rng>(width: u32, height: u32, rng: &mut R) -> SeedBuffer {
        let len = width as usize * height as usize;
        let seeds = (0..len).map(|_| rng.random::<u32>()).collect();

        SeedBuffer { width, height, seeds }
    }

    /// Seeds from OS entropy, so every run renders a different noise pattern
    pub fn from_entropy(width: u32, height: u32) -> SeedBuffer {
        let mut rng = StdRng::from_os_rng();
        SeedBuffer::new(width, height, &mut rng)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.seeds
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.seeds)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn one_seed_per_pixel() {
        let mut rng = StdRng::seed_from_u64(7);
        let seeds = SeedBuffer::new(64, 48, &mut rng);
        assert_eq!(seeds.len(), 64 * 48);
        assert_eq!(seeds.as_bytes().len(), 64 * 48 * 4);
        assert_eq!(seeds.index(0, 1), 64);
        assert_eq!(seeds.index(63, 47), 64 * 48 - 1);
    }

    #[test]
    fn seeds_are_spread_over_u32_range() {
        let mut rng = StdRng::seed_from_u64(1234);
        let seeds = SeedBuffer::new(128, 128, &mut rng);

        // 16k draws from 2^32 values; a handful of collisions at most
        let distinct: HashSet<u32> = seeds.as_slice().iter().copied().collect();
        assert!(distinct.len() > seeds.len() - 16);

        let high = seeds.as_slice().iter().filter(|s| **s > u32::MAX / 2).count();
        assert!(high > seeds.len() / 3 && high < seeds.len() * 2 / 3);
    }

    #[test]
    fn same_generator_seed_same_buffer() {
        let a = SeedBuffer::new(16, 16, &mut StdRng::seed_from_u64(99));
        let b = SeedBuffer::new(16, 16, &mut StdRng::seed_from_u64(99));
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn entropy_seeded_runs_diverge() {
        let a = SeedBuffer::from_entropy(32, 32);
        let b = SeedBuffer::from_entropy(32, 32);
        assert_ne!(a.as_slice(), b.as_slice());
    }
}
