/// Running mean update performed by the kernel for every traced pixel.
///
/// `iteration` is the zero-based pass index the sample belongs to, so the texel holds
/// `iteration + 1` samples afterwards. At `iteration == 0` the old value has weight zero,
/// which is why the accumulation buffer never needs clearing.
pub fn incremental_mean(old: [f32; 4], sample: [f32; 4], iteration: u32) -> [f32; 4] {
    let sample = sanitize_radiance(sample);
    let weight = 1.0 / (iteration as f32 + 1.0);
    std::array::from_fn(|i| old[i] + (sample[i] - old[i]) * weight)
}

// upper bound below f32::MAX, anything outside [0, RADIANCE_LIMIT) is dropped
const RADIANCE_LIMIT: f32 = 3.0e38;

/// Zeroes lanes that are negative, infinite or NaN, same as the kernel does before blending.
/// Must stay a range test: fast-math may fold `x != x` away.
pub fn sanitize_radiance(sample: [f32; 4]) -> [f32; 4] {
    sample.map(|lane| if lane >= 0.0 && lane < RADIANCE_LIMIT { lane } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn first_sample_overwrites_garbage() {
        let texel = incremental_mean([123.0, -4.0, 9.0, 1.0], [0.25, 0.5, 0.75, 1.0], 0);
        assert_eq!(texel, [0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn bad_samples_do_not_poison_the_texel() {
        assert_eq!(
            sanitize_radiance([f32::NAN, f32::INFINITY, -1.0, 2.5]),
            [0.0, 0.0, 0.0, 2.5]
        );

        let texel = incremental_mean([0.5, 0.5, 0.5, 1.0], [f32::NAN, f32::INFINITY, 1.5, 1.0], 1);
        assert!(texel.iter().all(|lane| lane.is_finite()));
        assert_eq!(texel, [0.25, 0.25, 1.0, 1.0]);
    }

    #[test]
    fn matches_arithmetic_mean() {
        let mut rng = StdRng::seed_from_u64(42);
        let samples: Vec<f32> = (0..1000).map(|_| rng.random_range(0.0..4.0)).collect();

        let mut texel = [0.0f32; 4];
        for (iteration, sample) in samples.iter().enumerate() {
            texel = incremental_mean(texel, [*sample, 0.0, 0.0, 1.0], iteration as u32);
        }

        let mean = samples.iter().map(|s| *s as f64).sum::<f64>() / samples.len() as f64;
        assert!((texel[0] as f64 - mean).abs() < 1e-3, "{} vs {mean}", texel[0]);
        assert_eq!(texel[3], 1.0);
    }
}
