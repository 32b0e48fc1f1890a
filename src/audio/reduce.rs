use rayon::prelude::*;

/// Reduce a sample buffer to `target` bar magnitudes in [0, 1].
///
/// Each output is the mean absolute amplitude of one contiguous block of
/// `len / target` samples (the trailing remainder is ignored), then the whole
/// sequence is scaled so the loudest block is exactly 1.0.
///
/// - buffers shorter than `target` map each bar onto a single sample, so the
///   output length is still `target`
/// - silent buffers produce all zeros
/// - empty input or `target == 0` produce an empty sequence
pub fn reduce(samples: &[f32], target: usize) -> Vec<f32> {
    if samples.is_empty() || target == 0 {
        return Vec::new();
    }

    let block_size = samples.len() / target;

    let means: Vec<f32> = if block_size == 0 {
        (0..target)
            .map(|i| samples[i * samples.len() / target].abs())
            .collect()
    } else {
        samples
            .par_chunks(block_size)
            .take(target)
            .map(|block| block.iter().map(|s| s.abs()).sum::<f32>() / block_size as f32)
            .collect()
    };

    let peak = means.iter().copied().fold(0.0f32, f32::max);
    if peak <= 0.0 || !peak.is_finite() {
        return vec![0.0; target];
    }

    means.into_iter().map(|m| (m / peak).min(1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn block_means_are_normalized() {
        // Two blocks of two samples: mean |x| = 0.25 and 0.5
        let samples = [0.25, -0.25, 0.5, -0.5];
        assert_eq!(reduce(&samples, 2), vec![0.5, 1.0]);
    }

    #[test]
    fn trailing_remainder_is_ignored() {
        // block = 3 / 2 = 1, the final loud sample never lands in a block
        let samples = [0.5, 0.25, 1.0];
        assert_eq!(reduce(&samples, 2), vec![1.0, 0.5]);
    }

    #[test]
    fn silent_buffer_is_all_zeros() {
        let out = reduce(&vec![0.0; 4800], 1200);
        assert_eq!(out.len(), 1200);
        assert!(out.iter().all(|m| *m == 0.0));
    }

    #[test]
    fn short_buffer_still_fills_every_bar() {
        let samples = [0.125, -0.5, 0.25];
        let out = reduce(&samples, 6);
        assert_eq!(out, vec![0.25, 0.25, 1.0, 1.0, 0.5, 0.5]);
    }

    #[test]
    fn empty_input() {
        assert!(reduce(&[], 1000).is_empty());
        assert!(reduce(&[0.3, 0.2], 0).is_empty());
    }

    proptest! {
        #[test]
        fn output_has_target_length_and_unit_range(
            samples in prop::collection::vec(-1.0f32..=1.0, 1..5000),
            target in 1usize..1500,
        ) {
            let out = reduce(&samples, target);
            prop_assert_eq!(out.len(), target);
            prop_assert!(out.iter().all(|m| (0.0..=1.0).contains(m)));

            let silent = out.iter().all(|m| *m == 0.0);
            prop_assert!(silent || out.iter().any(|m| *m == 1.0));
        }

        #[test]
        fn reduction_is_deterministic(
            samples in prop::collection::vec(-1.0f32..=1.0, 1..5000),
            target in 1usize..1500,
        ) {
            let a = reduce(&samples, target);
            let b = reduce(&samples, target);
            let a_bits: Vec<u32> = a.iter().map(|m| m.to_bits()).collect();
            let b_bits: Vec<u32> = b.iter().map(|m| m.to_bits()).collect();
            prop_assert_eq!(a_bits, b_bits);
        }
    }
}
