// vim: noet

/*
 * Reduction of the per-band intensity vector to scalar scores.
 *
 * The piecewise mappings are intentionally steep: quiet passages stay at the minimum and loud
 * passages jump straight to the maximum, with a short linear ramp in between.
 */

use crate::bands::IntensityVector;
use crate::config;

pub type WeightVector = [u8; config::NUM_BANDS];

/// Weights for the clusters at even positions in the Move pattern (bass heavy).
pub const EVEN_WEIGHTS: WeightVector    = [4, 4, 2, 1, 1, 1, 1, 1];
/// Weights for the clusters at odd positions in the Move pattern (mids and highs).
pub const ODD_WEIGHTS: WeightVector     = [1, 1, 1, 2, 4, 4, 2, 1];
pub const TWINKLE_WEIGHTS: WeightVector = [2, 4, 1, 1, 1, 4, 4, 4];

pub const MAX_MOTHERSHIP_LENGTH: u8 = 10;
pub const MAX_TWINKLE_COUNT: usize  = 1200;

/// Integer linear re-mapping with truncating division, like Arduino's `map()`.
///
/// The result is not clamped: inputs outside `in_min..=in_max` extrapolate.
pub fn linear_map(x: i64, in_min: i64, in_max: i64, out_min: i64, out_max: i64) -> i64
{
	if in_max == in_min {
		return out_min;
	}

	(x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// `Σ(intensity·weight) / Σ(weight)`, or 0 if all weights are zero.
pub fn weighted_average(intensity: &IntensityVector, weights: &WeightVector) -> u8
{
	let (weighted_total, total_weights) = intensity.iter()
		.zip(weights.iter())
		.fold((0u32, 0u32), |(sum, wsum), (&i, &w)| (sum + i as u32 * w as u32, wsum + w as u32));

	if total_weights == 0 {
		return 0;
	}

	(weighted_total / total_weights) as u8
}

/// Size of a cluster of lit pixels, 1 to 10.
pub fn mothership_length(intensity: &IntensityVector, weights: &WeightVector) -> u8
{
	length_for_average(weighted_average(intensity, weights))
}

fn length_for_average(avg: u8) -> u8
{
	if avg > 12 {
		MAX_MOTHERSHIP_LENGTH
	} else if avg > 7 {
		linear_map(avg as i64, 7, 12, 2, 7) as u8
	} else {
		1
	}
}

/// How many pixels the Twinkle pattern tries to ignite this frame, 1 to 1200.
pub fn num_to_twinkle(intensity: &IntensityVector) -> usize
{
	twinkles_for_average(weighted_average(intensity, &TWINKLE_WEIGHTS))
}

fn twinkles_for_average(avg: u8) -> usize
{
	let avg = avg as i64;

	if avg >= 12 {
		MAX_TWINKLE_COUNT
	} else if avg >= 6 {
		linear_map(avg, 6, 11, 100, 800) as usize
	} else if avg >= 3 {
		linear_map(avg, 3, 5, 5, 20) as usize
	} else {
		1
	}
}
