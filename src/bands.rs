// vim: noet

/*
 * Mapping of a magnitude spectrum to 8 band intensities, similar to a simple graphic equalizer.
 */

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::time::Instant;

use crate::config;
use crate::scoring::linear_map;

pub type PeakVector = [i32; config::NUM_BANDS];
pub type IntensityVector = [u8; config::NUM_BANDS];

// highest FFT bin (inclusive) belonging to bands 0..=6. Everything above is band 7.
const BAND_UPPER_BINS: [usize; config::NUM_BANDS - 1] = [2, 5, 7, 15, 30, 53, 106];

// DC and the first bin carry no useful information
const FIRST_BIN: usize = 2;

pub fn band_for_bin(bin: usize) -> usize
{
	BAND_UPPER_BINS.iter()
		.position(|&upper| bin <= upper)
		.unwrap_or(config::NUM_BANDS - 1)
}

pub struct BandMapper
{
	peak: PeakVector,
	intensity: IntensityVector,
}

impl BandMapper
{
	pub fn new() -> BandMapper
	{
		BandMapper {
			peak: [0; config::NUM_BANDS],
			intensity: [0; config::NUM_BANDS],
		}
	}

	/// Update the band intensities from one analysis frame.
	///
	/// Only the loudest qualifying bin of each band counts. `num_samples` is the length of the
	/// time-domain window; bins up to `num_samples / 2 - 1` are scanned.
	pub fn update_intensity(&mut self, magnitudes: &[f32], num_samples: usize, amplitude: f32, sensitivity: f32) -> IntensityVector
	{
		self.peak = [0; config::NUM_BANDS];

		let end_bin = (num_samples / 2).min(magnitudes.len());

		for bin in FIRST_BIN..end_bin {
			let magnitude = magnitudes[bin];
			if magnitude <= config::NOISE_FLOOR {
				continue;
			}

			let band = band_for_bin(bin);
			let scaled = (magnitude * sensitivity / amplitude) as i32;

			if scaled > self.peak[band] {
				self.peak[band] = scaled;
			}
		}

		let ceiling = amplitude as i64;

		for (intensity, &peak) in self.intensity.iter_mut().zip(self.peak.iter()) {
			let level = linear_map(peak as i64, 0, ceiling, 0, config::INTENSITY_MAX);
			*intensity = level.clamp(0, config::INTENSITY_MAX) as u8;
		}

		self.intensity
	}

	pub fn peak(&self) -> &PeakVector
	{
		&self.peak
	}
}

/*
 * Publication slot between the analysis thread and the render loop.
 *
 * Each band is stored separately without a lock. The render loop may observe a mix of the
 * previous and the current frame, which is fine for visuals.
 *
 * Audio counts as active only while blocks with signal keep arriving. A source that stalls
 * without closing the stream therefore falls back to idle after `AUDIO_TIMEOUT_MS`.
 */
pub struct SpectrumFeed
{
	intensity: [AtomicU8; config::NUM_BANDS],

	epoch: Instant,
	// microseconds after `epoch` of the last block with signal, plus one. 0 means none.
	last_signal: AtomicU64,
}

impl SpectrumFeed
{
	pub fn new() -> SpectrumFeed
	{
		SpectrumFeed {
			intensity: Default::default(),
			epoch: Instant::now(),
			last_signal: AtomicU64::new(0),
		}
	}

	pub fn publish(&self, intensity: &IntensityVector)
	{
		for (slot, &value) in self.intensity.iter().zip(intensity.iter()) {
			slot.store(value, Ordering::Relaxed);
		}
	}

	pub fn snapshot(&self) -> IntensityVector
	{
		let mut out = [0; config::NUM_BANDS];

		for (value, slot) in out.iter_mut().zip(self.intensity.iter()) {
			*value = slot.load(Ordering::Relaxed);
		}

		out
	}

	/// Record whether the block read at `now` carried any signal.
	pub fn set_audio_active(&self, active: bool, now: Instant)
	{
		let stamp = if active {
			self.micros_since_epoch(now) + 1
		} else {
			0
		};

		self.last_signal.store(stamp, Ordering::Relaxed);
	}

	pub fn is_audio_active(&self, now: Instant) -> bool
	{
		let stamp = self.last_signal.load(Ordering::Relaxed);
		if stamp == 0 {
			return false;
		}

		let silent_for = self.micros_since_epoch(now).saturating_sub(stamp - 1);
		silent_for <= config::AUDIO_TIMEOUT_MS * 1000
	}

	fn micros_since_epoch(&self, now: Instant) -> u64
	{
		now.saturating_duration_since(self.epoch).as_micros() as u64
	}
}
