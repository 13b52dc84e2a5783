// vim: noet

use std::f32::consts::PI;
use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{FftError, RealFftPlanner, RealToComplex};

pub struct SignalProcessing
{
	fft_window: Vec<f32>,

	fft_input: Vec<f32>,
	fft_output: Vec<Complex<f32>>,
	fft_scratch: Vec<Complex<f32>>,

	fft_plan: Arc<dyn RealToComplex<f32>>,

	fft_absolute: Vec<f32>,
}

impl SignalProcessing
{
	fn hann_window(block_size: usize) -> Vec<f32>
	{
		let mut window = vec![0.0; block_size];

		for i in 0..block_size {
			window[i] = (PI * (i as f32) / (block_size as f32)).sin().powi(2);
		}

		window
	}

	pub fn new(block_size: usize) -> SignalProcessing
	{
		let fft_plan = RealFftPlanner::<f32>::new().plan_fft_forward(block_size);

		SignalProcessing {
			fft_window:   SignalProcessing::hann_window(block_size),
			fft_input:    fft_plan.make_input_vec(),
			fft_output:   fft_plan.make_output_vec(),
			fft_scratch:  fft_plan.make_scratch_vec(),
			fft_absolute: vec![0.0; block_size/2 + 1],
			fft_plan,
		}
	}

	pub fn block_len(&self) -> usize
	{
		self.fft_input.len()
	}

	fn apply_window(&mut self)
	{
		self.fft_input.iter_mut()
		              .zip(self.fft_window.iter())
		              .for_each(|(s, w)| *s *= w);
	}

	/// Average left and right channels of interleaved stereo data.
	///
	/// The result stays in raw PCM units so that magnitudes can be compared against the fixed noise
	/// floor.
	pub fn downmix_i16_stereo(data: &[i16]) -> Vec<f32>
	{
		data.chunks_exact(2)
			.map(|channels| (channels[0] as f32 + channels[1] as f32) / 2.0)
			.collect()
	}

	pub fn import_mono(&mut self, data: &[f32]) -> std::result::Result<(), &'static str>
	{
		if data.len() != self.fft_input.len() {
			return Err("Mono data length does not match the FFT input length.");
		}

		self.fft_input.copy_from_slice(data);

		self.apply_window();

		Ok(())
	}

	pub fn is_silent(data: &[f32]) -> bool
	{
		data.iter().all(|&s| s == 0.0)
	}

	pub fn update_fft(&mut self) -> std::result::Result<(), FftError>
	{
		self.fft_plan.process_with_scratch(&mut self.fft_input, &mut self.fft_output, &mut self.fft_scratch)?;

		for (abs_sample, c) in self.fft_absolute.iter_mut().zip(self.fft_output.iter()) {
			*abs_sample = c.norm();
		}

		Ok(())
	}

	/// Magnitude of each bin from DC up to and including Nyquist.
	pub fn magnitudes(&self) -> &[f32]
	{
		&self.fft_absolute
	}
}
