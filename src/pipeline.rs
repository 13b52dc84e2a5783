// vim: noet

/*
 * Audio ingest and spectral analysis.
 *
 * The ingest side hands a window to the analysis side only when the previous window has been
 * fully processed. Anything arriving in the meantime is dropped, so memory stays bounded and the
 * analysis always works on a complete window.
 */

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use byteorder::{NativeEndian, ReadBytesExt};
use flume::{Receiver, Sender, TrySendError};
use log::{debug, error, info, trace, warn};

use crate::bands::{BandMapper, SpectrumFeed};
use crate::params::ParameterStore;
use crate::signal_processing::SignalProcessing;

#[derive(Debug, PartialEq, Eq)]
pub enum Offer
{
	Accepted,
	Dropped,
	Closed,
}

/*
 * The channel holds at most one window, but that alone would still let a second window queue
 * up while the first is being analyzed. `consumed` closes that gap: it is only set again once
 * the analysis side reports the window as done.
 */
pub struct WindowSender
{
	tx: Sender<Vec<f32>>,
	consumed: Arc<AtomicBool>,
}

pub struct WindowReceiver
{
	rx: Receiver<Vec<f32>>,
	consumed: Arc<AtomicBool>,
}

/// Create a single-slot handoff between one producer and one consumer.
pub fn handoff() -> (WindowSender, WindowReceiver)
{
	let (tx, rx) = flume::bounded(1);
	let consumed = Arc::new(AtomicBool::new(true));

	(WindowSender { tx, consumed: consumed.clone() }, WindowReceiver { rx, consumed })
}

impl WindowSender
{
	pub fn offer(&self, window: Vec<f32>) -> Offer
	{
		if !self.consumed.swap(false, Ordering::AcqRel) {
			return Offer::Dropped;
		}

		match self.tx.try_send(window) {
			Ok(()) => Offer::Accepted,
			Err(TrySendError::Full(_)) => Offer::Dropped,
			Err(TrySendError::Disconnected(_)) => Offer::Closed,
		}
	}
}

impl WindowReceiver
{
	/// Block until a window is available. Returns `None` once the sender is gone.
	pub fn recv(&self) -> Option<Vec<f32>>
	{
		self.rx.recv().ok()
	}

	/// Signal that the last received window has been processed.
	pub fn done(&self)
	{
		self.consumed.store(true, Ordering::Release);
	}
}

/// Read interleaved i16 stereo from `input` until end of stream.
///
/// Each block of `block_len` frames is downmixed and offered to the analysis side. The
/// audio-active flag follows whether the latest block contained any signal. While `input` blocks
/// without delivering data, the feed times out on its own.
pub fn run_ingest<R: Read>(mut input: R, sender: WindowSender, feed: &SpectrumFeed, block_len: usize) -> std::io::Result<()>
{
	let mut samples = vec![0i16; 2 * block_len];
	let mut dropped: u64 = 0;

	loop {
		match input.read_i16_into::<NativeEndian>(&mut samples) {
			Ok(()) => {},
			Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
				info!("End of audio stream, {} windows dropped in total.", dropped);
				feed.set_audio_active(false, Instant::now());
				return Ok(());
			},
			Err(e) => {
				feed.set_audio_active(false, Instant::now());
				return Err(e);
			}
		}

		let window = SignalProcessing::downmix_i16_stereo(&samples);
		feed.set_audio_active(!SignalProcessing::is_silent(&window), Instant::now());

		match sender.offer(window) {
			Offer::Accepted => {},
			Offer::Dropped => {
				dropped += 1;
				trace!("Analysis busy, dropping window.");
			},
			Offer::Closed => {
				warn!("Analysis is not running, stopping audio ingest.");
				feed.set_audio_active(false, Instant::now());
				return Ok(());
			}
		}
	}
}

pub struct Analyzer
{
	sigproc: SignalProcessing,
	mapper: BandMapper,
	amplitude: f32,
}

impl Analyzer
{
	pub fn new(block_len: usize, amplitude: f32) -> Analyzer
	{
		Analyzer {
			sigproc: SignalProcessing::new(block_len),
			mapper: BandMapper::new(),
			amplitude,
		}
	}

	/// Transform one mono window and publish the resulting band intensities.
	pub fn process(&mut self, window: &[f32], sensitivity: f32, feed: &SpectrumFeed) -> std::result::Result<(), Box<dyn std::error::Error>>
	{
		self.sigproc.import_mono(window)?;
		self.sigproc.update_fft()?;

		let intensity = self.mapper.update_intensity(
			self.sigproc.magnitudes(),
			self.sigproc.block_len(),
			self.amplitude,
			sensitivity);

		trace!("peaks {:?} -> intensity {:?}", self.mapper.peak(), intensity);
		feed.publish(&intensity);

		Ok(())
	}

	/// Consume windows until the ingest side goes away.
	pub fn run(mut self, receiver: WindowReceiver, feed: Arc<SpectrumFeed>, params: Arc<ParameterStore>)
	{
		debug!("Analysis started.");

		while let Some(window) = receiver.recv() {
			if let Err(e) = self.process(&window, params.sensitivity(), &feed) {
				error!("Skipping audio window: {}", e);
			}

			receiver.done();
		}

		debug!("Audio ingest closed, analysis finished.");
	}
}
