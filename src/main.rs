// vim: noet

use std::error::Error;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info, warn};

mod animation;
mod bands;
mod cli;
mod config;
mod control;
mod params;
mod pipeline;
mod scoring;
mod signal_processing;
mod udpproto;

use crate::animation::PatternAnimator;
use crate::bands::SpectrumFeed;
use crate::control::ControlServer;
use crate::params::ParameterStore;
use crate::pipeline::Analyzer;
use crate::udpproto::{LedSink, UdpProto};

fn main() -> Result<(), Box<dyn Error>>
{
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = cli::Args::parse();

	let params = Arc::new(ParameterStore::new(args.mode, args.color_mode, args.brightness, args.sensitivity));
	let feed = Arc::new(SpectrumFeed::new());

	let mut sink = UdpProto::new(&args.target, args.leds)?;

	// without a control channel the startup parameters simply stay in effect
	match ControlServer::bind(&args.control) {
		Ok(server) => {
			let params = params.clone();
			let spawned = thread::Builder::new().name("control".into()).spawn(move || {
				if let Err(e) = server.run(params) {
					error!("Control channel stopped: {}", e);
				}
			});
			if let Err(e) = spawned {
				error!("Could not start control thread: {}", e);
			}
		},
		Err(e) => warn!("Control channel on {} unavailable: {}", args.control, e),
	}

	let (sender, receiver) = pipeline::handoff();

	// if analysis does not start, the receiver is dropped and ingest stops by itself. The
	// patterns then keep running with their idle behavior.
	let analyzer = Analyzer::new(config::BLOCK_LEN, args.amplitude);
	let analysis_feed = feed.clone();
	let analysis_params = params.clone();
	if let Err(e) = thread::Builder::new()
		.name("analysis".into())
		.spawn(move || analyzer.run(receiver, analysis_feed, analysis_params)) {
		error!("Could not start spectral analysis: {}", e);
	}

	let ingest_feed = feed.clone();
	if let Err(e) = thread::Builder::new()
		.name("ingest".into())
		.spawn(move || {
			let stdin = std::io::stdin();
			if let Err(e) = pipeline::run_ingest(stdin.lock(), sender, &ingest_feed, config::BLOCK_LEN) {
				error!("Reading audio failed: {}", e);
			}
		}) {
		error!("Could not start audio ingest: {}", e);
	}

	let mut animator = PatternAnimator::new(args.leds, params.clone(), feed, rand::thread_rng(), Instant::now());

	info!("Driving {} LEDs at {}, starting with {:?}. Starting main loop…", args.leds, args.target, animator.mode());

	let frame_period = Duration::from_secs_f32(1.0 / config::FPS_ANIMATION);
	let mut next_frame = Instant::now();

	// main loop
	loop {
		let colors = animator.render(Instant::now());

		if let Err(e) = sink.show(colors, params.brightness()) {
			warn!("Could not send LED data: {}", e);
		}

		next_frame += frame_period;

		let now = Instant::now();
		if next_frame > now {
			thread::sleep(next_frame - now);
		} else {
			// running late, do not try to catch up
			next_frame = now;
		}
	}
}
