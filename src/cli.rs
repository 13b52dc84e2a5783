// vim: noet

use clap::builder::TypedValueParser;
use clap::Parser;

use crate::config;
use crate::params::{ColorMode, Mode};

/// Audio-reactive LED strip driver. Reads interleaved 16-bit stereo PCM from stdin.
#[derive(Parser, Debug)]
#[command(name = "elephantlight", long_about = None)]
pub struct Args
{
	/// Address of the WLED controller receiving realtime UDP packets
	#[arg(long, default_value = config::UDP_SERVER_ADDR)]
	pub target: String,

	/// Number of LEDs on the strip
	#[arg(long, default_value_t = config::NUM_LEDS,
	      value_parser = clap::value_parser!(u16).range(1..=crate::udpproto::MAX_LEDS as i64).map(usize::from))]
	pub leds: usize,

	/// Local address for incoming control packets
	#[arg(long, default_value = config::CONTROL_BIND_ADDR)]
	pub control: String,

	/// Expected peak magnitude; sets the top of the intensity scale
	#[arg(long, default_value_t = config::DEFAULT_AMPLITUDE, value_parser = parse_amplitude)]
	pub amplitude: f32,

	/// Initial sensitivity, clamped to 0.1 ..= 10.0
	#[arg(long, default_value_t = config::DEFAULT_SENSITIVITY)]
	pub sensitivity: f32,

	/// Initial brightness passed to the LED controller
	#[arg(long, default_value_t = config::DEFAULT_BRIGHTNESS)]
	pub brightness: u8,

	/// Initial animation pattern
	#[arg(long, value_enum, default_value_t = Mode::Solid)]
	pub mode: Mode,

	/// Initial hue derivation
	#[arg(long, value_enum, default_value_t = ColorMode::Pick)]
	pub color_mode: ColorMode,
}

// below 1 the intensity scale collapses and every band reads 0
fn parse_amplitude(arg: &str) -> Result<f32, String>
{
	let amplitude: f32 = arg.parse().map_err(|e| format!("{}", e))?;

	if amplitude >= 1.0 {
		Ok(amplitude)
	} else {
		Err(format!("amplitude must be at least 1, got {}", arg))
	}
}
