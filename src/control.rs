// vim: noet

/*
 * Control channel: one datagram per parameter write.
 *
 * The first byte selects the parameter, the remaining bytes are the payload. Byte-valued
 * parameters only look at the first payload byte; sensitivity is an ASCII decimal number.
 */

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::net::UdpSocket;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::params::{ColorMode, Mode, ParameterStore, ParameterUpdate};

const MAX_PACKET_LEN: usize = 64;

// consecutive receive errors after which the listener gives up
const MAX_RECV_FAILURES: u32 = 20;
const RECV_RETRY_DELAY: Duration = Duration::from_millis(50);

const TAG_HUE: u8         = 0;
const TAG_BRIGHTNESS: u8  = 1;
const TAG_MODE: u8        = 2;
const TAG_COLOR_MODE: u8  = 3;
const TAG_SENSITIVITY: u8 = 4;

/////////// Error Type and Implementation ////////////

#[derive(Debug, PartialEq)]
pub enum ControlError
{
	EmptyPacket,
	EmptyPayload(u8),
	UnknownParameter(u8),
	InvalidMode(u8),
	InvalidColorMode(u8),
	InvalidSensitivity(String),
}

impl fmt::Display for ControlError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			ControlError::EmptyPacket => f.write_str("empty control packet")?,
			ControlError::EmptyPayload(tag) => f.write_fmt(format_args!("no value given for parameter {}", tag))?,
			ControlError::UnknownParameter(tag) => f.write_fmt(format_args!("unknown parameter {}", tag))?,
			ControlError::InvalidMode(m) => f.write_fmt(format_args!("invalid mode {}", m))?,
			ControlError::InvalidColorMode(m) => f.write_fmt(format_args!("invalid color mode {}", m))?,
			ControlError::InvalidSensitivity(s) => f.write_fmt(format_args!("invalid sensitivity {:?}", s))?,
		};

		Ok(())
	}
}

impl StdError for ControlError {}

/////////// Decoding ////////////

pub fn decode(packet: &[u8]) -> Result<ParameterUpdate, ControlError>
{
	let (&tag, payload) = packet.split_first().ok_or(ControlError::EmptyPacket)?;

	if tag == TAG_SENSITIVITY {
		return parse_sensitivity(payload).map(ParameterUpdate::Sensitivity);
	}

	let value = *payload.first().ok_or(ControlError::EmptyPayload(tag))?;

	match tag {
		TAG_HUE        => Ok(ParameterUpdate::Hue(value)),
		TAG_BRIGHTNESS => Ok(ParameterUpdate::Brightness(value)),
		TAG_MODE       => Mode::try_from(value)
		                      .map(ParameterUpdate::Mode)
		                      .map_err(ControlError::InvalidMode),
		TAG_COLOR_MODE => ColorMode::try_from(value)
		                      .map(ParameterUpdate::ColorMode)
		                      .map_err(ControlError::InvalidColorMode),
		other          => Err(ControlError::UnknownParameter(other)),
	}
}

fn parse_sensitivity(payload: &[u8]) -> Result<f32, ControlError>
{
	let text = String::from_utf8_lossy(payload);
	let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');

	if trimmed.is_empty() {
		return Err(ControlError::EmptyPayload(TAG_SENSITIVITY));
	}

	trimmed.parse::<f32>()
		.map_err(|_| ControlError::InvalidSensitivity(trimmed.to_string()))
}

/////////// UDP Listener ////////////

pub struct ControlServer
{
	socket: UdpSocket,
}

impl ControlServer
{
	pub fn bind(address: &str) -> io::Result<ControlServer>
	{
		let socket = UdpSocket::bind(address)?;

		info!("Listening for control packets on {}", socket.local_addr()?);

		Ok(ControlServer { socket })
	}

	/// Apply incoming parameter writes. Malformed packets are logged and ignored.
	///
	/// Only returns once the socket keeps failing, with the last receive error.
	pub fn run(self, params: Arc<ParameterStore>) -> io::Result<()>
	{
		let mut packet = [0u8; MAX_PACKET_LEN];
		let mut failures = 0;
		let mut last_write: Option<Instant> = None;

		loop {
			let (len, peer) = match self.socket.recv_from(&mut packet) {
				Ok(r) => r,
				Err(e) => {
					failures += 1;
					if failures >= MAX_RECV_FAILURES {
						return Err(e);
					}

					error!("Control socket receive failed ({}/{}): {}", failures, MAX_RECV_FAILURES, e);
					thread::sleep(RECV_RETRY_DELAY);
					continue;
				}
			};

			failures = 0;

			let received = Instant::now();
			if let Some(last) = last_write {
				debug!("{:?} since the previous control packet", received - last);
			}
			last_write = Some(received);

			match decode(&packet[..len]) {
				Ok(update) => {
					params.apply(update);
					debug!("{} sets {:?}, applied in {:?}", peer, update, received.elapsed());
				},
				Err(e) => warn!("Ignoring control packet from {}: {}", peer, e),
			}
		}
	}

}
