// vim: noet

/*
 * LED output via the WLED realtime UDP protocol (DRGB mode).
 */

use std::net::UdpSocket;
use std::net::SocketAddrV4;
use std::net::Ipv4Addr;

use crate::animation::Color;

// DRGB supports up to 490 LEDs in a single packet
pub const MAX_LEDS: usize = 490;
const TIMEOUT_SEC: u8 = 3;
const WLED_MODE_DRGB: u8 = 2;

/// Receiver of one complete color buffer per animation tick.
pub trait LedSink
{
	fn show(&mut self, colors: &[Color], brightness: u8) -> std::io::Result<()>;
}

pub struct UdpProto
{
	socket:        UdpSocket,
	packet:        Vec<u8>,
}

impl UdpProto
{
	pub fn new(target_address: &str, num_leds_total: usize) -> std::io::Result<UdpProto>
	{
		if num_leds_total > MAX_LEDS {
			return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "Too many LEDs for a single DRGB packet"));
		}

		let mut u = UdpProto {
			socket: UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))?,
			packet: vec![0; 2 + 3*num_leds_total],
		};

		u.packet[0] = WLED_MODE_DRGB;
		u.packet[1] = TIMEOUT_SEC;

		u.socket.connect(target_address)?;

		Ok(u)
	}

	pub fn set_color(&mut self, led: usize, color: &Color) -> std::io::Result<()>
	{
		let offset = 2 + 3*led;
		if offset + 3 > self.packet.len() {
			Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "LED index out of range"))
		}
		else {
			self.packet[offset + 0] = color.r;
			self.packet[offset + 1] = color.g;
			self.packet[offset + 2] = color.b;
			Ok( () )
		}
	}

	pub fn commit(&mut self) -> std::io::Result<()>
	{
		self.socket.send(&self.packet)?;
		Ok( () )
	}
}

impl LedSink for UdpProto
{
	fn show(&mut self, colors: &[Color], brightness: u8) -> std::io::Result<()>
	{
		for (led, color) in colors.iter().enumerate() {
			self.set_color(led, &color.scaled_copy(brightness))?;
		}

		self.commit()
	}
}
