// vim: noet

use crate::animation::{Animation, Color, Frame};

use std::time::Instant;

use rand::Rng;

/// The whole strip in the current hue, or a gradient across the strip in rainbow mode.
pub struct Solid;

impl Animation for Solid
{
	fn new(_now: Instant) -> Solid
	{
		Solid
	}

	fn periodic<R: Rng>(&mut self, frame: &Frame, _rng: &mut R, colorlist: &mut [Color])
	{
		let num_leds = colorlist.len();

		for (led, color) in colorlist.iter_mut().enumerate() {
			*color = frame.pixel_color(led, num_leds);
		}
	}
}
