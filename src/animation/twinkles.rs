// vim: noet

use crate::animation::{Animation, Color, Frame};
use crate::scoring::num_to_twinkle;

use std::time::Instant;

use log::trace;
use rand::Rng;

// per-frame fade amounts (out of 255). More sustain while music is playing.
const FADE_ACTIVE : u8 = 16;
const FADE_IDLE   : u8 = 48;

// percentage of candidate pixels that actually light up
const ACCEPT_PERCENT_ACTIVE : u32 = 60;
const ACCEPT_PERCENT_IDLE   : u32 = 25;

const IDLE_CANDIDATES : usize = 2;

/*
 * Random pixels light up and slowly fade out.
 *
 * A candidate pixel only lights if it has already faded to black, so a pixel is never re-lit
 * while it still glows. On top of that, each candidate must pass a random acceptance check.
 */
pub struct Twinkles
{
	// pixels lit in the last frame
	ignited: usize,
}

impl Animation for Twinkles
{
	fn new(_now: Instant) -> Twinkles
	{
		Twinkles {
			ignited: 0,
		}
	}

	fn periodic<R: Rng>(&mut self, frame: &Frame, rng: &mut R, colorlist: &mut [Color])
	{
		let (fade, candidates, accept_percent) = if frame.audio_active {
			(FADE_ACTIVE, num_to_twinkle(&frame.intensity), ACCEPT_PERCENT_ACTIVE)
		} else {
			(FADE_IDLE, IDLE_CANDIDATES, ACCEPT_PERCENT_IDLE)
		};

		for color in colorlist.iter_mut() {
			color.fade_to_black_by(fade);
		}

		self.ignited = 0;

		let num_leds = colorlist.len();
		if num_leds == 0 {
			return;
		}

		for _i in 0 .. candidates {
			let led = rng.gen_range(0..num_leds);

			if !colorlist[led].is_black() {
				continue;
			}

			if rng.gen_range(0..100) >= accept_percent {
				continue;
			}

			colorlist[led] = frame.pixel_color(led, num_leds);
			self.ignited += 1;
		}

		trace!("twinkle: {} of {} candidates lit", self.ignited, candidates);
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::animation::tests::frame;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	const WHITE: Color = Color{r: 255, g: 255, b: 255};

	#[test]
	fn loud_audio_lights_many_pixels()
	{
		let mut rng = StdRng::seed_from_u64(3);
		let mut colorlist = vec![Color::BLACK; 300];

		let f = frame(Instant::now(), true, [12; 8]);
		let mut twinkles = Twinkles::new(f.now);
		twinkles.periodic(&f, &mut rng, &mut colorlist);

		let lit = colorlist.iter().filter(|c| !c.is_black()).count();
		assert_eq!(lit, twinkles.ignited);
		assert!(lit > 100, "only {} pixels lit", lit);
		assert!(colorlist.iter().all(|&c| c.is_black() || c == Color::from_hsv(0, 255, 255)));
	}

	#[test]
	fn quiet_audio_lights_at_most_one()
	{
		let mut rng = StdRng::seed_from_u64(3);
		let mut colorlist = vec![Color::BLACK; 300];

		let f = frame(Instant::now(), true, [0; 8]);
		let mut twinkles = Twinkles::new(f.now);

		for _ in 0..20 {
			twinkles.periodic(&f, &mut rng, &mut colorlist);
			assert!(twinkles.ignited <= 1);
		}
	}

	#[test]
	fn glowing_pixels_are_not_relit()
	{
		let mut rng = StdRng::seed_from_u64(5);
		let mut colorlist = vec![WHITE; 50];

		let f = frame(Instant::now(), true, [64; 8]);
		let mut twinkles = Twinkles::new(f.now);
		twinkles.periodic(&f, &mut rng, &mut colorlist);

		assert_eq!(twinkles.ignited, 0);
		assert!(colorlist.iter().all(|&c| c == WHITE.scaled_copy(255 - FADE_ACTIVE)));
	}

	#[test]
	fn idle_fades_faster()
	{
		let mut rng = StdRng::seed_from_u64(5);
		let mut active = vec![WHITE; 8];
		let mut idle = vec![WHITE; 8];

		let now = Instant::now();
		Twinkles::new(now).periodic(&frame(now, true, [0; 8]), &mut rng, &mut active);
		Twinkles::new(now).periodic(&frame(now, false, [0; 8]), &mut rng, &mut idle);

		assert!(idle[0].r < active[0].r);
	}

	#[test]
	fn empty_strip_is_fine()
	{
		let mut rng = StdRng::seed_from_u64(5);
		let f = frame(Instant::now(), true, [64; 8]);

		Twinkles::new(f.now).periodic(&f, &mut rng, &mut []);
	}
}
