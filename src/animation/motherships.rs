// vim: noet

use crate::animation::{Animation, Color, Every, Frame};
use crate::scoring::{mothership_length, EVEN_WEIGHTS, ODD_WEIGHTS};

use std::time::{Duration, Instant};

use rand::Rng;

/// Distance between cluster centers, and the period of the scroll position.
pub const SPACING: usize = 15;

const STEP_INTERVAL : Duration = Duration::from_secs(2);
const FLIP_INTERVAL : Duration = Duration::from_secs(15);

const IDLE_FLIP_PROBABILITY : f64 = 0.25;
const IDLE_LENGTH           : u8  = 3;

// combined even + odd length that makes the clusters jump one extra step
const JUMP_THRESHOLD : u8   = 14;
const IDLE_JUMPS     : bool = false;

const FADE_ACTIVE : u8 = 40;
const FADE_IDLE   : u8 = 80;

/*
 * Clusters of lit pixels ("motherships") every SPACING pixels along the strip.
 *
 * Even and odd clusters are sized from different parts of the spectrum. The whole formation
 * scrolls one step every STEP_INTERVAL and turns around every FLIP_INTERVAL (only sometimes
 * when no music is playing). Loud passages make it jump ahead. Without music the clusters
 * shrink to IDLE_LENGTH, fade faster and never jump, so they only move on the regular step.
 */
pub struct Motherships
{
	position: usize,
	forward: bool,

	step_timer: Every,
	flip_timer: Every,
}

impl Motherships
{
	fn step(&mut self)
	{
		self.position = if self.forward {
			(self.position + 1) % SPACING
		} else {
			(self.position + SPACING - 1) % SPACING
		};
	}

	fn draw(&self, frame: &Frame, even_len: u8, odd_len: u8, colorlist: &mut [Color])
	{
		let num_leds = colorlist.len();
		let num_clusters = (num_leds + SPACING - 1) / SPACING;

		for cluster in 0..num_clusters {
			let center = (cluster * SPACING + self.position) as i64;
			let len = (if cluster % 2 == 0 { even_len } else { odd_len }) as i64;

			for offset in 0..len {
				let led = (center - len / 2 + offset).rem_euclid(num_leds as i64) as usize;
				colorlist[led] = frame.pixel_color(led, num_leds);
			}
		}
	}
}

impl Animation for Motherships
{
	fn new(now: Instant) -> Motherships
	{
		Motherships {
			position: 0,
			forward: true,
			step_timer: Every::new(STEP_INTERVAL, now),
			flip_timer: Every::new(FLIP_INTERVAL, now),
		}
	}

	fn periodic<R: Rng>(&mut self, frame: &Frame, rng: &mut R, colorlist: &mut [Color])
	{
		let (fade, even_len, odd_len) = if frame.audio_active {
			(FADE_ACTIVE,
			 mothership_length(&frame.intensity, &EVEN_WEIGHTS),
			 mothership_length(&frame.intensity, &ODD_WEIGHTS))
		} else {
			(FADE_IDLE, IDLE_LENGTH, IDLE_LENGTH)
		};

		let may_jump = frame.audio_active || IDLE_JUMPS;

		for color in colorlist.iter_mut() {
			color.fade_to_black_by(fade);
		}

		if may_jump && even_len + odd_len >= JUMP_THRESHOLD {
			self.step();
		}

		if self.step_timer.ready(frame.now) {
			self.step();
		}

		if self.flip_timer.ready(frame.now) && (frame.audio_active || rng.gen_bool(IDLE_FLIP_PROBABILITY)) {
			self.forward = !self.forward;
		}

		if colorlist.is_empty() {
			return;
		}

		self.draw(frame, even_len, odd_len, colorlist);
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::animation::tests::frame;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	fn lit(colorlist: &[Color]) -> Vec<usize>
	{
		colorlist.iter()
			.enumerate()
			.filter(|(_, c)| !c.is_black())
			.map(|(i, _)| i)
			.collect()
	}

	#[test]
	fn position_wraps_both_ways()
	{
		let mut m = Motherships::new(Instant::now());

		m.forward = false;
		m.step();
		assert_eq!(m.position, 14);

		m.forward = true;
		m.step();
		assert_eq!(m.position, 0);

		for _ in 0..SPACING {
			m.step();
		}
		assert_eq!(m.position, 0);
	}

	#[test]
	fn idle_clusters_wrap_around_strip_end()
	{
		let mut rng = StdRng::seed_from_u64(1);
		let mut colorlist = vec![Color::BLACK; 31];

		let t0 = Instant::now();
		let mut m = Motherships::new(t0);
		m.periodic(&frame(t0, false, [64; 8]), &mut rng, &mut colorlist);

		assert_eq!(lit(&colorlist), vec![0, 1, 14, 15, 16, 29, 30]);
	}

	#[test]
	fn steps_every_two_seconds()
	{
		let mut rng = StdRng::seed_from_u64(1);
		let mut colorlist = vec![Color::BLACK; 30];

		let t0 = Instant::now();
		let mut m = Motherships::new(t0);

		m.periodic(&frame(t0 + Duration::from_secs(1), false, [0; 8]), &mut rng, &mut colorlist);
		assert_eq!(m.position, 0);

		m.periodic(&frame(t0 + Duration::from_secs(2), false, [0; 8]), &mut rng, &mut colorlist);
		assert_eq!(m.position, 1);

		m.periodic(&frame(t0 + Duration::from_secs(4), false, [0; 8]), &mut rng, &mut colorlist);
		assert_eq!(m.position, 2);
	}

	#[test]
	fn turns_around_after_fifteen_seconds_with_audio()
	{
		let mut rng = StdRng::seed_from_u64(1);
		let mut colorlist = vec![Color::BLACK; 30];

		let t0 = Instant::now();
		let mut m = Motherships::new(t0);

		m.periodic(&frame(t0 + Duration::from_secs(15), true, [0; 8]), &mut rng, &mut colorlist);
		assert_eq!(m.position, 1);
		assert!(!m.forward);

		m.periodic(&frame(t0 + Duration::from_secs(17), true, [0; 8]), &mut rng, &mut colorlist);
		assert_eq!(m.position, 0);

		m.periodic(&frame(t0 + Duration::from_secs(19), true, [0; 8]), &mut rng, &mut colorlist);
		assert_eq!(m.position, 14);
	}

	#[test]
	fn idle_turns_around_only_sometimes()
	{
		let mut rng = StdRng::seed_from_u64(11);
		let mut colorlist = vec![Color::BLACK; 30];

		let t0 = Instant::now();
		let mut m = Motherships::new(t0);
		let mut flips = 0;
		let mut forward = m.forward;

		for i in 1..=400 {
			m.periodic(&frame(t0 + Duration::from_secs(15 * i), false, [0; 8]), &mut rng, &mut colorlist);
			if m.forward != forward {
				flips += 1;
				forward = m.forward;
			}
		}

		assert!(flips > 50 && flips < 150, "{} flips", flips);
	}

	#[test]
	fn loud_audio_jumps_and_grows_clusters()
	{
		let mut rng = StdRng::seed_from_u64(1);
		let mut colorlist = vec![Color::BLACK; 30];

		let t0 = Instant::now();
		let mut m = Motherships::new(t0);
		m.periodic(&frame(t0 + Duration::from_millis(16), true, [13; 8]), &mut rng, &mut colorlist);

		assert_eq!(m.position, 1);
		// two clusters of 10 around 1 and 16
		assert_eq!(lit(&colorlist), (0..=5).chain(11..=20).chain(26..30).collect::<Vec<_>>());
	}

	#[test]
	fn idle_formation_never_jumps()
	{
		let mut rng = StdRng::seed_from_u64(1);
		let mut colorlist = vec![Color::BLACK; 30];

		let t0 = Instant::now();
		let mut m = Motherships::new(t0);

		// loud but stale data must not push the idle formation ahead
		for i in 1..100 {
			m.periodic(&frame(t0 + Duration::from_millis(16 * i), false, [64; 8]), &mut rng, &mut colorlist);
		}

		assert_eq!(m.position, 0);
		assert_eq!(lit(&colorlist), vec![0, 1, 14, 15, 16, 29]);
	}

	#[test]
	fn quiet_audio_draws_single_pixels()
	{
		let mut rng = StdRng::seed_from_u64(1);
		let mut colorlist = vec![Color::BLACK; 30];

		let t0 = Instant::now();
		let mut m = Motherships::new(t0);
		m.periodic(&frame(t0, true, [0; 8]), &mut rng, &mut colorlist);

		assert_eq!(m.position, 0);
		assert_eq!(lit(&colorlist), vec![0, 15]);
	}
}
