// vim: noet

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use rand::Rng;

use crate::bands::{IntensityVector, SpectrumFeed};
use crate::params::{ColorMode, Mode, ParameterStore};
use crate::scoring::linear_map;

pub mod motherships;
pub mod solid;
pub mod twinkles;

use motherships::Motherships;
use solid::Solid;
use twinkles::Twinkles;

const HUE_CYCLE_INTERVAL: Duration = Duration::from_millis(100);

/////////// Helper Structs ////////////

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Color
{
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Color
{
	pub const BLACK: Color = Color{r: 0, g: 0, b: 0};

	/// Convert an 8-bit hue (full circle = 256) plus saturation and value to RGB.
	pub fn from_hsv(hue: u8, sat: u8, val: u8) -> Color
	{
		let h = hue as f32 / 256.0 * 6.0;
		let s = sat as f32 / 255.0;
		let v = val as f32 / 255.0;

		let sector = h as u32;
		let f = h - sector as f32;

		let p = v * (1.0 - s);
		let q = v * (1.0 - f * s);
		let t = v * (1.0 - (1.0 - f) * s);

		let (r, g, b) = match sector {
			0 => (v, t, p),
			1 => (q, v, p),
			2 => (p, v, t),
			3 => (p, q, v),
			4 => (t, p, v),
			_ => (v, p, q),
		};

		Color {
			r: (r * 255.0).round() as u8,
			g: (g * 255.0).round() as u8,
			b: (b * 255.0).round() as u8,
		}
	}

	/// Scale all components by `factor / 256`, with 255 leaving the color untouched.
	pub fn scale(&mut self, factor: u8)
	{
		let f = factor as u16 + 1;

		self.r = ((self.r as u16 * f) >> 8) as u8;
		self.g = ((self.g as u16 * f) >> 8) as u8;
		self.b = ((self.b as u16 * f) >> 8) as u8;
	}

	pub fn scaled_copy(&self, factor: u8) -> Color
	{
		let mut c = *self;
		c.scale(factor);
		c
	}

	/// Dim towards black. Repeated fading always reaches black.
	pub fn fade_to_black_by(&mut self, amount: u8)
	{
		self.scale(255 - amount);
	}

	pub fn is_black(&self) -> bool
	{
		*self == Color::BLACK
	}
}

/// A periodic trigger, e.g. "every 2 seconds".
#[derive(Debug)]
pub struct Every
{
	interval: Duration,
	last: Instant,
}

impl Every
{
	/// The first trigger happens one `interval` after `now`.
	pub fn new(interval: Duration, now: Instant) -> Every
	{
		Every {
			interval,
			last: now,
		}
	}

	/// Returns true at most once per interval. Missed periods are not caught up.
	pub fn ready(&mut self, now: Instant) -> bool
	{
		if now.saturating_duration_since(self.last) >= self.interval {
			self.last = now;
			true
		} else {
			false
		}
	}
}

/// Everything a pattern may look at for one rendered frame.
pub struct Frame
{
	pub now: Instant,
	pub audio_active: bool,
	pub intensity: IntensityVector,
	pub hue: u8,
	pub color_mode: ColorMode,
}

impl Frame
{
	pub fn pixel_hue(&self, led: usize, num_leds: usize) -> u8
	{
		match self.color_mode {
			ColorMode::Rainbow => {
				let offset = linear_map(led as i64, 0, num_leds as i64 - 1, 0, 255);
				self.hue.wrapping_add(offset as u8)
			},
			ColorMode::Pick | ColorMode::Cycle => self.hue,
		}
	}

	pub fn pixel_color(&self, led: usize, num_leds: usize) -> Color
	{
		Color::from_hsv(self.pixel_hue(led, num_leds), 255, 255)
	}
}

/////////// Animation Trait ////////////

pub trait Animation {
	fn new(now: Instant) -> Self where Self: Sized;

	fn periodic<R: Rng>(&mut self, frame: &Frame, rng: &mut R, colorlist: &mut [Color]);
}

/////////// Pattern State Machine ////////////

enum Pattern
{
	Solid(Solid),
	Twinkle(Twinkles),
	Move(Motherships),
}

impl Pattern
{
	fn new(mode: Mode, now: Instant) -> Pattern
	{
		match mode {
			Mode::Solid   => Pattern::Solid(Solid::new(now)),
			Mode::Twinkle => Pattern::Twinkle(Twinkles::new(now)),
			Mode::Move    => Pattern::Move(Motherships::new(now)),
		}
	}

	fn mode(&self) -> Mode
	{
		match self {
			Pattern::Solid(_)   => Mode::Solid,
			Pattern::Twinkle(_) => Mode::Twinkle,
			Pattern::Move(_)    => Mode::Move,
		}
	}

	fn periodic<R: Rng>(&mut self, frame: &Frame, rng: &mut R, colorlist: &mut [Color])
	{
		match self {
			Pattern::Solid(p)   => p.periodic(frame, rng, colorlist),
			Pattern::Twinkle(p) => p.periodic(frame, rng, colorlist),
			Pattern::Move(p)    => p.periodic(frame, rng, colorlist),
		}
	}
}

pub struct PatternAnimator<R: Rng>
{
	pattern: Pattern,
	colorlist: Vec<Color>,
	hue_timer: Every,

	params: Arc<ParameterStore>,
	feed: Arc<SpectrumFeed>,

	rng: R,
}

impl<R: Rng> PatternAnimator<R>
{
	pub fn new(num_leds: usize, params: Arc<ParameterStore>, feed: Arc<SpectrumFeed>, rng: R, now: Instant) -> PatternAnimator<R>
	{
		PatternAnimator {
			pattern: Pattern::new(params.mode(), now),
			colorlist: vec![Color::BLACK; num_leds],
			hue_timer: Every::new(HUE_CYCLE_INTERVAL, now),
			params,
			feed,
			rng,
		}
	}

	/// Render one frame and return the resulting colors.
	pub fn render(&mut self, now: Instant) -> &[Color]
	{
		let mode = self.params.mode();
		if mode != self.pattern.mode() {
			info!("Switching pattern from {:?} to {:?}", self.pattern.mode(), mode);

			self.colorlist.iter_mut().for_each(|c| *c = Color::BLACK);
			self.pattern = Pattern::new(mode, now);
		}

		let color_mode = self.params.color_mode();
		if color_mode.cycles_hue() && self.hue_timer.ready(now) {
			self.params.advance_hue();
		}

		let frame = Frame {
			now,
			audio_active: self.feed.is_audio_active(now),
			intensity: self.feed.snapshot(),
			hue: self.params.hue(),
			color_mode,
		};

		self.pattern.periodic(&frame, &mut self.rng, &mut self.colorlist);

		&self.colorlist
	}

	pub fn mode(&self) -> Mode
	{
		self.pattern.mode()
	}
}

#[cfg(test)]
pub(crate) mod tests
{
	use super::*;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	pub fn frame(now: Instant, audio_active: bool, intensity: IntensityVector) -> Frame
	{
		Frame {
			now,
			audio_active,
			intensity,
			hue: 0,
			color_mode: ColorMode::Pick,
		}
	}

	fn animator(num_leds: usize, mode: Mode, color_mode: ColorMode, now: Instant) -> (PatternAnimator<StdRng>, Arc<ParameterStore>)
	{
		let params = Arc::new(ParameterStore::new(mode, color_mode, 255, 1.0));
		let feed = Arc::new(SpectrumFeed::new());

		let a = PatternAnimator::new(num_leds, params.clone(), feed, StdRng::seed_from_u64(7), now);

		(a, params)
	}

	#[test]
	fn hsv_primaries()
	{
		assert_eq!(Color::from_hsv(0, 255, 255), Color{r: 255, g: 0, b: 0});
		assert_eq!(Color::from_hsv(0, 0, 255), Color{r: 255, g: 255, b: 255});
		assert_eq!(Color::from_hsv(128, 255, 0), Color::BLACK);

		let green = Color::from_hsv(85, 255, 255);
		assert_eq!(green.g, 255);
		assert!(green.r < 5 && green.b == 0);
	}

	#[test]
	fn fading_reaches_black()
	{
		let mut c = Color{r: 255, g: 128, b: 1};

		c.fade_to_black_by(0);
		assert_eq!(c, Color{r: 255, g: 128, b: 1});

		for _ in 0..64 {
			c.fade_to_black_by(20);
		}
		assert!(c.is_black());
	}

	#[test]
	fn every_fires_once_per_interval()
	{
		let t0 = Instant::now();
		let mut timer = Every::new(Duration::from_secs(2), t0);

		assert!(!timer.ready(t0));
		assert!(!timer.ready(t0 + Duration::from_millis(1999)));
		assert!(timer.ready(t0 + Duration::from_secs(2)));
		assert!(!timer.ready(t0 + Duration::from_secs(3)));
		assert!(timer.ready(t0 + Duration::from_secs(10)));
	}

	#[test]
	fn rainbow_spreads_hue_over_strip()
	{
		let mut f = frame(Instant::now(), false, [0; 8]);
		f.hue = 10;
		f.color_mode = ColorMode::Rainbow;

		assert_eq!(f.pixel_hue(0, 300), 10);
		assert_eq!(f.pixel_hue(299, 300), 10u8.wrapping_add(255));
		assert_eq!(f.pixel_hue(0, 1), 10);

		f.color_mode = ColorMode::Cycle;
		assert_eq!(f.pixel_hue(299, 300), 10);
	}

	#[test]
	fn mode_switch_clears_strip()
	{
		let t0 = Instant::now();
		let (mut a, params) = animator(30, Mode::Solid, ColorMode::Pick, t0);

		assert!(a.render(t0).iter().all(|c| !c.is_black()));

		params.set_mode(Mode::Move);
		let colors = a.render(t0 + Duration::from_millis(16));

		// only the two idle clusters around positions 0 and 15 are lit
		for (i, c) in colors.iter().enumerate() {
			let lit = [29, 0, 1, 14, 15, 16].contains(&i);
			assert_eq!(!c.is_black(), lit, "led {}", i);
		}

		assert_eq!(a.mode(), Mode::Move);
	}

	#[test]
	fn stalled_audio_renders_idle_formation()
	{
		let t0 = Instant::now();
		let params = Arc::new(ParameterStore::new(Mode::Move, ColorMode::Pick, 255, 1.0));
		let feed = Arc::new(SpectrumFeed::new());

		// one loud block, then the source stops delivering data
		feed.publish(&[64; 8]);
		feed.set_audio_active(true, t0);

		let mut a = PatternAnimator::new(30, params, feed, StdRng::seed_from_u64(7), t0);
		let colors = a.render(t0 + Duration::from_secs(5));

		// idle clusters of 3 around positions 1 and 16, after one regular step
		for (i, c) in colors.iter().enumerate() {
			let lit = [0, 1, 2, 15, 16, 17].contains(&i);
			assert_eq!(!c.is_black(), lit, "led {}", i);
		}
	}

	#[test]
	fn cycling_advances_hue_every_100ms()
	{
		let t0 = Instant::now();
		let (mut a, params) = animator(4, Mode::Solid, ColorMode::Cycle, t0);

		a.render(t0 + Duration::from_millis(50));
		assert_eq!(params.hue(), 0);

		a.render(t0 + Duration::from_millis(100));
		a.render(t0 + Duration::from_millis(150));
		a.render(t0 + Duration::from_millis(200));
		assert_eq!(params.hue(), 2);

		params.set_color_mode(ColorMode::Pick);
		a.render(t0 + Duration::from_millis(1000));
		assert_eq!(params.hue(), 2);
	}
}
