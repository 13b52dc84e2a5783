// vim: noet

/*
 * Live parameters written by the control channel and read by the analysis and render loops.
 *
 * Writers and readers are not synchronized with each other. Every value is a single atomic
 * cell, so a reader sees either the old or the new value, but a group of parameters written
 * together may be observed half-updated for one frame.
 */

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::config;

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode
{
	Solid,
	Twinkle,
	Move,
}

impl TryFrom<u8> for Mode
{
	type Error = u8;

	fn try_from(value: u8) -> Result<Mode, u8>
	{
		match value {
			0 => Ok(Mode::Solid),
			1 => Ok(Mode::Twinkle),
			2 => Ok(Mode::Move),
			other => Err(other),
		}
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode
{
	Pick,
	Cycle,
	Rainbow,
}

impl ColorMode
{
	/// Whether the global hue advances on its own in this mode.
	pub fn cycles_hue(self) -> bool
	{
		matches!(self, ColorMode::Cycle | ColorMode::Rainbow)
	}
}

impl TryFrom<u8> for ColorMode
{
	type Error = u8;

	fn try_from(value: u8) -> Result<ColorMode, u8>
	{
		match value {
			0 => Ok(ColorMode::Pick),
			1 => Ok(ColorMode::Cycle),
			2 => Ok(ColorMode::Rainbow),
			other => Err(other),
		}
	}
}

/// A single write to one of the live parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ParameterUpdate
{
	Hue(u8),
	Brightness(u8),
	Mode(Mode),
	ColorMode(ColorMode),
	Sensitivity(f32),
}

pub struct ParameterStore
{
	hue:         AtomicU8,
	brightness:  AtomicU8,
	mode:        AtomicU8,
	color_mode:  AtomicU8,
	sensitivity: AtomicU32, // f32 bits
}

impl ParameterStore
{
	pub fn new(mode: Mode, color_mode: ColorMode, brightness: u8, sensitivity: f32) -> ParameterStore
	{
		let p = ParameterStore {
			hue:         AtomicU8::new(0),
			brightness:  AtomicU8::new(brightness),
			mode:        AtomicU8::new(mode as u8),
			color_mode:  AtomicU8::new(color_mode as u8),
			sensitivity: AtomicU32::new(0),
		};

		p.set_sensitivity(sensitivity);

		p
	}

	pub fn apply(&self, update: ParameterUpdate)
	{
		match update {
			ParameterUpdate::Hue(h)         => self.set_hue(h),
			ParameterUpdate::Brightness(b)  => self.set_brightness(b),
			ParameterUpdate::Mode(m)        => self.set_mode(m),
			ParameterUpdate::ColorMode(c)   => self.set_color_mode(c),
			ParameterUpdate::Sensitivity(s) => self.set_sensitivity(s),
		}
	}

	pub fn set_hue(&self, hue: u8)
	{
		self.hue.store(hue, Ordering::Relaxed);
	}

	pub fn hue(&self) -> u8
	{
		self.hue.load(Ordering::Relaxed)
	}

	/// Step the global hue by one, wrapping at 256.
	pub fn advance_hue(&self)
	{
		// fetch_add on AtomicU8 wraps
		self.hue.fetch_add(1, Ordering::Relaxed);
	}

	pub fn set_brightness(&self, brightness: u8)
	{
		self.brightness.store(brightness, Ordering::Relaxed);
	}

	pub fn brightness(&self) -> u8
	{
		self.brightness.load(Ordering::Relaxed)
	}

	/// Buffer clearing on a mode change is done by the animator when it observes the new mode.
	pub fn set_mode(&self, mode: Mode)
	{
		self.mode.store(mode as u8, Ordering::Relaxed);
	}

	pub fn mode(&self) -> Mode
	{
		Mode::try_from(self.mode.load(Ordering::Relaxed)).unwrap_or(Mode::Solid)
	}

	pub fn set_color_mode(&self, color_mode: ColorMode)
	{
		self.color_mode.store(color_mode as u8, Ordering::Relaxed);
	}

	pub fn color_mode(&self) -> ColorMode
	{
		ColorMode::try_from(self.color_mode.load(Ordering::Relaxed)).unwrap_or(ColorMode::Pick)
	}

	pub fn set_sensitivity(&self, sensitivity: f32)
	{
		// NaN would slip through clamp()
		let s = if sensitivity.is_nan() {
			config::MIN_SENSITIVITY
		} else {
			sensitivity.clamp(config::MIN_SENSITIVITY, config::MAX_SENSITIVITY)
		};

		self.sensitivity.store(s.to_bits(), Ordering::Relaxed);
	}

	pub fn sensitivity(&self) -> f32
	{
		f32::from_bits(self.sensitivity.load(Ordering::Relaxed))
	}
}

impl Default for ParameterStore
{
	fn default() -> ParameterStore
	{
		ParameterStore::new(Mode::Solid, ColorMode::Pick, config::DEFAULT_BRIGHTNESS, config::DEFAULT_SENSITIVITY)
	}
}
