// vim: noet

// definitions for the FFT
pub const BLOCK_LEN: usize = 512;

// spectral analysis
pub const NUM_BANDS: usize      = 8;
pub const NOISE_FLOOR: f32      = 2000.0;
pub const INTENSITY_MAX: i64    = 64;
pub const DEFAULT_AMPLITUDE: f32 = 600.0;

// audio counts as gone when no block with signal arrived for this long (about 20 blocks at 44.1 kHz)
pub const AUDIO_TIMEOUT_MS: u64 = 250;

pub const DEFAULT_SENSITIVITY: f32 = 0.2;
pub const MIN_SENSITIVITY: f32     = 0.1;
pub const MAX_SENSITIVITY: f32     = 10.0;

// LED configuration
pub const NUM_LEDS: usize      = 300;
pub const DEFAULT_BRIGHTNESS: u8 = 5;

// animation timing
pub const FPS_ANIMATION: f32 = 60.0;

// network configuration
pub const UDP_SERVER_ADDR: &str   = "192.168.23.118:21324";
pub const CONTROL_BIND_ADDR: &str = "0.0.0.0:2704";
