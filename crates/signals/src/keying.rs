//! The MSF carrier keying protocol.
//!
//! Every second of an MSF minute starts with the carrier switched off. How long it stays off,
//! and whether it briefly comes back on, tells a receiver which of five symbols is being sent:
//!
//! | Code     | Carrier (ms)                        |
//! | -------- | ----------------------------------- |
//! | Marker   | off 500, on 500                     |
//! | `00`     | off 100, on 900                     |
//! | `01`     | off 100, on 100, off 100, on 700    |
//! | `10`     | off 200, on 800                     |
//! | `11`     | off 300, on 700                     |
//!
//! Read differently, the carrier is always off for 0-100 ms, off for 100-200 ms when bit A is
//! set, and off for 200-300 ms when bit B is set. The marker is the only symbol that stays off
//! past 300 ms.

/// One carrier state held for a fixed time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pulse {
	/// Whether the carrier is on during this pulse.
	pub on: bool,
	/// Length of the pulse in milliseconds.
	pub millis: u16
}

impl Pulse {
	const fn off(millis: u16) -> Pulse {
		Pulse { on: false, millis }
	}

	const fn on(millis: u16) -> Pulse {
		Pulse { on: true, millis }
	}
}

const MARKER: [Pulse; 2] = [Pulse::off(500), Pulse::on(500)];
const BITS_00: [Pulse; 2] = [Pulse::off(100), Pulse::on(900)];
const BITS_01: [Pulse; 4] = [Pulse::off(100), Pulse::on(100), Pulse::off(100), Pulse::on(700)];
const BITS_10: [Pulse; 2] = [Pulse::off(200), Pulse::on(800)];
const BITS_11: [Pulse; 2] = [Pulse::off(300), Pulse::on(700)];

/// A symbol keyed in one second of the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Code {
	/// Start of minute.
	Marker,
	/// A=0, B=0.
	Bits00,
	/// A=0, B=1.
	Bits01,
	/// A=1, B=0.
	Bits10,
	/// A=1, B=1.
	Bits11
}

impl Code {
	/// The code for a slot's A and B bits.
	///
	/// # Examples
	///
	/// ```
	/// # use signals::keying::Code;
	/// assert_eq!(Code::from_bits(true, false), Code::Bits10);
	/// assert_eq!(Code::from_bits(false, true), Code::Bits01);
	/// ```
	pub fn from_bits(a: bool, b: bool) -> Code {
		match ((a as u8) << 1) | b as u8 {
			0b00 => Code::Bits00,
			0b01 => Code::Bits01,
			0b10 => Code::Bits10,
			_ => Code::Bits11
		}
	}

	/// The carrier pulses for this code, in order. They always add up to one second.
	pub fn pulses(&self) -> &'static [Pulse] {
		match self {
			Code::Marker => &MARKER,
			Code::Bits00 => &BITS_00,
			Code::Bits01 => &BITS_01,
			Code::Bits10 => &BITS_10,
			Code::Bits11 => &BITS_11
		}
	}
}
