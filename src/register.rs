//! BCM2835 general-purpose clock and GPIO registers.
//!
//! Register contents are modelled as plain structs with explicit [`pack`](ClockControl::pack)
//! and [`unpack`](ClockControl::unpack) routines to and from the 32-bit register word. Writes to
//! clock manager registers are ignored by the hardware unless bits 31-24 hold [`PASSWORD`], so
//! every packed clock word carries it.
//!
//! Addresses are VideoCore bus addresses (`0x7Exxxxxx`), as printed in the BCM2835 peripherals
//! datasheet. The ARM physical address is `peripheral base + (bus address - BUS_BASE)`.

/// Bus address of the start of the peripheral block.
pub const BUS_BASE: u32 = 0x7E00_0000;
/// Length of the peripheral block mapped from the peripheral base.
pub const PERIPHERAL_SPAN: usize = 0x0100_0000;

/// GPIO function select for pins 0-9.
pub const GPFSEL0: u32 = 0x7E20_0000;
/// General-purpose clock 0 control.
pub const CM_GP0CTL: u32 = 0x7E10_1070;
/// General-purpose clock 0 divisor.
pub const CM_GP0DIV: u32 = 0x7E10_1074;

/// Clock manager password, bits 31-24 of every clock manager write.
pub const PASSWORD: u32 = 0x5A;

/// GPIO pin carrying GPCLK0 on alternate function 0 (header pin 7).
pub const GPCLK0_PIN: u32 = 4;

/// Clock source selection, bits 3-0 of `CM_GPxCTL`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ClockSource {
	Ground = 0,
	/// 19.2 MHz crystal oscillator.
	Oscillator = 1,
	TestDebug0 = 2,
	TestDebug1 = 3,
	PllA = 4,
	PllC = 5,
	PllD = 6,
	HdmiAux = 7
}

impl ClockSource {
	fn from_bits(bits: u32) -> ClockSource {
		match bits & 0xF {
			1 => ClockSource::Oscillator,
			2 => ClockSource::TestDebug0,
			3 => ClockSource::TestDebug1,
			4 => ClockSource::PllA,
			5 => ClockSource::PllC,
			6 => ClockSource::PllD,
			7 => ClockSource::HdmiAux,
			_ => ClockSource::Ground
		}
	}
}

/// Contents of a `CM_GPxCTL` register.
///
/// | Bits  | Field  |
/// | ----- | ------ |
/// | 3-0   | SRC    |
/// | 4     | ENAB   |
/// | 5     | KILL   |
/// | 7     | BUSY   |
/// | 8     | FLIP   |
/// | 10-9  | MASH   |
/// | 31-24 | PASSWD |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockControl {
	pub src: ClockSource,
	/// Clock generator running.
	pub enab: bool,
	/// Stop the generator immediately.
	pub kill: bool,
	/// Generator is running (read only).
	pub busy: bool,
	/// Invert the output.
	pub flip: bool,
	/// MASH noise-shaping stages, ranged [0, 3].
	pub mash: u8
}

impl ClockControl {
	const ENAB: u32 = 1 << 4;
	const KILL: u32 = 1 << 5;
	const BUSY: u32 = 1 << 7;
	const FLIP: u32 = 1 << 8;
	const MASH_SHIFT: u32 = 9;

	/// Pack into a register word, including the password.
	///
	/// # Examples
	///
	/// ```ignore
	/// let ctl = ClockControl { src: ClockSource::Oscillator, enab: true, kill: false, busy: false, flip: false, mash: 0 };
	/// assert_eq!(ctl.pack(), 0x5A00_0011);
	/// ```
	pub fn pack(&self) -> u32 {
		PASSWORD << 24
			| (self.mash as u32 & 0x3) << Self::MASH_SHIFT
			| if self.flip { Self::FLIP } else { 0 }
			| if self.busy { Self::BUSY } else { 0 }
			| if self.kill { Self::KILL } else { 0 }
			| if self.enab { Self::ENAB } else { 0 }
			| self.src as u32
	}

	/// Unpack a register word. The password and reserved bits are ignored.
	pub fn unpack(word: u32) -> ClockControl {
		ClockControl {
			src: ClockSource::from_bits(word),
			enab: word & Self::ENAB != 0,
			kill: word & Self::KILL != 0,
			busy: word & Self::BUSY != 0,
			flip: word & Self::FLIP != 0,
			mash: ((word >> Self::MASH_SHIFT) & 0x3) as u8
		}
	}
}

/// Contents of a `CM_GPxDIV` register. The output frequency is `source / (divi + divf / 4096)`.
///
/// | Bits  | Field  |
/// | ----- | ------ |
/// | 11-0  | DIVF   |
/// | 23-12 | DIVI   |
/// | 31-24 | PASSWD |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockDivisor {
	/// Integer part, ranged [1, 4095].
	pub divi: u16,
	/// Fractional part in 1/4096ths, ranged [0, 4095].
	pub divf: u16
}

impl ClockDivisor {
	/// Pack into a register word, including the password.
	pub fn pack(&self) -> u32 {
		PASSWORD << 24 | (self.divi as u32 & 0xFFF) << 12 | (self.divf as u32 & 0xFFF)
	}

	/// Unpack a register word. The password is ignored.
	pub fn unpack(word: u32) -> ClockDivisor {
		ClockDivisor {
			divi: ((word >> 12) & 0xFFF) as u16,
			divf: (word & 0xFFF) as u16
		}
	}
}

/// GPIO pin function, as encoded in the 3-bit `GPFSELn` fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum PinFunction {
	/// Alternate function 0, GPCLK0 on GPIO4.
	Alt0 = 0b100
}

/// Bus address of the `GPFSELn` register holding `pin`'s function.
pub fn function_select_register(pin: u32) -> u32 {
	GPFSEL0 + (pin / 10) * 4
}

/// Replace `pin`'s 3-bit field in the `GPFSELn` word `word` with `function`.
///
/// # Examples
///
/// ```ignore
/// // GPIO4 to alternate function 0 (GPCLK0)
/// assert_eq!(set_pin_function(0, 4, PinFunction::Alt0), 0b100 << 12);
/// ```
pub fn set_pin_function(word: u32, pin: u32, function: PinFunction) -> u32 {
	let shift = (pin % 10) * 3;
	(word & !(0b111 << shift)) | (function as u32) << shift
}
