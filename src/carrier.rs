//! The 60 kHz carrier and the ways of switching it.
//!
//! [`GpioClock`] drives the BCM2835 general-purpose clock 0, which outputs on GPIO4 (header pin
//! 7). Dividing the 19.2 MHz crystal oscillator by 320 gives the 60 kHz MSF carrier, and the
//! generator's enable bit keys it on and off. [`DryRun`] stands in for the hardware on any host.

use std::thread;
use std::time::Duration;

use log::{debug, trace};

use crate::mmio::RegisterBlock;
use crate::register::{
	self, ClockControl, ClockDivisor, ClockSource, PinFunction, CM_GP0CTL, CM_GP0DIV, GPCLK0_PIN
};

/// A binary actuator: the carrier is either on or off.
pub trait Carrier {
	/// Switch the carrier on.
	fn start(&mut self);
	/// Switch the carrier off.
	fn stop(&mut self);
}

impl<C: Carrier + ?Sized> Carrier for Box<C> {
	fn start(&mut self) {
		(**self).start()
	}

	fn stop(&mut self) {
		(**self).stop()
	}
}

/// Settling time after each clock manager write during setup.
const SETUP_DELAY: Duration = Duration::from_micros(100);

/// Configuration of a general-purpose clock generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockConfig {
	pub src: ClockSource,
	pub mash: u8,
	pub divi: u16,
	pub divf: u16
}

impl ClockConfig {
	/// 60 kHz from the 19.2 MHz oscillator with an integer divisor.
	pub const MSF: ClockConfig = ClockConfig {
		src: ClockSource::Oscillator,
		mash: 0,
		divi: 320,
		divf: 0
	};
}

/// GPCLK0 as a carrier.
pub struct GpioClock<R: RegisterBlock> {
	regs: R
}

impl<R: RegisterBlock> GpioClock<R> {
	/// Route GPCLK0 to GPIO4 and program the generator with `config`.
	///
	/// The generator is left disabled; [`Carrier::start`] enables it.
	pub fn setup(mut regs: R, config: ClockConfig) -> GpioClock<R> {
		let fsel = register::function_select_register(GPCLK0_PIN);
		let word = register::set_pin_function(regs.read32(fsel), GPCLK0_PIN, PinFunction::Alt0);
		regs.write32(fsel, word);

		let ctl = ClockControl {
			src: config.src,
			enab: false,
			kill: false,
			busy: false,
			flip: false,
			mash: config.mash
		};
		regs.write32(CM_GP0CTL, ctl.pack());
		thread::sleep(SETUP_DELAY);

		let div = ClockDivisor { divi: config.divi, divf: config.divf };
		regs.write32(CM_GP0DIV, div.pack());
		thread::sleep(SETUP_DELAY);

		debug!("GPCLK0 configured: {:?}, divisor {}+{}/4096", config.src, config.divi, config.divf);
		GpioClock { regs }
	}

	fn set_enabled(&mut self, enab: bool) {
		let ctl = ClockControl::unpack(self.regs.read32(CM_GP0CTL));
		// BUSY is read only, KILL would glitch the output
		self.regs.write32(CM_GP0CTL, ClockControl { enab, busy: false, kill: false, ..ctl }.pack());
	}
}

impl<R: RegisterBlock> Carrier for GpioClock<R> {
	fn start(&mut self) {
		self.set_enabled(true);
	}

	fn stop(&mut self) {
		self.set_enabled(false);
	}
}

/// A carrier that only logs its transitions.
#[derive(Default)]
pub struct DryRun {
	on: bool
}

impl Carrier for DryRun {
	fn start(&mut self) {
		if !self.on {
			trace!("Carrier on");
		}
		self.on = true;
	}

	fn stop(&mut self) {
		if self.on {
			trace!("Carrier off");
		}
		self.on = false;
	}
}
