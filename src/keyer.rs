//! Keying one second of the time code onto the carrier.

use std::time::Duration;

use signals::keying::Code;

use crate::cancel::Cancelled;
use crate::carrier::Carrier;
use crate::timebase::Timebase;

/// Turns slot codes into timed carrier transitions.
pub struct BitKeyer<C: Carrier> {
	carrier: C
}

impl<C: Carrier> BitKeyer<C> {
	pub fn new(carrier: C) -> BitKeyer<C> {
		BitKeyer { carrier }
	}

	pub fn carrier_mut(&mut self) -> &mut C {
		&mut self.carrier
	}

	/// Key `code` for one second, blocking until it has been sent.
	///
	/// `correction_us` lengthens (or, when negative, shortens) the trailing carrier-on pulse of
	/// the minute marker. It is ignored for every other code. A correction that would make the
	/// pulse negative shortens it to nothing.
	///
	/// # Errors
	///
	/// Returns [`Cancelled`] as soon as a wait is cancelled. The carrier is left in whatever state
	/// the interrupted pulse set.
	pub fn key<T: Timebase>(&mut self, timebase: &T, code: Code, correction_us: i64)
		-> Result<(), Cancelled>
	{
		let pulses = code.pulses();
		for (i, pulse) in pulses.iter().enumerate() {
			if pulse.on {
				self.carrier.start();
			} else {
				self.carrier.stop();
			}

			let mut micros = pulse.millis as i64 * 1000;
			if code == Code::Marker && i == pulses.len() - 1 {
				micros = (micros + correction_us).max(0);
			}
			timebase.sleep(Duration::from_micros(micros as u64))?;
		}
		Ok(())
	}
}
