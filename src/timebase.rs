//! Sources of wall-clock time and blocking waits for the transmit loop.

use std::sync::Arc;
use std::time::Duration;

use time::TimeSpec;

use crate::cancel::{CancelToken, Cancelled};

/// A wall clock together with the means to wait on it.
///
/// Every wait the keyer and scheduler perform goes through [`Timebase::sleep`], so a timebase
/// decides both how time passes and when a run is cancelled.
pub trait Timebase {
	/// The current wall-clock time, or `None` if it cannot be read.
	fn now(&self) -> Option<TimeSpec>;

	/// Block for `duration`.
	///
	/// # Errors
	///
	/// Returns [`Cancelled`] if the run was cancelled before or during the wait.
	fn sleep(&self, duration: Duration) -> Result<(), Cancelled>;
}

/// The system realtime clock, with waits that end early on cancellation.
pub struct SystemTimebase {
	cancel: Arc<CancelToken>
}

impl SystemTimebase {
	pub fn new(cancel: Arc<CancelToken>) -> SystemTimebase {
		SystemTimebase { cancel }
	}
}

impl Timebase for SystemTimebase {
	fn now(&self) -> Option<TimeSpec> {
		time::now()
	}

	fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
		self.cancel.sleep(duration)
	}
}


#[cfg(test)]
mod tests {
	use super::simulated::SimulatedTimebase;
	use super::*;

	#[test]
	fn system_test() {
		let cancel = CancelToken::new();
		let timebase = SystemTimebase::new(cancel.clone());
		let before = timebase.now().unwrap();
		assert_eq!(timebase.sleep(Duration::from_millis(5)), Ok(()));
		assert!(timebase.now().unwrap() > before);

		cancel.cancel();
		assert_eq!(timebase.sleep(Duration::from_secs(60)), Err(Cancelled));
	}

	#[test]
	fn simulated_test() {
		let start = TimeSpec { sec: 1716742650, nsec: 999_900_000 };
		let timebase = SimulatedTimebase::new(start, Duration::from_micros(500));
		assert_eq!(timebase.now(), Some(start));
		assert_eq!(timebase.peek(), TimeSpec { sec: 1716742651, nsec: 400_000 });

		timebase.cancel_after(1);
		assert_eq!(timebase.sleep(Duration::from_millis(1500)), Ok(()));
		assert_eq!(timebase.peek(), TimeSpec { sec: 1716742652, nsec: 500_400_000 });
		assert_eq!(timebase.sleep(Duration::from_millis(1)), Err(Cancelled));
		assert_eq!(timebase.sleeps(), vec![Duration::from_millis(1500)]);
	}
}
