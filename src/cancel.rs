//! Cooperative cancellation for the transmit loop.
//!
//! An interrupt (Ctrl-C) must stop the carrier promptly, but the transmit loop spends nearly all
//! of its time blocked in timed waits. [`CancelToken::sleep`] is the only way the loop waits, so
//! cancelling the token wakes whichever wait is in progress and makes it, and every later wait,
//! fail with [`Cancelled`].

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::TransmitError;

/// Returned by a wait that ended because the token was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl From<Cancelled> for TransmitError {
	fn from(_: Cancelled) -> Self {
		TransmitError::Cancelled
	}
}

/// Multi-threaded cancellation flag using a condition variable.
///
/// The token cannot be reset: once [`CancelToken::cancel`] has been called, every subsequent
/// [`CancelToken::sleep`] returns immediately with [`Cancelled`].
///
/// # Examples
/// ```ignore
/// let token = CancelToken::new();
/// let handler = token.clone();
/// ctrlc::set_handler(move || handler.cancel())?;
///
/// // Blocks for one second unless Ctrl-C arrives first
/// token.sleep(Duration::from_secs(1))?;
/// ```
pub struct CancelToken {
	/// Mutex containing the flag. `true` means cancelled.
	mutex: Mutex<bool>,
	/// Condition variable to wake sleepers on cancellation.
	cond: Condvar
}

impl CancelToken {
	/// Create a new token that has not been cancelled.
	pub fn new() -> Arc<CancelToken> {
		Arc::new(CancelToken {
			mutex: Mutex::new(false),
			cond: Condvar::new()
		})
	}

	fn lock(&self) -> MutexGuard<'_, bool> {
		self.mutex.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Cancel the token, waking all sleeping threads.
	pub fn cancel(&self) {
		let mut flag = self.lock();
		*flag = true;
		self.cond.notify_all();
	}

	/// Block the current thread for `duration`, or until the token is cancelled.
	///
	/// Wakeups that are not caused by cancellation (spurious condition variable wakeups) do not
	/// shorten the wait: the remainder up to the original deadline is waited again. The deadline
	/// is measured on the monotonic clock.
	///
	/// # Errors
	///
	/// Returns [`Cancelled`] if the token was cancelled before or during the wait.
	pub fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
		let deadline = Instant::now() + duration;
		let mut cancelled = self.lock();
		loop {
			if *cancelled {
				return Err(Cancelled)
			}
			let now = Instant::now();
			if now >= deadline {
				return Ok(())
			}
			cancelled = self.cond.wait_timeout(cancelled, deadline - now)
				.unwrap_or_else(PoisonError::into_inner)
				.0;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::thread;

	#[test]
	fn sleep_test() {
		let token = CancelToken::new();
		let start = Instant::now();
		assert_eq!(token.sleep(Duration::from_millis(50)), Ok(()));
		assert!(start.elapsed() >= Duration::from_millis(50));
		assert!(!*token.lock());

		assert_eq!(token.sleep(Duration::ZERO), Ok(()));
	}

	#[test]
	fn spurious_wakeup_test() {
		let token = CancelToken::new();
		let waker = token.clone();
		let t = thread::spawn(move || {
			for _ in 0..5 {
				thread::sleep(Duration::from_millis(10));
				// Wake the sleeper without cancelling
				waker.cond.notify_all();
			}
		});

		let start = Instant::now();
		assert_eq!(token.sleep(Duration::from_millis(100)), Ok(()));
		assert!(start.elapsed() >= Duration::from_millis(100));
		t.join().unwrap();
	}

	#[test]
	fn cancel_test() {
		let token = CancelToken::new();
		let canceller = token.clone();
		let t = thread::spawn(move || {
			thread::sleep(Duration::from_millis(20));
			canceller.cancel();
		});

		let start = Instant::now();
		assert_eq!(token.sleep(Duration::from_secs(30)), Err(Cancelled));
		assert!(start.elapsed() < Duration::from_secs(10));
		assert!(*token.lock());
		t.join().unwrap();

		// Stays cancelled
		assert_eq!(token.sleep(Duration::from_secs(30)), Err(Cancelled));
		assert_eq!(TransmitError::from(Cancelled), TransmitError::Cancelled);
	}
}
