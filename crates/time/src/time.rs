//! Unix timestamps with nanosecond granularity, unaware of timezone.
//!
//! This module provides [`TimeSpec`], simple arithmetic on it, and (feature `now`) a helper to
//! read the current system time.
//!
//! # Examples
//!
//! ```
//! # use time::time::{Nanoseconds, Seconds, TimeSpec};
//! // Jan 1, 2025. 12:00:59.999999999 UTC.
//! let c = TimeSpec { sec: 1735732859, nsec: 999999999 };
//! assert_eq!(c.second_of_minute(), 59);
//! assert_eq!(c + Seconds(1) + Nanoseconds(1), TimeSpec { sec: 1735732861, nsec: 0 });
//! ```

use core::ops::{Add, AddAssign};
#[cfg(feature = "now")]
use core::mem::MaybeUninit;
#[cfg(feature = "now")]
use libc::{timespec, clock_gettime, CLOCK_REALTIME};

/// Nanoseconds per second.
const NANOS_PER_SEC: i64 = 1_000_000_000;
/// Nanoseconds per microsecond.
const NANOS_PER_MICRO: i64 = 1_000;
/// Microseconds per millisecond.
const MICROS_PER_MILLI: i64 = 1_000;
/// Microseconds per minute.
pub const MICROS_PER_MINUTE: i64 = 60_000_000;

/// Helper type to support math on [`TimeSpec`]s. Represents seconds.
#[repr(transparent)]
pub struct Seconds(pub i64);

/// Helper type to support math on [`TimeSpec`]s. Represents nanoseconds.
///
/// Adding nanoseconds to a [`TimeSpec`] will roll over seconds if needed, see the examples.
///
/// # Examples
///
/// ```
/// # use time::time::{Nanoseconds, TimeSpec};
/// let mut c = TimeSpec { sec: 1735732800, nsec: 999999999 };
/// assert_eq!(c + Nanoseconds(10), TimeSpec { sec: 1735732801, nsec: 9 });
/// assert_eq!(c + Nanoseconds(-1000000000), TimeSpec { sec: 1735732799, nsec: 999999999 });
/// ```
#[repr(transparent)]
pub struct Nanoseconds(pub i64);

/// Unix time with nanosecond granularity.
///
/// Supports simple addition / addition-assignment with [`Seconds`] and [`Nanoseconds`].
/// Subtraction is supported by adding negative values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSpec {
	/// Seconds since the Unix epoch
	pub sec: i64,
	/// Nanoseconds since the beginning of `sec`, ranging [0-999999999]
	pub nsec: i64
}

impl TimeSpec {
	/// Seconds within the current minute, ranged [0, 59].
	///
	/// Leap seconds are not represented by Unix time, so this never returns 60.
	#[inline(always)]
	pub fn second_of_minute(&self) -> i64 {
		self.sec.rem_euclid(60)
	}

	/// Microseconds since the beginning of `sec`, ranged [0, 999999].
	#[inline(always)]
	pub fn subsec_micros(&self) -> i64 {
		self.nsec / NANOS_PER_MICRO
	}

	/// Whole milliseconds since the beginning of `sec`, ranged [0, 999].
	#[inline(always)]
	pub fn subsec_millis(&self) -> i64 {
		self.subsec_micros() / MICROS_PER_MILLI
	}

	/// Microseconds remaining until the start of the next minute, ranged [1, 60000000].
	///
	/// Exactly on a minute boundary this returns a full minute.
	///
	/// # Examples
	///
	/// ```
	/// # use time::time::TimeSpec;
	/// let t = TimeSpec { sec: 1735732830, nsec: 500000000 };
	/// assert_eq!(t.micros_to_next_minute(), 29500000);
	/// ```
	pub fn micros_to_next_minute(&self) -> i64 {
		MICROS_PER_MINUTE - (self.second_of_minute() * 1_000_000 + self.subsec_micros())
	}
}

#[cfg(feature = "now")]
impl From<timespec> for TimeSpec {
	/// Convert from `libc::timespec` to [`TimeSpec`] for better math ergonomics
	fn from(value: timespec) -> Self {
		TimeSpec {
			sec: value.tv_sec as i64,
			nsec: value.tv_nsec as i64
		}
	}
}

impl Add<Seconds> for TimeSpec {
	type Output = Self;

	/// Add `rhs` seconds to `self`.
	fn add(mut self, rhs: Seconds) -> Self::Output {
		self.sec += rhs.0;
		self
	}
}

impl AddAssign<Seconds> for TimeSpec {
	fn add_assign(&mut self, rhs: Seconds) {
		*self = *self + rhs;
	}
}

impl Add<Nanoseconds> for TimeSpec {
	type Output = Self;

	/// Add `rhs` nanoseconds to `self`, rolling over seconds as needed to ensure `nsec` stays in
	/// the range of [0-999999999].
	fn add(mut self, rhs: Nanoseconds) -> Self::Output {
		let nsec = self.nsec + rhs.0;
		self.sec += nsec.div_euclid(NANOS_PER_SEC);
		self.nsec = nsec.rem_euclid(NANOS_PER_SEC);
		self
	}
}

impl AddAssign<Nanoseconds> for TimeSpec {
	fn add_assign(&mut self, rhs: Nanoseconds) {
		*self = *self + rhs;
	}
}

/// Get the current time as a Unix timestamp with nanosecond granularity.
///
/// This function will return `None` if `libc::clock_gettime` fails.
///
/// This function is thread safe.
///
/// # Examples
///
/// ```
/// # use time::time::now;
/// let c = now().expect("Failed to get current time");
/// assert!(c.sec > 0);
/// ```
#[cfg(feature = "now")]
pub fn now() -> Option<TimeSpec> {
	let mut time = MaybeUninit::<timespec>::uninit();
	// Safety:
	// - clock_gettime does not read time, only writes
	// - if clock_gettime returns zero, time is successfully initialized
	unsafe {
		match clock_gettime(CLOCK_REALTIME, time.as_mut_ptr()) {
			0 => Some(time.assume_init().into()),
			_ => None
		}
	}
}
