//! Gregorian calendar time.
//!
//! [`Tm::utc`] converts Unix timestamps to UTC calendar time without libc, so it is thread safe and
//! defined for every `i64` input. [`Tm::local`] (feature `local`) asks libc for the host's local
//! calendar time, including whether daylight saving time is in effect.

/// Seconds per minute.
const SECONDS_PER_MINUTE: i64 = 60;
/// Seconds per hour.
const SECONDS_PER_HOUR: i64 = SECONDS_PER_MINUTE * 60;
/// Seconds per day.
const SECONDS_PER_DAY: i64 = SECONDS_PER_HOUR * 24;
/// Days per week.
const DAYS_PER_WEEK: i64 = 7;
/// Days per 400-year era.
const DAYS_PER_ERA: i64 = 146097;
/// Days from March 1, 0000 to January 1, 1970.
const DAYS_FROM_MARCH_0000_TO_JAN_1970: i64 = 719468;

/// Gregorian calendar date and time.
///
/// Unlike `libc::tm`, `mon` is [1, 12] and `year` is the absolute Gregorian year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tm {
	/// Seconds, ranged [0, 59]
	pub sec: u8,
	/// Minutes, ranged [0, 59]
	pub min: u8,
	/// Hours, ranged [0, 23]
	pub hour: u8,
	/// Day of the month, ranged [1, 31]
	pub day: u8,
	/// Month of the year, ranged [1, 12]
	pub mon: u8,
	/// Absolute Gregorian calendar year
	pub year: i32,
	/// Day of the week, ranged [0, 6] => [Sunday, Saturday]
	pub wday: u8,
	/// Whether daylight saving time is in effect
	pub isdst: bool
}

impl Tm {
	/// Convert a Unix timestamp into a UTC calendar date.
	///
	/// The calendar is rotated to run March to February, which puts the leap day at the end of the
	/// rotated year, and days are then counted in 400-year eras. Euclidean division keeps the
	/// arithmetic valid before the epoch, so every input produces a date.
	///
	/// See http://howardhinnant.github.io/date_algorithms.html#civil_from_days
	///
	/// # Examples
	///
	/// ```
	/// # use time::calendar::Tm;
	/// // Saturday, July 4, 2020. 10:56:00 UTC.
	/// let t = Tm::utc(1593860160);
	/// assert_eq!((t.year, t.mon, t.day, t.hour, t.min, t.wday), (2020, 7, 4, 10, 56, 6));
	/// ```
	pub fn utc(unixtimestamp: i64) -> Tm {
		let days = unixtimestamp.div_euclid(SECONDS_PER_DAY);
		let rem = unixtimestamp.rem_euclid(SECONDS_PER_DAY);

		let z = days + DAYS_FROM_MARCH_0000_TO_JAN_1970;
		let era = z.div_euclid(DAYS_PER_ERA);
		let doe = z.rem_euclid(DAYS_PER_ERA);
		let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
		let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
		// Linear equation that calculates the month from a day of the rotated year
		let mp = (5 * doy + 2) / 153;
		let d = doy - (153 * mp + 2) / 5 + 1;
		// Convert from Mar-Feb year to Jan-Dec year
		let m = if mp < 10 { mp + 3 } else { mp - 9 };
		let y = yoe + era * 400 + (m <= 2) as i64;

		Tm {
			sec: (rem % SECONDS_PER_MINUTE) as u8,
			min: ((rem % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE) as u8,
			hour: (rem / SECONDS_PER_HOUR) as u8,
			day: d as u8,
			mon: m as u8,
			year: y as i32,
			wday: (days + 4).rem_euclid(DAYS_PER_WEEK) as u8, // Jan 1, 1970 was a Thursday
			isdst: false
		}
	}

	/// Convert a Unix timestamp into the host's local calendar time.
	///
	/// The timezone comes from the `TZ` environment variable, falling back to `/etc/localtime`, as
	/// resolved by `tzset`. Returns `None` if libc cannot represent the time.
	#[cfg(feature = "local")]
	pub fn local(unixtimestamp: i64) -> Option<Tm> {
		use core::mem::MaybeUninit;

		unsafe extern "C" {
			fn tzset();
		}

		let time = unixtimestamp as libc::time_t;
		let mut tm = MaybeUninit::<libc::tm>::uninit();
		// Safety:
		// - tzset only refreshes libc's timezone state; localtime_r does not do so on glibc
		// - localtime_r does not read tm, only writes
		// - if localtime_r returns non-null, tm is successfully initialized
		let tm = unsafe {
			tzset();
			if libc::localtime_r(&time, tm.as_mut_ptr()).is_null() {
				return None
			}
			tm.assume_init()
		};

		Some(Tm {
			sec: tm.tm_sec.min(59) as u8,
			min: tm.tm_min as u8,
			hour: tm.tm_hour as u8,
			day: tm.tm_mday as u8,
			mon: (tm.tm_mon + 1) as u8,
			year: tm.tm_year + 1900,
			wday: tm.tm_wday as u8,
			isdst: tm.tm_isdst > 0
		})
	}

	/// The year within its century, ranged [0, 99].
	#[inline(always)]
	pub fn year_of_century(&self) -> u8 {
		self.year.rem_euclid(100) as u8
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use core::mem::MaybeUninit;
	use libc::{time_t, tm};

	// Get the libc version of UTC calendar time
	fn utc_time(time: time_t) -> tm {
		unsafe {
			let mut utc = MaybeUninit::<tm>::uninit();
			libc::gmtime_r(&time, utc.as_mut_ptr());
			utc.assume_init()
		}
	}

	fn compare_dates(time: i64) {
		let d1 = utc_time(time as time_t);
		let d2 = Tm::utc(time);
		assert_eq!(d1.tm_sec, d2.sec as i32, "time: {}, sec: {} vs. {}", time, d1.tm_sec, d2.sec);
		assert_eq!(d1.tm_min, d2.min as i32, "time: {}, min: {} vs. {}", time, d1.tm_min, d2.min);
		assert_eq!(d1.tm_hour, d2.hour as i32, "time: {}, hour: {} vs. {}", time, d1.tm_hour, d2.hour);
		assert_eq!(d1.tm_mday, d2.day as i32, "time: {}, mday: {} vs. {}", time, d1.tm_mday, d2.day);
		assert_eq!(d1.tm_mon + 1, d2.mon as i32, "time: {}, mon: {} vs. {}", time, d1.tm_mon + 1, d2.mon);
		assert_eq!(d1.tm_year + 1900, d2.year, "time: {}, year: {} vs. {}", time, d1.tm_year + 1900, d2.year);
		assert_eq!(d1.tm_wday, d2.wday as i32, "time: {}, wday: {} vs. {}", time, d1.tm_wday, d2.wday);
		assert!(!d2.isdst);
	}

	#[test]
	fn utc_test() {
		compare_dates(0);
		compare_dates(5097600);
		compare_dates(17185926);
		compare_dates(31449600);
		compare_dates(94694400);
		compare_dates(951782400);  // Feb 29, 2000
		compare_dates(1718617807);
		compare_dates(1655459407);
		compare_dates(1844848207);
		compare_dates(961235407);
		compare_dates(929613007);
		compare_dates(4102444799); // Dec 31, 2099 23:59:59
		compare_dates(-1);
		compare_dates(-94694400);
		compare_dates(-2208988800); // Jan 1, 1900

		// Make sure extreme inputs cannot panic
		Tm::utc(i64::MAX);
		Tm::utc(i64::MIN);
	}

	#[test]
	#[cfg(feature = "local")]
	fn local_test() {
		for time in [0, 951782400, 1593860160, 1716742620, 1711846800, 4102444799] {
			let tm = Tm::local(time).unwrap();
			let expected = unsafe {
				// Tm::local has already loaded the timezone
				let mut local = MaybeUninit::<tm>::uninit();
				libc::localtime_r(&(time as time_t), local.as_mut_ptr());
				local.assume_init()
			};
			assert_eq!(tm.sec as i32, expected.tm_sec, "time: {}", time);
			assert_eq!(tm.min as i32, expected.tm_min, "time: {}", time);
			assert_eq!(tm.hour as i32, expected.tm_hour, "time: {}", time);
			assert_eq!(tm.day as i32, expected.tm_mday, "time: {}", time);
			assert_eq!(tm.mon as i32, expected.tm_mon + 1, "time: {}", time);
			assert_eq!(tm.year, expected.tm_year + 1900, "time: {}", time);
			assert_eq!(tm.wday as i32, expected.tm_wday, "time: {}", time);
			assert_eq!(tm.isdst, expected.tm_isdst > 0, "time: {}", time);
		}
	}

	#[test]
	fn year_of_century_test() {
		assert_eq!(Tm::utc(1593860160).year_of_century(), 20);
		assert_eq!(Tm::utc(4102444799).year_of_century(), 99);
		assert_eq!(Tm::utc(4102444800).year_of_century(), 0);
		assert_eq!(Tm::utc(-2208988800).year_of_century(), 0);
	}
}
