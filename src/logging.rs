//! Logger setup and log formatting helpers.

use std::fmt;
use std::sync::Once;

use log::LevelFilter;
use time::{TimeSpec, Tm};

static INIT: Once = Once::new();

/// The level used when `RUST_LOG` is not set.
pub fn default_level(verbose: bool) -> LevelFilter {
	if verbose { LevelFilter::Debug } else { LevelFilter::Info }
}

/// Initialize the global logger once. Later calls are ignored.
///
/// `RUST_LOG` takes precedence over `verbose` when set.
pub fn init(verbose: bool) {
	INIT.call_once(|| {
		let mut builder = env_logger::Builder::new();
		match std::env::var("RUST_LOG") {
			Ok(filter) => builder.parse_filters(&filter),
			Err(_) => builder.filter_level(default_level(verbose))
		};
		builder.format_target(false).init();
		log::debug!("logging initialized");
	});
}

const WEEKDAYS: [&str; 7] = ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];
const MONTHS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// Displays a [`TimeSpec`] in local time with microseconds, e.g.
/// `Sunday May 26 2024 17:57:00.000123`.
pub struct Timestamp(pub TimeSpec);

impl Timestamp {
	fn write(f: &mut fmt::Formatter<'_>, tm: &Tm, micros: i64) -> fmt::Result {
		write!(f, "{} {} {:02} {} {:02}:{:02}:{:02}.{:06}",
			WEEKDAYS[tm.wday as usize % 7], MONTHS[(tm.mon as usize + 11) % 12], tm.day, tm.year,
			tm.hour, tm.min, tm.sec, micros)
	}
}

impl fmt::Display for Timestamp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let tm = Tm::local(self.0.sec).unwrap_or_else(|| Tm::utc(self.0.sec));
		Timestamp::write(f, &tm, self.0.subsec_micros())
	}
}
