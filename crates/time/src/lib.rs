//! Utilities for dealing with time.
//!
//! This crate is divided into two halves: [`time`] deals with Unix timestamps at nanosecond
//! granularity and reading the system clock; [`calendar`] converts Unix timestamps into Gregorian
//! calendar time, either in UTC (pure Rust, thread safe, total) or in the host's local timezone
//! (via libc, honouring `TZ` and `/etc/localtime`).
//!
//! By default this crate is `no_std` and only the pure conversions are available. Feature `now`
//! enables [`time::now`], and feature `local` enables [`calendar::Tm::local`].
//!
//! # Examples
//!
//! ```
//! # use time::calendar::Tm;
//! let date = Tm::utc(1718617807);
//! assert_eq!(date, Tm {
//! 	sec: 7,
//! 	min: 50,
//! 	hour: 9,
//! 	day: 17,
//! 	mon: 6,
//! 	year: 2024,
//! 	wday: 1,
//! 	isdst: false
//! });
//! ```

#![no_std]

pub mod time;
pub mod calendar;

pub use time::*;
pub use calendar::Tm;
