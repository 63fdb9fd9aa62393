//! Encode the MSF time signal.
//!
//! This crate turns a point in time into the 60-second [MSF] time code and describes how each
//! second of that code is keyed onto the 60 kHz carrier. It knows nothing about carrier hardware
//! or real-time scheduling: [`msf`] builds a [`msf::Frame`] for the upcoming minute, and
//! [`keying`] maps each slot of that frame to the on/off pulses a receiver expects.
//!
//! This crate is `no_std`. Enabling feature `local` adds [`msf::encode`], which reads the host's
//! local timezone through libc.
//!
//! [MSF]: https://en.wikipedia.org/wiki/Time_from_NPL_(MSF)
//!
//! # Examples
//! ```
//! # use signals::msf::{Frame, TimeComponents};
//! # use signals::keying::Code;
//! // Saturday, July 4, 2020. 11:56 BST.
//! let minute = TimeComponents {
//! 	year: 20, month: 7, day: 4, weekday: 6, hour: 11, minute: 56, dst: true
//! };
//! let frame = Frame::new(&minute);
//!
//! // Slot 0 is always the minute marker, every other slot carries two bits
//! assert_eq!(frame.code(0), Code::Marker);
//! assert_eq!(frame.code(19), Code::Bits10);
//! assert_eq!(frame.code(58), Code::Bits11);
//! ```

#![no_std]

pub mod msf;
pub mod keying;
