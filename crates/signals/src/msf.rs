//! The MSF time code.
//!
//! See [MSF documentation](https://en.wikipedia.org/wiki/Time_from_NPL_(MSF)) for details. Each
//! minute is announced during the minute **before** it: the frame keyed from 12:34:00 to
//! 12:34:59 carries the time 12:35. Each second `i` of the minute is a [`BitSlot`] holding two
//! bits, A and B:
//!
//! | Slots   | Bits | Content                                                      |
//! | ------- | ---- | ------------------------------------------------------------ |
//! | 0       |      | Minute marker (keyed specially, see [`crate::keying`])       |
//! | 17-24   | A    | Year within century, BCD 80-40-20-10-8-4-2-1                 |
//! | 25-29   | A    | Month, BCD 10-8-4-2-1                                        |
//! | 30-35   | A    | Day of month, BCD 20-10-8-4-2-1                              |
//! | 36-38   | A    | Day of week (0 = Sunday), 4-2-1                              |
//! | 39-44   | A    | Hour, BCD 20-10-8-4-2-1                                      |
//! | 45-51   | A    | Minute, BCD 40-20-10-8-4-2-1                                 |
//! | 53-58   | A    | Always 1                                                     |
//! | 54      | B    | Parity over 17A-24A                                          |
//! | 55      | B    | Parity over 25A-35A                                          |
//! | 56      | B    | Parity over 36A-38A                                          |
//! | 57      | B    | Parity over 39A-51A                                          |
//! | 58      | B    | Summer time in effect                                        |
//!
//! A parity bit is set when its scope holds an even number of set A bits, so that scope and
//! parity bit together always hold an odd number. All other bits are zero.
//!
//! # Examples
//! ```
//! # use signals::msf::{Frame, TimeComponents};
//! // Wednesday, December 31, 2099. 23:59 GMT.
//! let minute = TimeComponents {
//! 	year: 99, month: 12, day: 31, weekday: 3, hour: 23, minute: 59, dst: false
//! };
//! let frame = Frame::new(&minute);
//! assert_eq!(frame.decode(), minute);
//! ```

use core::fmt;
use time::calendar::Tm;
#[cfg(any(test, feature = "local"))]
use time::TimeSpec;
use crate::keying::Code;

/// Number of slots (seconds) in a frame.
pub const FRAME_SLOTS: usize = 60;

/// A BCD field: the slot holding its first (most significant) bit and the weight of each bit.
struct Field {
	start: usize,
	weights: &'static [u8]
}

impl Field {
	/// Slots covered by this field.
	fn slots(&self) -> core::ops::Range<usize> {
		self.start..self.start + self.weights.len()
	}
}

const YEAR: Field = Field { start: 17, weights: &[80, 40, 20, 10, 8, 4, 2, 1] };
const MONTH: Field = Field { start: 25, weights: &[10, 8, 4, 2, 1] };
const DAY: Field = Field { start: 30, weights: &[20, 10, 8, 4, 2, 1] };
const WEEKDAY: Field = Field { start: 36, weights: &[4, 2, 1] };
const HOUR: Field = Field { start: 39, weights: &[20, 10, 8, 4, 2, 1] };
const MINUTE: Field = Field { start: 45, weights: &[40, 20, 10, 8, 4, 2, 1] };

/// Parity slots and the fields they cover. The count of set bits runs across all fields of a
/// scope without resetting.
const PARITY: [(usize, &[Field]); 4] = [
	(54, &[YEAR]),
	(55, &[MONTH, DAY]),
	(56, &[WEEKDAY]),
	(57, &[HOUR, MINUTE])
];

/// Slots whose A bit is always set.
const FIXED_A: core::ops::RangeInclusive<usize> = 53..=58;

/// Slot carrying the summer time flag in its B bit.
const DST_SLOT: usize = 58;

/// The calendar fields transmitted in one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeComponents {
	/// Year within century, ranged [0, 99]
	pub year: u8,
	/// Month, ranged [1, 12]
	pub month: u8,
	/// Day of month, ranged [1, 31]
	pub day: u8,
	/// Day of week, ranged [0, 6] => [Sunday, Saturday]
	pub weekday: u8,
	/// Hour, ranged [0, 23]
	pub hour: u8,
	/// Minute, ranged [0, 59]
	pub minute: u8,
	/// Whether summer time (DST) is in effect
	pub dst: bool
}

impl From<&Tm> for TimeComponents {
	fn from(tm: &Tm) -> Self {
		TimeComponents {
			year: tm.year_of_century(),
			month: tm.mon,
			day: tm.day,
			weekday: tm.wday,
			hour: tm.hour,
			minute: tm.min,
			dst: tm.isdst
		}
	}
}

impl fmt::Display for TimeComponents {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:02}-{:02}-{:02} {:02}:{:02} weekday {}{}",
			self.year, self.month, self.day, self.hour, self.minute, self.weekday,
			if self.dst { " BST" } else { "" })
	}
}

/// One second of the time code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BitSlot {
	pub a: bool,
	pub b: bool
}

/// A full minute of the time code, slot 0 first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame([BitSlot; FRAME_SLOTS]);

impl Frame {
	/// Build the frame announcing `minute`.
	///
	/// Fields are written by greedy subtraction: scanning the weights left to right, a bit is set
	/// (and its weight subtracted) whenever the remaining value is at least the weight. Values
	/// outside a field's range are clipped to what its bits can hold.
	pub fn new(minute: &TimeComponents) -> Frame {
		let mut slots = [BitSlot::default(); FRAME_SLOTS];

		let mut put = |field: &Field, value: u8| {
			let mut rem = value;
			for (slot, &w) in slots[field.slots()].iter_mut().zip(field.weights) {
				if rem >= w {
					slot.a = true;
					rem -= w;
				}
			}
		};
		put(&YEAR, minute.year);
		put(&MONTH, minute.month);
		put(&DAY, minute.day);
		put(&WEEKDAY, minute.weekday);
		put(&HOUR, minute.hour);
		put(&MINUTE, minute.minute);

		for (parity, scope) in PARITY {
			let set = scope.iter()
				.flat_map(Field::slots)
				.filter(|&i| slots[i].a)
				.count();
			slots[parity].b = set % 2 == 0;
		}

		for slot in &mut slots[FIXED_A] {
			slot.a = true;
		}
		slots[DST_SLOT].b = minute.dst;

		Frame(slots)
	}

	/// The slots of this frame.
	#[inline(always)]
	pub fn slots(&self) -> &[BitSlot; FRAME_SLOTS] {
		&self.0
	}

	/// The symbol keyed in slot `i`. Slot 0 is always the minute marker.
	///
	/// # Panics
	///
	/// Panics if `i >= 60`.
	pub fn code(&self, i: usize) -> Code {
		if i == 0 {
			Code::Marker
		} else {
			Code::from_bits(self.0[i].a, self.0[i].b)
		}
	}

	/// Read the calendar fields back out of the frame, as a receiver would.
	///
	/// Parity is not checked.
	pub fn decode(&self) -> TimeComponents {
		let get = |field: &Field| -> u8 {
			self.0[field.slots()].iter()
				.zip(field.weights)
				.filter(|(slot, _)| slot.a)
				.map(|(_, &w)| w)
				.sum()
		};
		TimeComponents {
			year: get(&YEAR),
			month: get(&MONTH),
			day: get(&DAY),
			weekday: get(&WEEKDAY),
			hour: get(&HOUR),
			minute: get(&MINUTE),
			dst: self.0[DST_SLOT].b
		}
	}

	/// Pack the A and B bits into two words, slot `i` in bit `i`.
	///
	/// # Examples
	///
	/// ```
	/// # use signals::msf::{Frame, TimeComponents};
	/// let frame = Frame::new(&TimeComponents::default());
	/// let (a, _) = frame.pack();
	/// // Only the fixed bits 53-58 are set
	/// assert_eq!(a, 0x3F_u64 << 53);
	/// ```
	pub fn pack(&self) -> (u64, u64) {
		self.0.iter().enumerate().fold((0, 0), |(a, b), (i, slot)| {
			(a | (slot.a as u64) << i, b | (slot.b as u64) << i)
		})
	}
}

/// Encode the frame to transmit starting at `time`.
///
/// The frame announces the minute after `time`, in the host's local time. If libc cannot
/// convert that instant, the UTC calendar is used instead, so every input produces a frame.
#[cfg(any(test, feature = "local"))]
pub fn encode(time: &TimeSpec) -> Frame {
	let target = time.sec + 60;
	let tm = Tm::local(target).unwrap_or_else(|| Tm::utc(target));
	Frame::new(&TimeComponents::from(&tm))
}

#[cfg(test)]
mod tests {
	use super::*;

	// Bits of a field's slots, MSB first
	fn field_bits<const N: usize>(frame: &Frame, field: &Field) -> [u8; N] {
		let mut out = [0; N];
		for (o, i) in out.iter_mut().zip(field.slots()) {
			*o = frame.slots()[i].a as u8;
		}
		out
	}

	fn components(year: u8, month: u8, day: u8, weekday: u8, hour: u8, minute: u8, dst: bool)
		-> TimeComponents
	{
		TimeComponents { year, month, day, weekday, hour, minute, dst }
	}

	fn check_invariants(frame: &Frame) {
		let slots = frame.slots();
		for i in 53..=58 {
			assert!(slots[i].a, "slot {} A must be set", i);
		}
		for i in (0..17).chain([52, 59]) {
			assert_eq!(slots[i], BitSlot::default(), "slot {} must be empty", i);
		}
		for i in 17..54 {
			assert!(!slots[i].b, "slot {} B must be clear", i);
		}
		for (parity, scope) in [(54, 17..=24), (55, 25..=35), (56, 36..=38), (57, 39..=51)] {
			let set = scope.filter(|&i| slots[i].a).count();
			assert_eq!(slots[parity].b, set % 2 == 0, "parity slot {}", parity);
		}
	}

	#[test]
	fn bcd_examples_test() {
		let frame = Frame::new(&components(99, 12, 31, 6, 23, 59, false));
		assert_eq!(field_bits::<8>(&frame, &YEAR), [1, 0, 0, 1, 1, 0, 0, 1]);
		assert_eq!(field_bits::<5>(&frame, &MONTH), [1, 0, 0, 1, 0]);
		assert_eq!(field_bits::<6>(&frame, &DAY), [1, 1, 0, 0, 0, 1]);
		assert_eq!(field_bits::<3>(&frame, &WEEKDAY), [1, 1, 0]);
		assert_eq!(field_bits::<6>(&frame, &HOUR), [1, 0, 0, 0, 1, 1]);
		assert_eq!(field_bits::<7>(&frame, &MINUTE), [1, 0, 1, 1, 0, 0, 1]);
		check_invariants(&frame);
	}

	#[test]
	fn round_trip_test() {
		for year in 0..=99 {
			let c = components(year, 1, 1, 0, 0, 0, false);
			assert_eq!(Frame::new(&c).decode(), c);
		}
		for month in 1..=12 {
			for day in 1..=31 {
				let c = components(26, month, day, 1, 0, 0, true);
				let frame = Frame::new(&c);
				assert_eq!(frame.decode(), c);
				check_invariants(&frame);
			}
		}
		for weekday in 0..=6 {
			let c = components(26, 10, 19, weekday, 12, 0, false);
			assert_eq!(Frame::new(&c).decode(), c);
		}
		for hour in 0..=23 {
			for minute in 0..=59 {
				let c = components(26, 10, 19, 1, hour, minute, false);
				let frame = Frame::new(&c);
				assert_eq!(frame.decode(), c);
				check_invariants(&frame);
			}
		}
	}

	#[test]
	fn parity_test() {
		// 2020-07-04 11:56 BST. Year has one bit set, month+day four, weekday two, hour+minute six.
		let frame = Frame::new(&components(20, 7, 4, 6, 11, 56, true));
		let (a, b) = frame.pack();
		// Same A bits as the reference MSF encoding, without the marker in slot 0
		assert_eq!(a.reverse_bits(), 0x0000101C4C8D67E0);
		// 55B, 56B, 57B and 58B (summer time)
		assert_eq!(b.reverse_bits(), 0x00000000000001E0);

		// Month and day share one count: 10 (one bit) + 30 (two bits) is odd, so 55B is clear
		let frame = Frame::new(&components(0, 10, 30, 0, 0, 0, false));
		assert!(!frame.slots()[55].b);
		// Weekday and hour zero: even (zero) count sets the parity
		assert!(frame.slots()[56].b);
		assert!(frame.slots()[57].b);
		assert!(frame.slots()[54].b);
		check_invariants(&frame);
	}

	#[test]
	fn reference_frame_test() {
		// Sun, May 26, 2024. 17:57 BST.
		let frame = Frame::new(&components(24, 5, 26, 0, 17, 57, true));
		let (a, _) = frame.pack();
		assert_eq!(a.reverse_bits(), 0x0000121660BD77E0);
		check_invariants(&frame);
	}

	#[test]
	fn codes_test() {
		let frame = Frame::new(&components(20, 7, 4, 6, 11, 56, true));
		assert_eq!(frame.code(0), Code::Marker);
		assert_eq!(frame.code(1), Code::Bits00);
		assert_eq!(frame.code(19), Code::Bits10);
		assert_eq!(frame.code(52), Code::Bits00);
		assert_eq!(frame.code(53), Code::Bits10);
		assert_eq!(frame.code(54), Code::Bits10);
		assert_eq!(frame.code(55), Code::Bits11);
		assert_eq!(frame.code(58), Code::Bits11);
		assert_eq!(frame.code(59), Code::Bits00);
	}

	#[test]
	fn calendar_test() {
		// Saturday, July 4, 2020. 10:56:00 UTC.
		let c = TimeComponents::from(&Tm::utc(1593860160));
		assert_eq!(c, components(20, 7, 4, 6, 10, 56, false));
	}

	#[test]
	fn encode_test() {
		// Whatever the host timezone, the frame holds the next minute in local time
		for sec in [0, 951782340, 1593860218, 1716742645, 4102444740] {
			let time = TimeSpec { sec, nsec: 250_000_000 };
			let frame = encode(&time);
			check_invariants(&frame);
			let expected = TimeComponents::from(&Tm::local(sec + 60).unwrap());
			assert_eq!(frame.decode(), expected);
		}
	}
}
