//! The real-time transmit loop.
//!
//! Each frame starts on a minute boundary of the system clock. Between frames the scheduler
//! sleeps until just short of the next boundary, then samples the clock in a tight loop until the
//! boundary passes. Frames are never timed from the end of the previous one, so keying latency
//! cannot accumulate into drift.

use std::time::Duration;

use log::{debug, info};
use signals::keying::Code;
use signals::msf;
use time::TimeSpec;

use crate::carrier::Carrier;
use crate::error::TransmitError;
use crate::keyer::BitKeyer;
use crate::logging::Timestamp;
use crate::timebase::Timebase;

/// How close to the minute boundary the coarse wait ends, in microseconds.
const GUARD_US: i64 = 3330;

/// Latency of keying the marker, in microseconds, compensated on its trailing pulse.
const FIXED_SKEW_US: i64 = -13_000;

/// A frame may start up to this many microseconds after the boundary.
const ALIGNMENT_WINDOW_US: i64 = 250_000;

/// Shortest non-zero transmit duration, in seconds.
pub const MIN_DURATION: u32 = 60;

enum State {
	/// Waiting for the next minute boundary.
	Aligning,
	/// Aligned; transmit the frame sampled at this time.
	Transmitting(TimeSpec)
}

/// Aligns frames to the system clock and keys them onto the carrier.
pub struct FrameScheduler<C: Carrier, T: Timebase> {
	keyer: BitKeyer<C>,
	timebase: T
}

impl<C: Carrier, T: Timebase> FrameScheduler<C, T> {
	pub fn new(carrier: C, timebase: T) -> FrameScheduler<C, T> {
		FrameScheduler { keyer: BitKeyer::new(carrier), timebase }
	}

	/// Transmit one frame per minute for `duration` seconds, or until cancelled if `duration` is
	/// zero. Returns the number of frames sent.
	///
	/// The duration is measured in whole seconds from the call, and is checked each time the
	/// clock is sampled between frames, so the last frame always completes. The carrier is
	/// stopped when this returns, whatever the outcome.
	///
	/// # Errors
	///
	/// - [`TransmitError::DurationTooShort`] if `duration` is positive but less than
	///   [`MIN_DURATION`]. Nothing is transmitted.
	/// - [`TransmitError::Cancelled`] if a wait was cancelled.
	/// - [`TransmitError::Clock`] if the clock could not be read.
	pub fn run(&mut self, duration: u32) -> Result<usize, TransmitError> {
		let result = self.transmit(duration);
		self.keyer.carrier_mut().stop();
		result
	}

	fn transmit(&mut self, duration: u32) -> Result<usize, TransmitError> {
		if duration > 0 && duration < MIN_DURATION {
			return Err(TransmitError::DurationTooShort(duration))
		}

		let start = self.timebase.now().ok_or(TransmitError::Clock)?;
		let mut frames = 0;
		let mut state = State::Aligning;
		loop {
			state = match state {
				State::Aligning => {
					let now = self.timebase.now().ok_or(TransmitError::Clock)?;
					if duration > 0 && now.sec - start.sec >= duration as i64 {
						return Ok(frames)
					}
					self.align(now)?
				},
				State::Transmitting(now) => {
					self.transmit_frame(&now)?;
					frames += 1;
					State::Aligning
				}
			}
		}
	}

	/// Decide whether `now` is close enough after a boundary to start a frame, otherwise wait.
	fn align(&self, now: TimeSpec) -> Result<State, TransmitError> {
		if now.second_of_minute() == 0 && now.subsec_micros() <= ALIGNMENT_WINDOW_US {
			return Ok(State::Transmitting(now))
		}

		let remaining = now.micros_to_next_minute();
		if remaining > GUARD_US {
			info!("Waiting {:.3} seconds for clock alignment", remaining as f64 / 1e6);
			self.timebase.sleep(Duration::from_micros((remaining - GUARD_US) as u64))?;
		}
		Ok(State::Aligning)
	}

	fn transmit_frame(&mut self, now: &TimeSpec) -> Result<(), TransmitError> {
		let frame = msf::encode(now);
		let correction = FIXED_SKEW_US - now.subsec_millis() * 1000;
		info!("Timecode starting {}", Timestamp(*now));
		debug!("Encoded {}, marker correction {} us", frame.decode(), correction);

		for (i, slot) in frame.slots().iter().enumerate() {
			let code = frame.code(i);
			if code != Code::Marker {
				debug!("  Bit: {:02}   A:{} B:{}", i, slot.a as u8, slot.b as u8);
			}
			let correction = if i == 0 { correction } else { 0 };
			self.keyer.key(&self.timebase, code, correction)?;
		}

		if let Some(end) = self.timebase.now() {
			debug!("Timecode finished {}", Timestamp(end));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use signals::msf::FRAME_SLOTS;
	use crate::carrier::recording::Recorder;
	use crate::timebase::simulated::SimulatedTimebase;
	use time::{Nanoseconds, Seconds};

	/// A minute boundary: Sunday, May 26, 2024. 16:57:00 UTC.
	const BOUNDARY: TimeSpec = TimeSpec { sec: 1716742620, nsec: 0 };
	const TICK: Duration = Duration::from_micros(500);

	fn scheduler(start: TimeSpec) -> (FrameScheduler<Recorder, SimulatedTimebase>, Recorder, SimulatedTimebase) {
		let timebase = SimulatedTimebase::new(start, TICK);
		let recorder = Recorder::new(timebase.clone());
		(FrameScheduler::new(recorder.clone(), timebase.clone()), recorder, timebase)
	}

	// Start of every keyed marker: carrier off near a boundary, then back on
	fn markers(recorder: &Recorder) -> Vec<TimeSpec> {
		recorder.events().windows(2)
			.filter(|w| !w[0].0 && w[1].0)
			.map(|w| w[0].1)
			.filter(|t| t.second_of_minute() == 0 && t.subsec_micros() <= ALIGNMENT_WINDOW_US)
			.collect()
	}

	#[test]
	fn too_short_test() {
		let (mut scheduler, recorder, timebase) = scheduler(BOUNDARY);
		assert_eq!(scheduler.run(45), Err(TransmitError::DurationTooShort(45)));
		assert_eq!(scheduler.run(1), Err(TransmitError::DurationTooShort(1)));

		// Only forced off, never started
		assert!(recorder.events().iter().all(|(on, _)| !on));
		assert!(timebase.sleeps().is_empty());
	}

	#[test]
	fn duration_test() {
		let (mut scheduler, recorder, timebase) = scheduler(BOUNDARY);
		assert_eq!(scheduler.run(120), Ok(2));
		assert!(timebase.peek().sec >= BOUNDARY.sec + 120);

		let markers = markers(&recorder);
		assert_eq!(markers.len(), 2);
		assert_eq!(markers[0].sec, BOUNDARY.sec);
		assert_eq!(markers[1].sec, BOUNDARY.sec + 60);

		// Every keyed second opens with the carrier off, and 01 switches it off twice. One more
		// stop follows the run.
		let doubled: usize = [BOUNDARY, BOUNDARY + Seconds(60)].iter()
			.map(|t| {
				let frame = msf::encode(t);
				(0..FRAME_SLOTS).filter(|&i| frame.code(i) == Code::Bits01).count()
			})
			.sum();
		let events = recorder.events();
		assert_eq!(events.iter().filter(|(on, _)| !on).count(), 120 + doubled + 1);
		assert_eq!(events.last().map(|e| e.0), Some(false));
	}

	#[test]
	fn align_test() {
		// Second 30 of the minute
		let (mut scheduler, recorder, timebase) = scheduler(BOUNDARY + Seconds(30));
		timebase.cancel_after(1);
		assert_eq!(scheduler.run(0), Err(TransmitError::Cancelled));

		// One coarse wait to just short of the boundary
		let sleeps = timebase.sleeps();
		assert_eq!(sleeps.len(), 1);
		assert!(sleeps[0] > Duration::from_millis(29_990) && sleeps[0] < Duration::from_secs(30));

		// Keying began with the marker after the boundary, then the carrier was forced off
		let events = recorder.events();
		assert_eq!(events.len(), 2);
		let (on, first) = events[0];
		assert!(!on);
		assert_eq!(first.sec, BOUNDARY.sec + 60);
		assert!(first.subsec_micros() <= ALIGNMENT_WINDOW_US);
		assert!(!events[1].0);
	}

	// Scheduler whose first clock sample after `run` begins lands `nsec` past the boundary
	fn sampled_at(nsec: i64) -> (FrameScheduler<Recorder, SimulatedTimebase>, Recorder, SimulatedTimebase) {
		scheduler(BOUNDARY + Nanoseconds(nsec - TICK.as_nanos() as i64))
	}

	#[test]
	fn window_edge_test() {
		// Exactly at the edge of the window: keyed at once
		let (mut scheduler, recorder, timebase) = sampled_at(250_000_000);
		timebase.cancel_after(0);
		assert_eq!(scheduler.run(0), Err(TransmitError::Cancelled));
		assert!(timebase.sleeps().is_empty());
		assert_eq!(recorder.events()[0].1.sec, BOUNDARY.sec);

		// One microsecond late: the full minute is waited out
		let (mut scheduler, recorder, timebase) = sampled_at(250_001_000);
		timebase.cancel_after(1);
		assert_eq!(scheduler.run(0), Err(TransmitError::Cancelled));
		assert_eq!(timebase.sleeps()[0], Duration::from_micros(60_000_000 - 250_001 - 3330));
		assert_eq!(recorder.events()[0].1.sec, BOUNDARY.sec + 60);

		// Within the same millisecond as the edge, still late
		let (mut scheduler, recorder, timebase) = sampled_at(250_900_000);
		timebase.cancel_after(1);
		assert_eq!(scheduler.run(0), Err(TransmitError::Cancelled));
		assert_eq!(recorder.events()[0].1.sec, BOUNDARY.sec + 60);
	}

	#[test]
	fn late_start_test() {
		// Well past the alignment window, so the full minute is waited out
		let (mut scheduler, recorder, timebase) = scheduler(TimeSpec { sec: BOUNDARY.sec, nsec: 251_000_000 });
		timebase.cancel_after(1);
		assert_eq!(scheduler.run(0), Err(TransmitError::Cancelled));
		assert!(timebase.sleeps()[0] > Duration::from_millis(59_740));
		assert_eq!(recorder.events()[0].1.sec, BOUNDARY.sec + 60);
	}

	#[test]
	fn cancel_test() {
		let (mut scheduler, recorder, timebase) = scheduler(BOUNDARY);
		timebase.cancel_after(45);
		assert_eq!(scheduler.run(0), Err(TransmitError::Cancelled));

		let events = recorder.events();
		assert_eq!(events.last().map(|e| e.0), Some(false));
		// Cancelled part way through the first frame
		assert!(timebase.peek().sec < BOUNDARY.sec + 60);
	}
}
