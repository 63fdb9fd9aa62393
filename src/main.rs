//! Transmit the UK [MSF] 60 kHz time signal from a Raspberry Pi.
//!
//! This crate drives the BCM2835 general-purpose clock GPCLK0, which outputs on GPIO4 (header pin
//! 7), as a 60 kHz carrier and keys it on and off with the MSF time code. A short wire on the pin
//! radiates enough to set a radio-controlled clock placed nearby.
//!
//! Each minute's frame is encoded from the system clock in local time, so the host should be
//! synchronised (e.g. with NTP) and its timezone set to `Europe/London` for receivers to show the
//! UK time. Frames are aligned to the minute boundary of the system clock.
//!
//! [MSF]: https://en.wikipedia.org/wiki/Time_from_NPL_(MSF)
//!
//! # Command Line Arguments
//!
//! General form: `pimsf [options...]`
//!
//! | Short form | Long form    | Argument         | Default      | Description                          |
//! | ---------- | ------------ | ---------------- | ------------ | ------------------------------------ |
//! | `-v`       | `--verbose`  |                  |              | Log each bit and frame timestamps    |
//! | `-s`       | `--start`    |                  |              | Switch the carrier on and exit       |
//! | `-e`       | `--stop`     |                  |              | Switch the carrier off and exit      |
//! | `-t`       | `--duration` | Integer seconds  | 0            | Transmit time, 0 means until Ctrl-C  |
//! | `-b`       | `--base`     | Hex or decimal   | `0x20000000` | Physical peripheral base address     |
//! | `-n`       | `--dry-run`  |                  |              | Log carrier transitions, no hardware |
//! | `-h`       | `--help`     |                  |              | Print usage                          |
//!
//! A non-zero duration must be at least 60 seconds, one full frame. Transmission stops at the
//! first minute boundary after the duration has passed. `RUST_LOG` overrides the log level chosen
//! by `-v`; `RUST_LOG=trace` with `-n` shows every carrier transition.
//!
//! The peripheral base is `0x20000000` on the BCM2835 (Pi 1, Zero) and `0x3F000000` on the
//! BCM2836/7 (Pi 2, 3). Accessing it requires root.
//!
//! # Examples
//!
//! Transmit until interrupted
//! ```sh
//! sudo pimsf
//! ```
//!
//! Transmit for an hour on a Pi 3, logging every bit
//! ```sh
//! sudo pimsf -v -b 0x3F000000 -t 3600
//! ```
//!
//! Watch the keying without hardware
//! ```sh
//! RUST_LOG=trace pimsf -n -t 120
//! ```

use std::process::ExitCode;

use log::{error, info, warn};

use args::{Arguments, ArgumentsError, Mode};
use cancel::CancelToken;
use carrier::{Carrier, ClockConfig, DryRun, GpioClock};
use error::{CarrierError, TransmitError};
use mmio::MemoryRegion;
use scheduler::FrameScheduler;
use timebase::SystemTimebase;

mod args;
mod cancel;
mod carrier;
mod error;
mod keyer;
mod logging;
mod mmio;
mod register;
mod scheduler;
mod timebase;

const USAGE: &str = "\
Transmit the MSF 60 kHz time signal on GPIO4 (GPCLK0).

Usage: pimsf [OPTIONS]

Options:
  -v, --verbose             log each bit and frame timestamps
  -s, --start               switch the carrier on and exit
  -e, --stop                switch the carrier off and exit
  -t, --duration <SECONDS>  transmit time in seconds (>= 60), default 0 (until Ctrl-C)
  -b, --base <ADDRESS>      peripheral base address, default 0x20000000
  -n, --dry-run             log carrier transitions instead of using the hardware
  -h, --help                print this help

Examples:
  sudo pimsf -t 3600
  sudo pimsf -v -b 0x3F000000
  RUST_LOG=trace pimsf -n -t 120
";

/// Acquire the carrier: the mapped GPCLK0, or a logging stand-in for a dry run.
///
/// # Errors
///
/// Returns [`CarrierError`] if the peripheral block cannot be mapped.
fn open_carrier(args: &Arguments) -> Result<Box<dyn Carrier>, CarrierError> {
	if args.dry_run {
		info!("Dry run, carrier transitions are logged at trace level");
		return Ok(Box::new(DryRun::default()))
	}
	let regs = MemoryRegion::map(args.base, register::PERIPHERAL_SPAN)?;
	Ok(Box::new(GpioClock::setup(regs, ClockConfig::MSF)))
}

/// Transmit until the duration passes or Ctrl-C is pressed.
fn transmit(carrier: Box<dyn Carrier>, duration: u32) -> ExitCode {
	let cancel = CancelToken::new();
	let handler = cancel.clone();
	if let Err(e) = ctrlc::set_handler(move || handler.cancel()) {
		warn!("Failed to install Ctrl-C handler: {}", e);
	}

	if duration > 0 {
		info!("Transmitting for {} seconds", duration);
	} else {
		info!("Transmitting until interrupted");
	}

	let mut scheduler = FrameScheduler::new(carrier, SystemTimebase::new(cancel));
	match scheduler.run(duration) {
		Ok(frames) => {
			info!("Transmitted {} frames", frames);
			ExitCode::SUCCESS
		},
		Err(TransmitError::Cancelled) => {
			warn!("SIGINT received, shutting down carrier");
			ExitCode::SUCCESS
		},
		Err(e) => {
			error!("{}", e);
			ExitCode::FAILURE
		}
	}
}

/// Main program entry point.
///
/// Parses input arguments, then starts, stops or keys the carrier. See [`crate`] documentation
/// for details.
fn main() -> ExitCode {
	let args = match Arguments::parse(std::env::args_os().skip(1)) {
		Ok(a) => a,
		Err(e) => {
			return if let ArgumentsError::Help = e {
				println!("{}", USAGE);
				ExitCode::SUCCESS
			} else {
				eprintln!("{}\n\n{}", e, USAGE);
				ExitCode::FAILURE
			}
		}
	};

	logging::init(args.verbose);

	let mut carrier = match open_carrier(&args) {
		Ok(c) => c,
		Err(e) => {
			error!("{}", e);
			return ExitCode::FAILURE
		}
	};

	match args.mode {
		Mode::Start => {
			carrier.start();
			info!("Carrier started");
			ExitCode::SUCCESS
		},
		Mode::Stop => {
			carrier.stop();
			info!("Carrier stopped");
			ExitCode::SUCCESS
		},
		Mode::Transmit(duration) => transmit(carrier, duration)
	}
}
