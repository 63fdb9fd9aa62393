//! Error types used across modules.
//!
//! This module contains the error types that may be created and used within this crate. See
//! individual error types for documentation.

use std::{error, fmt, io};

/// The error type for acquiring the carrier hardware.
pub enum CarrierError {
	/// `/dev/mem` could not be opened. The underlying error is provided in the payload.
	Open(io::Error),
	/// The peripheral block could not be mapped at the given physical address. The address and
	/// underlying error are provided in the payload.
	Map(u64, io::Error)
}

impl fmt::Display for CarrierError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CarrierError::Open(e) if e.kind() == io::ErrorKind::PermissionDenied =>
				write!(f, "Failed to open /dev/mem: {}. Run as root to access the clock registers.", e),
			CarrierError::Open(e) => write!(f, "Failed to open /dev/mem: {}", e),
			CarrierError::Map(base, e) => write!(f, "Failed to map peripherals at 0x{:08x}: {}", base, e)
		}
	}
}

impl fmt::Debug for CarrierError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

impl error::Error for CarrierError {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self {
			CarrierError::Open(e) | CarrierError::Map(_, e) => Some(e)
		}
	}
}

/// The error type for transmitting the time code.
#[cfg_attr(test, derive(PartialEq))]
pub enum TransmitError {
	/// The requested duration is positive but shorter than one frame. The requested duration (in
	/// seconds) is provided in the payload.
	DurationTooShort(u32),
	/// The system clock could not be read.
	Clock,
	/// Transmission was cancelled by the operator.
	Cancelled
}

impl fmt::Display for TransmitError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TransmitError::DurationTooShort(d) =>
				write!(f, "Minimum transmit time of 60s required, got {}s", d),
			TransmitError::Clock => write!(f, "Failed to get current system time"),
			TransmitError::Cancelled => write!(f, "Transmission cancelled")
		}
	}
}

impl fmt::Debug for TransmitError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

impl error::Error for TransmitError {}
