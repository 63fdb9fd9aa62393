//! Support for command line argument parsing.
//!
//! See [crate] documentation for details on command line arguments and examples.

use std::error::Error;
use std::ffi::OsString;
use std::fmt::{Display, Debug};

/// Default physical address of the peripheral block (BCM2835, original Raspberry Pi and Zero).
pub const DEFAULT_BASE: u64 = 0x2000_0000;

/// What the program should do with the carrier.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(test, derive(PartialEq))]
pub enum Mode {
	/// Transmit the time code for the given number of seconds, 0 meaning until interrupted.
	Transmit(u32),
	/// Switch the carrier on and exit.
	Start,
	/// Switch the carrier off and exit.
	Stop
}

/// The error type for parsing command line arguments.
#[cfg_attr(test, derive(PartialEq))]
pub enum ArgumentsError {
	/// The option was unrecognized. The option is returned as the payload of this variant.
	UnrecognizedOption(String),
	/// Error converting an argument to UTF-8. The argument index and original [`OsString`] that
	/// could not be converted are returned as the payload of this variant.
	InvalidUTF8(usize, OsString),
	/// The parameter for an option was not supplied. The option is returned as the payload for this
	/// variant.
	MissingParameter(String),
	/// The provided duration was not a whole number of seconds. The supplied argument is returned
	/// as the payload of this variant.
	InvalidDuration(String),
	/// The provided peripheral base address was invalid. The supplied argument is returned as the
	/// payload of this variant.
	InvalidBase(String),
	/// Help option (-h) was included, so print help details and exit.
	Help
}

impl Display for ArgumentsError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ArgumentsError::UnrecognizedOption(s) => write!(f, "Unrecognized option: {}", s),
			ArgumentsError::InvalidUTF8(i, v) => write!(f, "Invalid UTF-8 in argument {}: {:?}", i, v),
			ArgumentsError::MissingParameter(s) => write!(f, "Missing parameter for option {}", s),
			ArgumentsError::InvalidDuration(s) => write!(f, "Invalid duration: {}", s),
			ArgumentsError::InvalidBase(s) => write!(f, "Invalid peripheral base address: {}", s),
			ArgumentsError::Help => write!(f, "Help requested")
		}
	}
}

impl Debug for ArgumentsError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		Display::fmt(self, f)
	}
}

impl Error for ArgumentsError {}

/// Convert an argument to [`&str`].
///
/// The function takes the argument index `i`, optional argument name `a`, and the argument `s`.
///
/// # Errors
///
/// Returns [`ArgumentsError::InvalidUTF8`] if the argument could not be converted to UTF-8 or
/// [`ArgumentsError::MissingParameter`] if the argument is `None`.
fn arg_to_str<'a, 'b>(i: usize, a: Option<&'a str>, s: Option<&'b OsString>)
	-> Result<&'b str, ArgumentsError>
{
	match s {
		Some(v) => v.to_str().ok_or_else(|| ArgumentsError::InvalidUTF8(i, v.clone())),
		None => Err(ArgumentsError::MissingParameter(a.map(String::from).unwrap_or_default()))
	}
}

/// Parse an address written in hexadecimal (with a `0x` prefix) or decimal.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_address("0x3F000000"), Ok(0x3F00_0000));
/// assert_eq!(parse_address("536870912"), Ok(0x2000_0000));
/// ```
fn parse_address(s: &str) -> Result<u64, ArgumentsError> {
	let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
		Some(hex) => u64::from_str_radix(hex, 16),
		None => s.parse()
	};
	parsed.map_err(|_| ArgumentsError::InvalidBase(s.to_string()))
}

/// Parsed command line arguments.
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct Arguments {
	/// What to do with the carrier.
	pub mode: Mode,
	/// Log at debug level.
	pub verbose: bool,
	/// Log carrier transitions instead of driving the hardware.
	pub dry_run: bool,
	/// Physical address of the peripheral block.
	pub base: u64
}

impl Arguments {
	/// Parse command line arguments.
	///
	/// The input can be any type that implements [`Iterator`] that yields [`OsString`], though
	/// typically this would be [`std::env::args_os`]. This function assumes that the application
	/// name is **not** supplied as the first item yielded by `args`, see examples for common use.
	///
	/// When both `-s` and `-e` are given, whichever comes first wins. Either overrides `-t`.
	///
	/// # Errors
	///
	/// This function can return any of the variants in [`ArgumentsError`]. See that documentation
	/// for more details.
	///
	/// # Examples
	///
	/// ```ignore
	/// let args = match Arguments::parse(std::env::args_os().skip(1)) {
	/// 	Ok(a) => a,
	/// 	Err(e) => {
	/// 		// Handle error
	/// 		panic!("{}", e);
	/// 	}
	/// };
	/// ```
	pub fn parse(mut args: impl Iterator<Item = OsString>) -> Result<Arguments, ArgumentsError>
	{
		let mut duration = 0;
		let mut switch: Option<Mode> = None;
		let mut verbose = false;
		let mut dry_run = false;
		let mut base = DEFAULT_BASE;
		let mut arg = args.next();
		let mut i = 0;
		loop {
			if arg.is_none() { break; }
			match arg_to_str(i, None, arg.as_ref())? {
				"-v" | "--verbose" => verbose = true,
				"-n" | "--dry-run" => dry_run = true,
				"-s" | "--start" => { switch.get_or_insert(Mode::Start); },
				"-e" | "--stop" => { switch.get_or_insert(Mode::Stop); },
				t @ ("-t" | "--duration") => {
					duration = arg_to_str(i+1, Some(t), args.next().as_ref())
						.and_then(
							|v| v.parse().map_err(|_| ArgumentsError::InvalidDuration(v.to_string()))
						)?;
					// Increment because we called args.next()
					i += 1;
				},
				b @ ("-b" | "--base") => {
					base = arg_to_str(i+1, Some(b), args.next().as_ref()).and_then(parse_address)?;
					// Increment because we called args.next()
					i += 1;
				},
				"-h" | "--help" => return Err(ArgumentsError::Help),
				v => return Err(ArgumentsError::UnrecognizedOption(v.to_string()))
			}
			arg = args.next();
			// Increment because we called args.next()
			i += 1;
		}

		Ok(Arguments {
			mode: switch.unwrap_or(Mode::Transmit(duration)),
			verbose,
			dry_run,
			base
		})
	}
}
