//! Memory-mapped access to the peripheral registers through `/dev/mem`.

use std::fs::OpenOptions;
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::ptr;

use crate::error::CarrierError;
use crate::register::BUS_BASE;

/// Access to 32-bit peripheral registers, addressed by their bus address.
pub trait RegisterBlock {
	/// Read the register at bus address `bus`.
	fn read32(&self, bus: u32) -> u32;
	/// Write `value` to the register at bus address `bus`.
	fn write32(&mut self, bus: u32, value: u32);
}

/// The peripheral block mapped into this process.
///
/// The mapping is shared and uncached (`O_SYNC`), so register writes reach the hardware in
/// program order. The region is unmapped on drop; the file descriptor is closed as soon as the
/// mapping exists.
pub struct MemoryRegion {
	base: *mut u8,
	len: usize
}

impl MemoryRegion {
	/// Map `len` bytes of physical memory starting at `phys_base`, which must be page aligned.
	///
	/// # Errors
	///
	/// [`CarrierError::Open`] if `/dev/mem` cannot be opened, typically due to missing root
	/// privileges, or [`CarrierError::Map`] if the mapping is refused.
	pub fn map(phys_base: u64, len: usize) -> Result<MemoryRegion, CarrierError> {
		let file = OpenOptions::new()
			.read(true)
			.write(true)
			.custom_flags(libc::O_SYNC)
			.open("/dev/mem")
			.map_err(CarrierError::Open)?;

		let offset = libc::off_t::try_from(phys_base)
			.map_err(|_| CarrierError::Map(phys_base, io::Error::from(io::ErrorKind::InvalidInput)))?;

		// SAFETY: a fresh mapping is requested at an address of the kernel's choosing, so no
		// existing memory is affected. The result is checked against MAP_FAILED.
		let base = unsafe {
			libc::mmap(
				ptr::null_mut(),
				len,
				libc::PROT_READ | libc::PROT_WRITE,
				libc::MAP_SHARED,
				file.as_raw_fd(),
				offset
			)
		};
		if base == libc::MAP_FAILED {
			return Err(CarrierError::Map(phys_base, io::Error::last_os_error()))
		}

		Ok(MemoryRegion { base: base as *mut u8, len })
	}

	fn register(&self, bus: u32) -> *mut u32 {
		let offset = bus.wrapping_sub(BUS_BASE) as usize;
		assert!(offset % 4 == 0 && offset + 4 <= self.len, "register 0x{:08x} outside mapping", bus);
		// SAFETY: offset is in bounds of the mapping, checked above
		unsafe { self.base.add(offset) as *mut u32 }
	}
}

impl RegisterBlock for MemoryRegion {
	fn read32(&self, bus: u32) -> u32 {
		// SAFETY: the pointer is aligned and inside the live mapping
		unsafe { ptr::read_volatile(self.register(bus)) }
	}

	fn write32(&mut self, bus: u32, value: u32) {
		// SAFETY: the pointer is aligned and inside the live mapping
		unsafe { ptr::write_volatile(self.register(bus), value) }
	}
}

impl Drop for MemoryRegion {
	fn drop(&mut self) {
		// SAFETY: base and len are exactly those returned by and passed to mmap
		unsafe {
			libc::munmap(self.base as *mut libc::c_void, self.len);
		}
	}
}
