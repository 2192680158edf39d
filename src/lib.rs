#![no_std]
#![doc = include_str!("../README.md")]

use embedded_hal::spi::{Mode, MODE_3};

pub mod config;
pub mod conversion;
pub mod driver;
pub mod fault;
pub mod registers;

pub use config::{
    Averaging, ColdJunction, Config, ConversionMode, FaultClear, FaultMode, FaultSource,
    NoiseFilter, OneShot, OpenCircuitDetection, ThermocoupleType,
};
pub use driver::Max31856;
pub use fault::{FaultStatus, ThresholdFault};

/// SPI mode the MAX31856 requires (CPOL = 1, CPHA = 1).  The bus handed to [`Max31856::new`]
/// must already be configured for it.
pub const MODE: Mode = MODE_3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<SPI, CS> {
    SpiError(SPI),
    PinError(CS),
    /// A value outside what the register can encode.  Nothing was sent to the device.
    ArgumentError,
    /// The register read back after a read-modify-write differs from what was written.  The
    /// device may hold a different configuration than the driver assumes.
    VerificationFailed { written: u8, read_back: u8 },
}

/// Microsecond timestamps used for conversion throttling.
pub type Instant = fugit::TimerInstantU64<1_000_000>;

/// A monotonic time source with microsecond resolution.
pub trait Clock {
    fn now(&mut self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now(&mut self) -> Instant {
        (**self).now()
    }
}
