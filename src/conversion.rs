//! Encoding and decoding of the fixed-point register formats, and the conversion timing table.

use crate::config::{Averaging, ConversionMode, NoiseFilter};
use fixed::types::{I25F7, I8F8};
use fugit::MicrosDurationU64;

/// Decodes LTCBH, LTCBM and LTCBL.
///
/// The 19-bit two's complement temperature sits in the top of the three bytes with 7 fractional
/// bits.  Placing the bytes in the upper 24 bits of an `i32` and shifting arithmetically keeps the
/// sign.
#[must_use]
pub fn thermocouple_from(bytes: [u8; 3]) -> I25F7 {
    I25F7::from_bits(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], 0]) >> 13_i32)
}

/// Decodes CJTH and CJTL, 1 LSB = 2^-8 °C.
#[must_use]
pub fn cold_junction_from(bytes: [u8; 2]) -> I8F8 {
    I8F8::from_bits(i16::from_be_bytes(bytes))
}

pub const COLD_JUNCTION_OFFSET_MIN: f32 = -8.0;
pub const COLD_JUNCTION_OFFSET_MAX: f32 = 7.9375;

/// Encodes a CJTO value, 1 LSB = 2^-4 °C.  `None` when outside `-8.0..=7.9375` or NaN.
#[must_use]
pub fn cold_junction_offset_to(celsius: f32) -> Option<u8> {
    if !(COLD_JUNCTION_OFFSET_MIN..=COLD_JUNCTION_OFFSET_MAX).contains(&celsius) {
        return None;
    }
    Some(cast::i8(libm::roundf(celsius * 16.0)).ok()?.to_be_bytes()[0])
}

/// Encodes a thermocouple fault threshold as `round(celsius * 4)` split into high and low bytes.
/// `None` when the result does not fit 16 bits.
#[must_use]
pub fn thermocouple_threshold_to(celsius: f32) -> Option<[u8; 2]> {
    cast::i16(libm::roundf(celsius * 4.0))
        .ok()
        .map(i16::to_be_bytes)
}

const COLD_JUNCTION_CONVERSION_US: u64 = 25_000;

/// Minimum time between triggering a conversion and its result being valid.
///
/// `converted` is set once a continuous conversion has completed since the last trigger, after
/// which each extra sample only costs half as long.
#[must_use]
pub fn conversion_delay(
    filter: NoiseFilter,
    averaging: Averaging,
    mode: ConversionMode,
    converted: bool,
    cold_junction_enabled: bool,
) -> MicrosDurationU64 {
    let settled = mode == ConversionMode::Continuous && converted;
    let (base, per_sample) = match (filter, settled) {
        (NoiseFilter::Hz60, false) => (82_000, 33_330),
        (NoiseFilter::Hz60, true) => (82_000, 16_670),
        (NoiseFilter::Hz50, false) => (98_000, 40_000),
        (NoiseFilter::Hz50, true) => (98_000, 20_000),
    };
    let mut micros: u64 = base + per_sample * u64::from(averaging.samples() - 1);
    if !cold_junction_enabled {
        micros -= COLD_JUNCTION_CONVERSION_US;
    }
    MicrosDurationU64::micros(micros)
}
