//! Typed configuration fields of the two control registers and the fault mask register.
//!
//! Each enum's discriminants are the encoded bits in position, so raw register values can be
//! parsed with `TryFrom<u8>`.  Anything outside the listed encodings is rejected.

use crate::registers::{self, Field, Register, CR0, CR1};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// CR0 bit 7
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ConversionMode {
    /// Normally off.  Each reading needs a one-shot trigger.
    #[default]
    OnDemand = 0x00,
    /// Automatic conversion, roughly every 100 ms.
    Continuous = 0x80,
}

impl Field for ConversionMode {
    const REGISTER: Register = CR0;
    const MASK: u8 = 0b1000_0000;
}

/// CR0 bit 6
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OneShot {
    Idle = 0x00,
    Convert = 0x40,
}

impl Field for OneShot {
    const REGISTER: Register = CR0;
    const MASK: u8 = 0b0100_0000;
}

/// CR0 bits 5:4
///
/// The variant to pick depends on the source resistance and time constant of the thermocouple
/// and its input filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OpenCircuitDetection {
    Disabled = 0x00,
    /// Source resistance below 5 kΩ
    LowResistance = 0x10,
    /// Source resistance 40 kΩ or more, time constant below 2 ms
    ShortTimeConstant = 0x20,
    /// Source resistance 40 kΩ or more, time constant above 2 ms
    LongTimeConstant = 0x30,
}

impl Field for OpenCircuitDetection {
    const REGISTER: Register = CR0;
    const MASK: u8 = 0b0011_0000;
}

/// CR0 bit 3
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ColdJunction {
    #[default]
    Enabled = 0x00,
    Disabled = 0x08,
}

impl Field for ColdJunction {
    const REGISTER: Register = CR0;
    const MASK: u8 = 0b0000_1000;
}

/// CR0 bit 2
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FaultMode {
    /// Fault bits follow the fault condition.
    Comparator = 0x00,
    /// Fault bits latch until cleared with [`FaultClear::Clear`].
    Interrupt = 0x04,
}

impl Field for FaultMode {
    const REGISTER: Register = CR0;
    const MASK: u8 = 0b0000_0100;
}

/// CR0 bit 1
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FaultClear {
    Idle = 0x00,
    Clear = 0x02,
}

impl Field for FaultClear {
    const REGISTER: Register = CR0;
    const MASK: u8 = 0b0000_0010;
}

/// CR0 bit 0, mains noise rejection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum NoiseFilter {
    #[default]
    Hz60 = 0x00,
    Hz50 = 0x01,
}

impl Field for NoiseFilter {
    const REGISTER: Register = CR0;
    const MASK: u8 = 0b0000_0001;
}

/// CR1 bits 6:4, thermocouple voltage samples averaged per conversion
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Averaging {
    #[default]
    Samples1 = 0x00,
    Samples2 = 0x10,
    Samples4 = 0x20,
    Samples8 = 0x30,
    Samples16 = 0x40,
}

impl Averaging {
    /// Number of samples averaged, `2^field`.
    #[must_use]
    pub fn samples(self) -> u8 {
        1 << (u8::from(self) >> 4)
    }
}

impl Field for Averaging {
    const REGISTER: Register = CR1;
    const MASK: u8 = 0b0111_0000;
}

/// CR1 bits 3:0
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ThermocoupleType {
    B = 0x00,
    E = 0x01,
    J = 0x02,
    #[default]
    K = 0x03,
    N = 0x04,
    R = 0x05,
    S = 0x06,
    T = 0x07,
    /// Voltage mode, gain 8.  No linearization is applied.
    VoltageGain8 = 0x08,
    /// Voltage mode, gain 32.  No linearization is applied.
    VoltageGain32 = 0x0C,
}

impl ThermocoupleType {
    #[must_use]
    pub fn is_voltage_mode(self) -> bool {
        matches!(self, Self::VoltageGain8 | Self::VoltageGain32)
    }
}

impl Field for ThermocoupleType {
    const REGISTER: Register = CR1;
    const MASK: u8 = 0b0000_1111;
}

/// A fault source that can be masked from asserting the FAULT pin (MASK register bits 5:0).
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FaultSource {
    ColdJunctionHigh = 0x20,
    ColdJunctionLow = 0x10,
    ThermocoupleHigh = 0x08,
    ThermocoupleLow = 0x04,
    OverUnderVoltage = 0x02,
    OpenCircuit = 0x01,
}

impl FaultSource {
    pub const REGISTER: Register = registers::MASK;

    /// Mask register bits for this source, `masked` meaning the FAULT pin ignores it.
    #[must_use]
    pub fn encode(self, masked: bool) -> u8 {
        if masked {
            u8::from(self)
        } else {
            0
        }
    }

    #[must_use]
    pub fn clear_mask(self) -> u8 {
        !u8::from(self)
    }
}

/// Settings applied when the driver is constructed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub thermocouple_type: ThermocoupleType,
    pub filter: NoiseFilter,
    pub averaging: Averaging,
    pub conversion_mode: ConversionMode,
}

impl Config {
    #[must_use]
    pub const fn with_thermocouple_type(mut self, thermocouple_type: ThermocoupleType) -> Self {
        self.thermocouple_type = thermocouple_type;
        self
    }

    #[must_use]
    pub const fn with_filter(mut self, filter: NoiseFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub const fn with_averaging(mut self, averaging: Averaging) -> Self {
        self.averaging = averaging;
        self
    }

    #[must_use]
    pub const fn with_conversion_mode(mut self, conversion_mode: ConversionMode) -> Self {
        self.conversion_mode = conversion_mode;
        self
    }
}

#[cfg(all(test, not(all(target_arch = "arm", target_os = "none"))))]
mod test {
    use super::*;

    #[test]
    pub fn averaging_samples() {
        assert_eq!(Averaging::Samples1.samples(), 1);
        assert_eq!(Averaging::Samples2.samples(), 2);
        assert_eq!(Averaging::Samples4.samples(), 4);
        assert_eq!(Averaging::Samples8.samples(), 8);
        assert_eq!(Averaging::Samples16.samples(), 16);
    }

    #[test]
    pub fn parse_rejects_unknown_encodings() {
        assert!(ThermocoupleType::try_from(0x09_u8).is_err());
        assert!(ThermocoupleType::try_from(0x0F_u8).is_err());
        assert!(Averaging::try_from(0x50_u8).is_err());
        assert!(Averaging::try_from(0x01_u8).is_err());
        assert!(NoiseFilter::try_from(0x02_u8).is_err());
        assert!(ConversionMode::try_from(0x01_u8).is_err());
        assert!(OpenCircuitDetection::try_from(0x40_u8).is_err());
        assert!(FaultSource::try_from(0x40_u8).is_err());
    }

    #[test]
    pub fn parse_accepts_known_encodings() {
        assert_eq!(
            ThermocoupleType::try_from(0x0C_u8).ok(),
            Some(ThermocoupleType::VoltageGain32)
        );
        assert_eq!(Averaging::try_from(0x40_u8).ok(), Some(Averaging::Samples16));
        assert_eq!(
            ConversionMode::try_from(0x80_u8).ok(),
            Some(ConversionMode::Continuous)
        );
    }

    #[test]
    pub fn values_fit_their_masks() {
        fn check<F: Field>(values: &[F]) {
            for value in values {
                let bits: u8 = (*value).into();
                assert_eq!(bits & F::clear_mask(), 0);
            }
        }
        check(&[ConversionMode::OnDemand, ConversionMode::Continuous]);
        check(&[OneShot::Idle, OneShot::Convert]);
        check(&[
            OpenCircuitDetection::Disabled,
            OpenCircuitDetection::LowResistance,
            OpenCircuitDetection::ShortTimeConstant,
            OpenCircuitDetection::LongTimeConstant,
        ]);
        check(&[ColdJunction::Enabled, ColdJunction::Disabled]);
        check(&[FaultMode::Comparator, FaultMode::Interrupt]);
        check(&[FaultClear::Idle, FaultClear::Clear]);
        check(&[NoiseFilter::Hz60, NoiseFilter::Hz50]);
        check(&[
            Averaging::Samples1,
            Averaging::Samples2,
            Averaging::Samples4,
            Averaging::Samples8,
            Averaging::Samples16,
        ]);
        check(&[
            ThermocoupleType::B,
            ThermocoupleType::E,
            ThermocoupleType::J,
            ThermocoupleType::K,
            ThermocoupleType::N,
            ThermocoupleType::R,
            ThermocoupleType::S,
            ThermocoupleType::T,
            ThermocoupleType::VoltageGain8,
            ThermocoupleType::VoltageGain32,
        ]);
    }

    #[test]
    pub fn voltage_mode() {
        assert!(ThermocoupleType::VoltageGain8.is_voltage_mode());
        assert!(ThermocoupleType::VoltageGain32.is_voltage_mode());
        assert!(!ThermocoupleType::K.is_voltage_mode());
    }

    #[test]
    pub fn fault_source_encoding() {
        assert_eq!(FaultSource::OpenCircuit.encode(true), 0x01);
        assert_eq!(FaultSource::OpenCircuit.encode(false), 0x00);
        assert_eq!(FaultSource::ColdJunctionHigh.clear_mask(), 0b1101_1111);
    }

    #[test]
    pub fn config_builder() {
        let config = Config::default()
            .with_thermocouple_type(ThermocoupleType::J)
            .with_filter(NoiseFilter::Hz50)
            .with_averaging(Averaging::Samples4)
            .with_conversion_mode(ConversionMode::Continuous);
        assert_eq!(config.thermocouple_type, ThermocoupleType::J);
        assert_eq!(config.filter, NoiseFilter::Hz50);
        assert_eq!(config.averaging, Averaging::Samples4);
        assert_eq!(config.conversion_mode, ConversionMode::Continuous);
    }
}
