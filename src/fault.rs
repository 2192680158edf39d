//! Fault Status Register (SR) decoding.

use num_enum::IntoPrimitive;

pub const SR_CJ_RANGE: u8 = 0x80;
pub const SR_TC_RANGE: u8 = 0x40;
pub const SR_CJ_HIGH: u8 = 0x20;
pub const SR_CJ_LOW: u8 = 0x10;
pub const SR_TC_HIGH: u8 = 0x08;
pub const SR_TC_LOW: u8 = 0x04;
pub const SR_OVUV: u8 = 0x02;
pub const SR_OPEN: u8 = 0x01;

/// Every flag of the fault status register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultStatus {
    /// Cold-junction temperature outside the operating range
    pub cold_junction_range: bool,
    /// Thermocouple temperature outside the range of the selected type
    pub thermocouple_range: bool,
    pub cold_junction_high: bool,
    pub cold_junction_low: bool,
    pub thermocouple_high: bool,
    pub thermocouple_low: bool,
    /// Input over- or undervoltage
    pub over_under_voltage: bool,
    pub open_circuit: bool,
}

impl FaultStatus {
    #[must_use]
    pub fn from_register(reg: u8) -> Self {
        Self {
            cold_junction_range: (reg & SR_CJ_RANGE) != 0,
            thermocouple_range: (reg & SR_TC_RANGE) != 0,
            cold_junction_high: (reg & SR_CJ_HIGH) != 0,
            cold_junction_low: (reg & SR_CJ_LOW) != 0,
            thermocouple_high: (reg & SR_TC_HIGH) != 0,
            thermocouple_low: (reg & SR_TC_LOW) != 0,
            over_under_voltage: (reg & SR_OVUV) != 0,
            open_circuit: (reg & SR_OPEN) != 0,
        }
    }

    #[must_use]
    pub fn has_fault(&self) -> bool {
        self.cold_junction_range
            || self.thermocouple_range
            || self.cold_junction_high
            || self.cold_junction_low
            || self.thermocouple_high
            || self.thermocouple_low
            || self.over_under_voltage
            || self.open_circuit
    }
}

/// Severity of a threshold fault for one sensor.  `u8::from` gives the numeric code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ThresholdFault {
    #[default]
    None = 0,
    /// Above the high threshold, within the natural range
    High = 1,
    /// Below the low threshold, within the natural range
    Low = 2,
    /// Outside the natural range, no threshold flag
    OutOfRange = 3,
    OutOfRangeHigh = 4,
    OutOfRangeLow = 5,
}

impl ThresholdFault {
    fn classify(reg: u8, range: u8, high: u8, low: u8) -> Self {
        let out_of_range = reg & range != 0;
        match (out_of_range, reg & high != 0, reg & low != 0) {
            (false, true, _) => Self::High,
            (false, false, true) => Self::Low,
            (false, false, false) => Self::None,
            (true, true, _) => Self::OutOfRangeHigh,
            (true, false, true) => Self::OutOfRangeLow,
            (true, false, false) => Self::OutOfRange,
        }
    }

    /// Classifies the thermocouple bits (TC range, TC high, TC low) of a status byte.
    #[must_use]
    pub fn thermocouple(reg: u8) -> Self {
        Self::classify(reg, SR_TC_RANGE, SR_TC_HIGH, SR_TC_LOW)
    }

    /// Classifies the cold-junction bits (CJ range, CJ high, CJ low) of a status byte.
    #[must_use]
    pub fn cold_junction(reg: u8) -> Self {
        Self::classify(reg, SR_CJ_RANGE, SR_CJ_HIGH, SR_CJ_LOW)
    }

    #[must_use]
    pub fn is_fault(self) -> bool {
        self != Self::None
    }
}
