//! # Driver for the MAX31856 Precision Thermocouple to Digital Converter
//!
//! ## External Links
//!
//! - [Datasheet]
//!
//! [Datasheet]: https://www.analog.com/media/en/technical-documentation/data-sheets/MAX31856.pdf

use crate::config::{
    Averaging, ColdJunction, Config, ConversionMode, FaultClear, FaultMode, FaultSource,
    NoiseFilter, OneShot, OpenCircuitDetection, ThermocoupleType,
};
use crate::conversion::{
    cold_junction_from, cold_junction_offset_to, conversion_delay, thermocouple_from,
    thermocouple_threshold_to,
};
use crate::fault::{FaultStatus, ThresholdFault};
use crate::registers::{self, Field, Register};
use crate::{Clock, Error, Instant};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use fugit::MicrosDurationU64;

const POWER_ON_DELAY_MS: u32 = 1000;

type DriverError<SPI, CS> = Error<
    <SPI as embedded_hal::spi::ErrorType>::Error,
    <CS as embedded_hal::digital::ErrorType>::Error,
>;

/// The MAX31856 driver
///
/// Typical usage:
///
/// 1. Configure an [`SpiBus`] for [`crate::MODE`]
/// 2. Create an instance through [`Max31856::new`]
/// 3. Read temperatures with [`Max31856::read_thermocouple`] and
///    [`Max31856::read_cold_junction`]
///
/// The driver keeps a copy of the configuration it has written.  A copy is only updated once the
/// device has confirmed the write.
pub struct Max31856<SPI, CS, CLOCK> {
    spi: SPI,
    cs: CS,
    clock: CLOCK,
    thermocouple_type: ThermocoupleType,
    filter: NoiseFilter,
    averaging: Averaging,
    conversion_mode: ConversionMode,
    cold_junction_enabled: bool,
    initialized: bool,
    last_conversion: Instant,
    conversion_delay: MicrosDurationU64,
    continuous_read_count: u32,
    last_thermocouple: f32,
    last_threshold_fault: ThresholdFault,
}

impl<SPI: SpiBus, CS: OutputPin, CLOCK: Clock> Max31856<SPI, CS, CLOCK> {
    /// Returns a new driver instance with `config` applied.
    ///
    /// Thermocouple type, noise filter, averaging and conversion mode are written in that order.
    /// If any of them fails the instance is left uninitialized for good:
    /// [`Max31856::read_thermocouple`] then always yields NaN.  Construction blocks for one
    /// second afterwards while the device finishes powering up.
    pub fn new<DELAY: DelayNs>(
        spi: SPI,
        cs: CS,
        delay: &mut DELAY,
        clock: CLOCK,
        config: Config,
    ) -> Self {
        let defaults = Config::default();
        let mut max31856 = Self {
            spi,
            cs,
            clock,
            thermocouple_type: defaults.thermocouple_type,
            filter: defaults.filter,
            averaging: defaults.averaging,
            conversion_mode: defaults.conversion_mode,
            cold_junction_enabled: true,
            initialized: false,
            last_conversion: Instant::from_ticks(0),
            conversion_delay: MicrosDurationU64::from_ticks(0),
            continuous_read_count: 0,
            last_thermocouple: 0.0,
            last_threshold_fault: ThresholdFault::None,
        };

        // every write is attempted even after a failure
        let initialized = max31856
            .set_thermocouple_type(config.thermocouple_type)
            .is_ok()
            & max31856.set_filter(config.filter).is_ok()
            & max31856.set_averaging(config.averaging).is_ok()
            & max31856.set_conversion_mode(config.conversion_mode).is_ok();
        max31856.initialized = initialized;
        #[cfg(feature = "defmt")]
        if !initialized {
            defmt::error!("MAX31856 configuration failed, thermocouple readings disabled");
        }

        max31856.last_conversion = max31856.clock.now();
        delay.delay_ms(POWER_ON_DELAY_MS);
        max31856.conversion_delay = max31856.current_conversion_delay();
        max31856
    }

    /// Gives back the bus, chip select and clock.
    pub fn release(self) -> (SPI, CS, CLOCK) {
        (self.spi, self.cs, self.clock)
    }

    fn select(&mut self) -> Result<(), DriverError<SPI, CS>> {
        self.cs.set_low().map_err(Error::PinError)
    }

    fn deselect(&mut self) -> Result<(), DriverError<SPI, CS>> {
        self.cs.set_high().map_err(Error::PinError)
    }

    fn read_byte(&mut self, register: Register) -> Result<u8, DriverError<SPI, CS>> {
        let mut data: [u8; 2] = [register.read_address, 0x00];
        self.select()?;
        let result = self
            .spi
            .transfer_in_place(&mut data)
            .and_then(|()| self.spi.flush());
        let deselect = self.deselect();
        result.map_err(Error::SpiError)?;
        deselect?;
        Ok(data[1])
    }

    fn write_byte(&mut self, register: Register, value: u8) -> Result<(), DriverError<SPI, CS>> {
        self.select()?;
        let result = self
            .spi
            .write(&[register.write_address, value])
            .and_then(|()| self.spi.flush());
        let deselect = self.deselect();
        result.map_err(Error::SpiError)?;
        deselect
    }

    /// Clears the bits of `register` outside `clear_mask`, merges in `value`, and checks the
    /// device holds the result.
    fn read_modify_write(
        &mut self,
        register: Register,
        clear_mask: u8,
        value: u8,
    ) -> Result<(), DriverError<SPI, CS>> {
        let written = (self.read_byte(register)? & clear_mask) | value;
        self.write_byte(register, written)?;
        let read_back = self.read_byte(register)?;
        if read_back == written {
            Ok(())
        } else {
            Err(Error::VerificationFailed { written, read_back })
        }
    }

    fn set_field<F: Field>(&mut self, value: F) -> Result<(), DriverError<SPI, CS>> {
        self.read_modify_write(F::REGISTER, F::clear_mask(), value.into())
    }

    pub fn set_thermocouple_type(
        &mut self,
        thermocouple_type: ThermocoupleType,
    ) -> Result<(), DriverError<SPI, CS>> {
        self.set_field(thermocouple_type)?;
        self.thermocouple_type = thermocouple_type;
        Ok(())
    }

    pub fn set_filter(&mut self, filter: NoiseFilter) -> Result<(), DriverError<SPI, CS>> {
        self.set_field(filter)?;
        self.filter = filter;
        Ok(())
    }

    pub fn set_averaging(&mut self, averaging: Averaging) -> Result<(), DriverError<SPI, CS>> {
        self.set_field(averaging)?;
        self.averaging = averaging;
        Ok(())
    }

    /// Switching mode restarts the count of continuous conversions, so the next reading waits for
    /// a full conversion.
    pub fn set_conversion_mode(
        &mut self,
        conversion_mode: ConversionMode,
    ) -> Result<(), DriverError<SPI, CS>> {
        self.set_field(conversion_mode)?;
        self.conversion_mode = conversion_mode;
        self.continuous_read_count = 0;
        Ok(())
    }

    /// Starts a single conversion.  Only meaningful in [`ConversionMode::OnDemand`].
    pub fn trigger_one_shot(&mut self) -> Result<(), DriverError<SPI, CS>> {
        self.set_field(OneShot::Convert)
    }

    pub fn set_open_circuit_detection(
        &mut self,
        detection: OpenCircuitDetection,
    ) -> Result<(), DriverError<SPI, CS>> {
        self.set_field(detection)
    }

    /// Disabling the internal cold-junction sensor shortens conversions by 25 ms.
    pub fn set_cold_junction(
        &mut self,
        cold_junction: ColdJunction,
    ) -> Result<(), DriverError<SPI, CS>> {
        self.set_field(cold_junction)?;
        self.cold_junction_enabled = cold_junction == ColdJunction::Enabled;
        Ok(())
    }

    pub fn set_fault_mode(&mut self, fault_mode: FaultMode) -> Result<(), DriverError<SPI, CS>> {
        self.set_field(fault_mode)
    }

    pub fn set_fault_clear(
        &mut self,
        fault_clear: FaultClear,
    ) -> Result<(), DriverError<SPI, CS>> {
        self.set_field(fault_clear)
    }

    /// Pulses the fault clear bit, resetting latched faults in [`FaultMode::Interrupt`].
    pub fn clear_faults(&mut self) -> Result<(), DriverError<SPI, CS>> {
        self.set_fault_clear(FaultClear::Clear)?;
        self.set_fault_clear(FaultClear::Idle)
    }

    /// Masks (`masked = true`) or unmasks a fault source from asserting the FAULT pin.
    pub fn set_fault_mask(
        &mut self,
        source: FaultSource,
        masked: bool,
    ) -> Result<(), DriverError<SPI, CS>> {
        self.read_modify_write(
            FaultSource::REGISTER,
            source.clear_mask(),
            source.encode(masked),
        )
    }

    /// Cold-junction high fault threshold, 1 °C resolution
    pub fn set_cold_junction_high_threshold(
        &mut self,
        celsius: i8,
    ) -> Result<(), DriverError<SPI, CS>> {
        self.write_byte(registers::CJHF, celsius.to_be_bytes()[0])
    }

    /// Cold-junction low fault threshold, 1 °C resolution
    pub fn set_cold_junction_low_threshold(
        &mut self,
        celsius: i8,
    ) -> Result<(), DriverError<SPI, CS>> {
        self.write_byte(registers::CJLF, celsius.to_be_bytes()[0])
    }

    /// # Errors
    ///
    /// [`Error::ArgumentError`] when `celsius * 4` does not fit 16 bits.
    pub fn set_thermocouple_high_threshold(
        &mut self,
        celsius: f32,
    ) -> Result<(), DriverError<SPI, CS>> {
        let [high, low] = thermocouple_threshold_to(celsius).ok_or(Error::ArgumentError)?;
        self.write_byte(registers::LTHFTH, high)?;
        self.write_byte(registers::LTHFTL, low)
    }

    /// # Errors
    ///
    /// [`Error::ArgumentError`] when `celsius * 4` does not fit 16 bits.
    pub fn set_thermocouple_low_threshold(
        &mut self,
        celsius: f32,
    ) -> Result<(), DriverError<SPI, CS>> {
        let [high, low] = thermocouple_threshold_to(celsius).ok_or(Error::ArgumentError)?;
        self.write_byte(registers::LTLFTH, high)?;
        self.write_byte(registers::LTLFTL, low)
    }

    /// Offset added to the measured cold-junction temperature, 1/16 °C resolution.
    ///
    /// # Errors
    ///
    /// [`Error::ArgumentError`] outside `-8.0..=7.9375`.
    pub fn set_cold_junction_offset(&mut self, celsius: f32) -> Result<(), DriverError<SPI, CS>> {
        let offset = cold_junction_offset_to(celsius).ok_or(Error::ArgumentError)?;
        self.write_byte(registers::CJTO, offset)
    }

    fn current_conversion_delay(&self) -> MicrosDurationU64 {
        conversion_delay(
            self.filter,
            self.averaging,
            self.conversion_mode,
            self.continuous_read_count != 0,
            self.cold_junction_enabled,
        )
    }

    /// Reads the linearized thermocouple temperature in °C.
    ///
    /// In [`ConversionMode::OnDemand`] a one-shot conversion is triggered first.  The registers are
    /// only read when no fault is flagged and the conversion delay has passed since the previous
    /// reading.  Otherwise the previous value is returned and the thermocouple threshold fault is
    /// recorded in [`Max31856::last_threshold_fault`].
    ///
    /// Returns NaN without touching the bus if construction failed to configure the device.
    pub fn read_thermocouple(&mut self) -> Result<f32, DriverError<SPI, CS>> {
        if !self.initialized {
            return Ok(f32::NAN);
        }
        if self.conversion_mode == ConversionMode::OnDemand {
            self.trigger_one_shot()?;
            self.continuous_read_count = 0;
        }
        self.conversion_delay = self.current_conversion_delay();

        if !self.connection_fault()? {
            let now = self.clock.now();
            // a clock behind the last conversion has wrapped
            let settled = now
                .checked_duration_since(self.last_conversion)
                .map_or(true, |elapsed| elapsed > self.conversion_delay);
            if settled {
                let bytes = [
                    self.read_byte(registers::LTCBH)?,
                    self.read_byte(registers::LTCBM)?,
                    self.read_byte(registers::LTCBL)?,
                ];
                self.last_conversion = now;
                self.last_thermocouple = thermocouple_from(bytes).to_num();
                return Ok(self.last_thermocouple);
            }
        }

        self.continuous_read_count = self.continuous_read_count.saturating_add(1);
        self.last_threshold_fault = self.thermocouple_threshold_fault()?;
        Ok(self.last_thermocouple)
    }

    /// Reads the cold-junction temperature in °C.
    pub fn read_cold_junction(&mut self) -> Result<f32, DriverError<SPI, CS>> {
        let bytes = [
            self.read_byte(registers::CJTH)?,
            self.read_byte(registers::CJTL)?,
        ];
        Ok(cold_junction_from(bytes).to_num())
    }

    /// `true` when any fault status bit is set.
    pub fn connection_fault(&mut self) -> Result<bool, DriverError<SPI, CS>> {
        Ok(self.read_byte(registers::SR)? != 0)
    }

    pub fn fault_status(&mut self) -> Result<FaultStatus, DriverError<SPI, CS>> {
        Ok(FaultStatus::from_register(self.read_byte(registers::SR)?))
    }

    pub fn thermocouple_threshold_fault(
        &mut self,
    ) -> Result<ThresholdFault, DriverError<SPI, CS>> {
        let fault = ThresholdFault::thermocouple(self.read_byte(registers::SR)?);
        #[cfg(feature = "defmt")]
        if fault.is_fault() {
            defmt::warn!("thermocouple threshold fault: {}", fault);
        }
        Ok(fault)
    }

    pub fn cold_junction_threshold_fault(
        &mut self,
    ) -> Result<ThresholdFault, DriverError<SPI, CS>> {
        let fault = ThresholdFault::cold_junction(self.read_byte(registers::SR)?);
        #[cfg(feature = "defmt")]
        if fault.is_fault() {
            defmt::warn!("cold junction threshold fault: {}", fault);
        }
        Ok(fault)
    }

    /// Reads all 16 registers, indexed by read address.
    pub fn read_registers(&mut self) -> Result<[u8; registers::COUNT], DriverError<SPI, CS>> {
        let mut data = [0; registers::COUNT];
        for (address, byte) in (0_u8..).zip(data.iter_mut()) {
            *byte = self.read_byte(Register::new(address))?;
        }
        Ok(data)
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub fn thermocouple_type(&self) -> ThermocoupleType {
        self.thermocouple_type
    }

    #[must_use]
    pub fn voltage_mode(&self) -> bool {
        self.thermocouple_type.is_voltage_mode()
    }

    #[must_use]
    pub fn filter(&self) -> NoiseFilter {
        self.filter
    }

    #[must_use]
    pub fn averaging(&self) -> Averaging {
        self.averaging
    }

    #[must_use]
    pub fn conversion_mode(&self) -> ConversionMode {
        self.conversion_mode
    }

    #[must_use]
    pub fn cold_junction_enabled(&self) -> bool {
        self.cold_junction_enabled
    }

    /// The delay computed for the most recent thermocouple reading.
    #[must_use]
    pub fn conversion_delay(&self) -> MicrosDurationU64 {
        self.conversion_delay
    }

    /// Threshold fault seen the last time a thermocouple reading fell back to the previous value.
    #[must_use]
    pub fn last_threshold_fault(&self) -> ThresholdFault {
        self.last_threshold_fault
    }
}
