use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::pin::{
    Mock as PinMock, State as PinState, Transaction as PinTransaction,
};
use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
use unofficial_max31856::{
    Averaging, Clock, Config, ConversionMode, Instant, Max31856, NoiseFilter, ThermocoupleType,
};

struct StepClock {
    now: u64,
    step: u64,
}

impl Clock for StepClock {
    fn now(&mut self) -> Instant {
        self.now += self.step;
        Instant::from_ticks(self.now)
    }
}

fn read(
    spi: &mut Vec<SpiTransaction<u8>>,
    cs: &mut Vec<PinTransaction>,
    address: u8,
    value: u8,
) {
    cs.push(PinTransaction::set(PinState::Low));
    spi.push(SpiTransaction::transfer_in_place(
        vec![address, 0x00],
        vec![0x00, value],
    ));
    spi.push(SpiTransaction::flush());
    cs.push(PinTransaction::set(PinState::High));
}

fn write(
    spi: &mut Vec<SpiTransaction<u8>>,
    cs: &mut Vec<PinTransaction>,
    address: u8,
    value: u8,
) {
    cs.push(PinTransaction::set(PinState::Low));
    spi.push(SpiTransaction::write_vec(vec![address, value]));
    spi.push(SpiTransaction::flush());
    cs.push(PinTransaction::set(PinState::High));
}

#[test]
fn configure_and_read() {
    let mut spi = Vec::new();
    let mut cs = Vec::new();

    // thermocouple type T
    read(&mut spi, &mut cs, 0x01, 0x03);
    write(&mut spi, &mut cs, 0x81, 0x07);
    read(&mut spi, &mut cs, 0x01, 0x07);
    // 50 Hz
    read(&mut spi, &mut cs, 0x00, 0x00);
    write(&mut spi, &mut cs, 0x80, 0x01);
    read(&mut spi, &mut cs, 0x00, 0x01);
    // 2 samples
    read(&mut spi, &mut cs, 0x01, 0x07);
    write(&mut spi, &mut cs, 0x81, 0x17);
    read(&mut spi, &mut cs, 0x01, 0x17);
    // continuous
    read(&mut spi, &mut cs, 0x00, 0x01);
    write(&mut spi, &mut cs, 0x80, 0x81);
    read(&mut spi, &mut cs, 0x00, 0x81);

    // first reading, no fault
    read(&mut spi, &mut cs, 0x0F, 0x00);
    read(&mut spi, &mut cs, 0x0C, 0xFF);
    read(&mut spi, &mut cs, 0x0D, 0xF0);
    read(&mut spi, &mut cs, 0x0E, 0x00);

    // cold junction
    read(&mut spi, &mut cs, 0x0A, 0x19);
    read(&mut spi, &mut cs, 0x0B, 0x80);

    let spi_mock = SpiMock::new(&spi);
    let pin_mock = PinMock::new(&cs);
    let config = Config::default()
        .with_thermocouple_type(ThermocoupleType::T)
        .with_filter(NoiseFilter::Hz50)
        .with_averaging(Averaging::Samples2)
        .with_conversion_mode(ConversionMode::Continuous);

    // one second between samples of the clock
    let clock = StepClock {
        now: 0,
        step: 1_000_000,
    };
    let mut max31856 = Max31856::new(spi_mock, pin_mock, &mut NoopDelay::new(), clock, config);

    assert!(max31856.is_initialized());
    assert_eq!(max31856.thermocouple_type(), ThermocoupleType::T);
    assert_eq!(max31856.read_thermocouple().unwrap(), -1.0);
    assert_eq!(max31856.conversion_delay().to_micros(), 138_000);
    assert_eq!(max31856.read_cold_junction().unwrap(), 25.5);

    let (mut spi_mock, mut pin_mock, _) = max31856.release();
    spi_mock.done();
    pin_mock.done();
}

#[test]
fn raw_encodings_are_validated() {
    assert!(ThermocoupleType::try_from(0x0A_u8).is_err());
    assert!(Averaging::try_from(0x70_u8).is_err());
    assert_eq!(
        ThermocoupleType::try_from(0x07_u8).ok(),
        Some(ThermocoupleType::T)
    );
}
