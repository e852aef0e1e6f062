//! Per-command sensor sessions
//!
//! [`ScopedSensors`] opens the bus or data line a command needs, uses it,
//! and lets it drop before returning. No session outlives the command that
//! opened it, on success or failure.

use embedded_hal::delay::DelayNs;

use pinwire_core::traits::{HumidityReading, SensorAdapter, SensorError};
use pinwire_hal::{DhtFactory, OneWireFactory};

use super::dht::{Dht, DhtKind};
use super::ds18b20::{convert_all, Ds18b20, Resolution};
use super::onewire::find_device;

/// Wait after claiming a one-wire bus before talking to it
pub const BUS_SETTLE_MS: u32 = 200;

/// Resolution one-wire probes are read at
pub const ONE_WIRE_RESOLUTION: Resolution = Resolution::Bits9;

/// [`SensorAdapter`] over HAL bus factories
pub struct ScopedSensors<OW, DH, D> {
    one_wire: OW,
    dht: DH,
    delay: D,
}

impl<OW, DH, D> ScopedSensors<OW, DH, D>
where
    OW: OneWireFactory,
    DH: DhtFactory,
    D: DelayNs,
{
    pub fn new(one_wire: OW, dht: DH, delay: D) -> Self {
        Self {
            one_wire,
            dht,
            delay,
        }
    }

    pub fn one_wire(&self) -> &OW {
        &self.one_wire
    }

    pub fn dht(&self) -> &DH {
        &self.dht
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }
}

impl<OW, DH, D> SensorAdapter for ScopedSensors<OW, DH, D>
where
    OW: OneWireFactory,
    DH: DhtFactory,
    D: DelayNs,
{
    fn one_wire_celsius(&mut self, bus_pin: u8, index: u16) -> Result<f32, SensorError> {
        let mut bus = self.one_wire.open(bus_pin);
        self.delay.delay_ms(BUS_SETTLE_MS);

        let mut sensor = Ds18b20::new(find_device(&mut bus, index)?);
        sensor.set_resolution(&mut bus, ONE_WIRE_RESOLUTION)?;
        convert_all(&mut bus)?;
        self.delay.delay_ms(ONE_WIRE_RESOLUTION.conversion_ms());
        sensor.read_celsius(&mut bus)
    }

    fn humidity_temperature(
        &mut self,
        pin: u8,
        kind: u16,
    ) -> Result<HumidityReading, SensorError> {
        let kind = DhtKind::from_code(kind).ok_or(SensorError::UnsupportedKind)?;
        let mut line = self.dht.open(pin);
        Dht::new(kind).read(&mut line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::fake::{FakeDelay, FakeDevice, FakeDht, FakeOneWire, Sessions};
    use pinwire_hal::DhtLineError;

    const BUS_PIN: u8 = 4;

    fn sensors(
        devices: &[FakeDevice],
        dht_frame: Result<[u8; 5], DhtLineError>,
    ) -> ScopedSensors<FakeOneWire, FakeDht, FakeDelay> {
        ScopedSensors::new(
            FakeOneWire::new(BUS_PIN, devices),
            FakeDht::new(dht_frame),
            FakeDelay::default(),
        )
    }

    fn balanced(sessions: Sessions, opened: usize) -> bool {
        sessions.opened == opened && sessions.released == opened
    }

    #[test]
    fn test_one_wire_read() {
        let mut s = sensors(
            &[FakeDevice::new(0x01, 21.7), FakeDevice::new(0x02, 30.0)],
            Err(DhtLineError::NoResponse),
        );

        // Index 0 is serial 0x02 in search order
        assert_eq!(s.one_wire_celsius(BUS_PIN, 0), Ok(30.0));
        // 21.7 truncated to 9 bits
        assert_eq!(s.one_wire_celsius(BUS_PIN, 1), Ok(21.5));

        assert!(balanced(s.one_wire().sessions, 2));
        assert_eq!(s.delay().ms, [200, 93, 200, 93]);
        assert!(s.one_wire().bus.devices.iter().all(|d| d.config == 0x1F));
    }

    #[test]
    fn test_one_wire_missing_index() {
        let mut s = sensors(&[FakeDevice::new(0x01, 20.0)], Err(DhtLineError::NoResponse));
        assert_eq!(
            s.one_wire_celsius(BUS_PIN, 3),
            Err(SensorError::NoDevice)
        );
        assert!(balanced(s.one_wire().sessions, 1));
    }

    #[test]
    fn test_one_wire_wrong_pin() {
        let mut s = sensors(&[FakeDevice::new(0x01, 20.0)], Err(DhtLineError::NoResponse));
        assert_eq!(s.one_wire_celsius(9, 0), Err(SensorError::NoDevice));
        assert!(balanced(s.one_wire().sessions, 1));
    }

    #[test]
    fn test_one_wire_crc_failure_releases_bus() {
        let mut device = FakeDevice::new(0x01, 20.0);
        device.corrupt = true;
        let mut s = sensors(&[device], Err(DhtLineError::NoResponse));
        assert_eq!(
            s.one_wire_celsius(BUS_PIN, 0),
            Err(SensorError::CrcMismatch)
        );
        assert!(balanced(s.one_wire().sessions, 1));
    }

    #[test]
    fn test_humidity_read() {
        let mut s = sensors(&[], Ok([0x02, 0x8C, 0x01, 0x5F, 0xEE]));
        let reading = s.humidity_temperature(14, 22).unwrap();
        assert!((reading.humidity - 65.2).abs() < 0.001);
        assert!((reading.temperature - 35.1).abs() < 0.001);
        assert_eq!(s.dht().pins, [14]);
        assert!(balanced(s.dht().sessions, 1));
    }

    #[test]
    fn test_humidity_failure_releases_line() {
        let mut s = sensors(&[], Err(DhtLineError::Timeout));
        assert_eq!(s.humidity_temperature(14, 11), Err(SensorError::Timeout));
        assert!(balanced(s.dht().sessions, 1));
    }

    #[test]
    fn test_humidity_unknown_kind_opens_nothing() {
        let mut s = sensors(&[], Ok([0; 5]));
        assert_eq!(
            s.humidity_temperature(14, 2),
            Err(SensorError::UnsupportedKind)
        );
        assert!(balanced(s.dht().sessions, 0));
    }
}
