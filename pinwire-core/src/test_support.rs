//! Host-side stand-ins for the board's collaborators

use core::convert::Infallible;
use std::collections::VecDeque;
use std::vec::Vec;

use embedded_io::{ErrorType, Read, ReadReady, Write};
use pinwire_hal::{AnalogIo, DigitalIo, Level, ModeRegisters, PinMode, PinModeControl, SystemInfo};

use crate::traits::{HumidityReading, SensorAdapter, SensorError};

const PINS: usize = 32;

/// GPIO with AVR-like register behavior
///
/// Writing a level sets the output latch, so driving an input high enables
/// its pull-up, as on the ATmega328P.
#[derive(Debug, Default)]
pub struct MockGpio {
    pub registers: [ModeRegisters; PINS],
    pub analog: [u16; PINS],
    /// Pins held low by something outside the board
    pub stuck_low: [bool; PINS],
    pub pwm_writes: Vec<(u8, u8)>,
    pub digital_writes: Vec<(u8, Level)>,
}

impl DigitalIo for MockGpio {
    fn digital_read(&mut self, pin: u8) -> Level {
        let pin = pin as usize;
        Level::from(self.registers[pin].output_latch && !self.stuck_low[pin])
    }

    fn digital_write(&mut self, pin: u8, level: Level) {
        self.digital_writes.push((pin, level));
        self.registers[pin as usize].output_latch = level.is_high();
    }
}

impl AnalogIo for MockGpio {
    fn analog_read(&mut self, channel: u8) -> u16 {
        self.analog[channel as usize]
    }

    fn analog_write(&mut self, pin: u8, duty: u8) {
        self.pwm_writes.push((pin, duty));
    }
}

impl PinModeControl for MockGpio {
    fn set_pin_mode(&mut self, pin: u8, mode: PinMode) {
        let regs = &mut self.registers[pin as usize];
        match mode {
            PinMode::Input => {
                regs.direction = false;
                regs.output_latch = false;
            }
            PinMode::InputPullup => {
                regs.direction = false;
                regs.output_latch = true;
            }
            PinMode::Output => regs.direction = true,
        }
    }

    fn mode_registers(&self, pin: u8) -> ModeRegisters {
        self.registers[pin as usize]
    }
}

/// Sensor adapter returning canned results and recording each request
#[derive(Debug)]
pub struct MockSensors {
    pub one_wire: Result<f32, SensorError>,
    pub humidity: Result<HumidityReading, SensorError>,
    pub one_wire_calls: Vec<(u8, u16)>,
    pub humidity_calls: Vec<(u8, u16)>,
}

impl Default for MockSensors {
    fn default() -> Self {
        Self {
            one_wire: Err(SensorError::NoDevice),
            humidity: Ok(HumidityReading::NAN),
            one_wire_calls: Vec::new(),
            humidity_calls: Vec::new(),
        }
    }
}

impl SensorAdapter for MockSensors {
    fn one_wire_celsius(&mut self, bus_pin: u8, index: u16) -> Result<f32, SensorError> {
        self.one_wire_calls.push((bus_pin, index));
        self.one_wire
    }

    fn humidity_temperature(
        &mut self,
        pin: u8,
        kind: u16,
    ) -> Result<HumidityReading, SensorError> {
        self.humidity_calls.push((pin, kind));
        self.humidity
    }
}

pub struct MockSystem {
    pub free: u32,
    pub now_ms: u32,
}

impl MockSystem {
    pub fn new(free: u32) -> Self {
        Self { free, now_ms: 0 }
    }
}

impl SystemInfo for MockSystem {
    fn free_memory(&self) -> u32 {
        self.free
    }

    fn uptime_ms(&self) -> u32 {
        self.now_ms
    }
}

/// Transport capturing everything written
#[derive(Debug, Default)]
pub struct Capture(pub Vec<u8>);

impl Capture {
    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap()
    }
}

impl ErrorType for Capture {
    type Error = Infallible;
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Serial port with a scripted receive queue
#[derive(Debug, Default)]
pub struct MockSerial {
    pub rx: VecDeque<u8>,
    pub tx: Capture,
    pub flushes: usize,
}

impl MockSerial {
    pub fn receive(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    pub fn sent(&self) -> &str {
        self.tx.text()
    }
}

impl ErrorType for MockSerial {
    type Error = Infallible;
}

impl Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut n = 0;
        while n < buf.len() {
            match self.rx.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

impl ReadReady for MockSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.rx.is_empty())
    }
}

impl Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.tx.write(buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}
