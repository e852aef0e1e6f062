//! Simulated one-wire devices, DHT line and delay for host tests

use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use pinwire_hal::{DhtFactory, DhtLine, DhtLineError, OneWireBus, OneWireFactory};

use super::ds18b20::{CONVERT_T, READ_SCRATCHPAD, WRITE_SCRATCHPAD};
use super::onewire::{crc8, MATCH_ROM, SEARCH_ROM, SKIP_ROM};

/// DS18B20 family code
const FAMILY: u8 = 0x28;

/// ROM code for a simulated device with the given serial byte
pub fn rom_for(serial: u8) -> [u8; 8] {
    let mut rom = [FAMILY, serial, 0, 0, 0, 0, 0, 0];
    rom[7] = crc8(&rom[..7]);
    rom
}

/// Simulated DS18B20
#[derive(Debug, Clone)]
pub struct FakeDevice {
    pub rom: [u8; 8],
    pub celsius: f32,
    pub raw: i16,
    pub alarm_high: u8,
    pub alarm_low: u8,
    pub config: u8,
    /// Scratchpad CRC is sent inverted
    pub corrupt: bool,
    pub conversions: usize,
}

impl FakeDevice {
    pub fn new(serial: u8, celsius: f32) -> Self {
        Self {
            rom: rom_for(serial),
            celsius,
            raw: 0x0550,
            alarm_high: 0x4B,
            alarm_low: 0x46,
            config: 0x7F,
            corrupt: false,
            conversions: 0,
        }
    }

    fn convert(&mut self) {
        let undefined = (1i16 << (3 - ((self.config >> 5) & 0x03))) - 1;
        self.raw = ((self.celsius * 16.0) as i16) & !undefined;
        self.conversions += 1;
    }

    fn scratchpad(&self) -> [u8; 9] {
        let [lsb, msb] = self.raw.to_le_bytes();
        let mut pad = [
            lsb,
            msb,
            self.alarm_high,
            self.alarm_low,
            self.config,
            0xFF,
            0x00,
            0x10,
            0,
        ];
        pad[8] = crc8(&pad[..8]);
        if self.corrupt {
            pad[8] = !pad[8];
        }
        pad
    }
}

#[derive(Debug)]
enum BusState {
    /// Expecting a ROM command
    Rom,
    /// Collecting a MATCH_ROM address
    Match(Vec<u8>),
    /// Search in progress at `bit`; `phase` 0 and 1 are the two reads, 2 the
    /// direction write
    Search { bit: usize, phase: u8 },
    /// Expecting a function command for the selected devices
    Function,
    /// Collecting WRITE_SCRATCHPAD bytes
    Write(Vec<u8>),
    /// Ignoring everything until the next reset
    Idle,
}

/// Bit-level one-wire bus with simulated devices
#[derive(Debug)]
pub struct FakeBus {
    pub devices: Vec<FakeDevice>,
    /// Devices still taking part in the current transaction
    selected: Vec<usize>,
    state: BusState,
    byte: u8,
    bits: u8,
    read_queue: Vec<bool>,
    pub resets: usize,
}

impl FakeBus {
    pub fn new(devices: &[FakeDevice]) -> Self {
        Self {
            devices: devices.to_vec(),
            selected: Vec::new(),
            state: BusState::Idle,
            byte: 0,
            bits: 0,
            read_queue: Vec::new(),
            resets: 0,
        }
    }

    fn rom_bit(&self, device: usize, bit: usize) -> bool {
        self.devices[device].rom[bit / 8] & (1 << (bit % 8)) != 0
    }

    fn queue_bytes(&mut self, bytes: &[u8]) {
        // Stored reversed so pop() yields LSB of the first byte first
        for &byte in bytes.iter().rev() {
            for i in (0..8).rev() {
                self.read_queue.push(byte & (1 << i) != 0);
            }
        }
    }

    fn on_byte(&mut self, byte: u8) {
        let state = core::mem::replace(&mut self.state, BusState::Idle);
        self.state = match state {
            BusState::Rom => match byte {
                SEARCH_ROM => BusState::Search { bit: 0, phase: 0 },
                MATCH_ROM => BusState::Match(Vec::new()),
                SKIP_ROM => BusState::Function,
                _ => BusState::Idle,
            },
            BusState::Match(mut rom) => {
                rom.push(byte);
                if rom.len() == 8 {
                    self.selected.retain(|&i| self.devices[i].rom[..] == rom[..]);
                    BusState::Function
                } else {
                    BusState::Match(rom)
                }
            }
            BusState::Function => match byte {
                READ_SCRATCHPAD => {
                    if let [only] = self.selected[..] {
                        let pad = self.devices[only].scratchpad();
                        self.queue_bytes(&pad);
                    }
                    BusState::Idle
                }
                WRITE_SCRATCHPAD => BusState::Write(Vec::new()),
                CONVERT_T => {
                    for &i in &self.selected {
                        self.devices[i].convert();
                    }
                    BusState::Idle
                }
                _ => BusState::Idle,
            },
            BusState::Write(mut bytes) => {
                bytes.push(byte);
                if bytes.len() == 3 {
                    for &i in &self.selected {
                        let device = &mut self.devices[i];
                        device.alarm_high = bytes[0];
                        device.alarm_low = bytes[1];
                        device.config = bytes[2];
                    }
                    BusState::Idle
                } else {
                    BusState::Write(bytes)
                }
            }
            other => other,
        };
    }
}

impl OneWireBus for FakeBus {
    fn reset(&mut self) -> bool {
        self.resets += 1;
        self.selected = (0..self.devices.len()).collect();
        self.state = BusState::Rom;
        self.byte = 0;
        self.bits = 0;
        self.read_queue.clear();
        !self.devices.is_empty()
    }

    fn write_bit(&mut self, bit: bool) {
        if let BusState::Search { bit: n, phase: 2 } = self.state {
            let devices = &self.devices;
            self.selected
                .retain(|&i| (devices[i].rom[n / 8] & (1 << (n % 8)) != 0) == bit);
            self.state = if n + 1 == 64 {
                BusState::Idle
            } else {
                BusState::Search { bit: n + 1, phase: 0 }
            };
            return;
        }

        if bit {
            self.byte |= 1 << self.bits;
        }
        self.bits += 1;
        if self.bits == 8 {
            let byte = self.byte;
            self.byte = 0;
            self.bits = 0;
            self.on_byte(byte);
        }
    }

    fn read_bit(&mut self) -> bool {
        if let BusState::Search { bit, phase } = self.state {
            if phase < 2 {
                // Open drain: the line is high only if every device sends 1
                let complement = phase == 1;
                let level = self
                    .selected
                    .iter()
                    .all(|&i| self.rom_bit(i, bit) != complement);
                self.state = BusState::Search {
                    bit,
                    phase: phase + 1,
                };
                return level;
            }
        }
        // Pulled-up idle line
        self.read_queue.pop().unwrap_or(true)
    }
}

/// Counts sessions opened and released
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sessions {
    pub opened: usize,
    pub released: usize,
}

/// One-wire factory with a single populated bus on `pin`
pub struct FakeOneWire {
    pub pin: u8,
    pub bus: FakeBus,
    pub sessions: Sessions,
}

impl FakeOneWire {
    pub fn new(pin: u8, devices: &[FakeDevice]) -> Self {
        Self {
            pin,
            bus: FakeBus::new(devices),
            sessions: Sessions::default(),
        }
    }
}

pub struct FakeOneWireSession<'a> {
    bus: &'a mut FakeBus,
    connected: bool,
    sessions: &'a mut Sessions,
}

impl Drop for FakeOneWireSession<'_> {
    fn drop(&mut self) {
        self.sessions.released += 1;
    }
}

impl OneWireBus for FakeOneWireSession<'_> {
    fn reset(&mut self) -> bool {
        self.connected && self.bus.reset()
    }

    fn write_bit(&mut self, bit: bool) {
        if self.connected {
            self.bus.write_bit(bit);
        }
    }

    fn read_bit(&mut self) -> bool {
        !self.connected || self.bus.read_bit()
    }
}

impl OneWireFactory for FakeOneWire {
    type Bus<'a> = FakeOneWireSession<'a>;

    fn open(&mut self, pin: u8) -> Self::Bus<'_> {
        self.sessions.opened += 1;
        FakeOneWireSession {
            bus: &mut self.bus,
            connected: pin == self.pin,
            sessions: &mut self.sessions,
        }
    }
}

/// DHT factory answering every pin with the same scripted frame
pub struct FakeDht {
    pub frame: Result<[u8; 5], DhtLineError>,
    pub pins: Vec<u8>,
    pub sessions: Sessions,
}

impl FakeDht {
    pub fn new(frame: Result<[u8; 5], DhtLineError>) -> Self {
        Self {
            frame,
            pins: Vec::new(),
            sessions: Sessions::default(),
        }
    }
}

pub struct FakeDhtSession<'a> {
    frame: Result<[u8; 5], DhtLineError>,
    sessions: &'a mut Sessions,
}

impl Drop for FakeDhtSession<'_> {
    fn drop(&mut self) {
        self.sessions.released += 1;
    }
}

impl DhtLine for FakeDhtSession<'_> {
    fn read_frame(&mut self) -> Result<[u8; 5], DhtLineError> {
        self.frame
    }
}

impl DhtFactory for FakeDht {
    type Line<'a> = FakeDhtSession<'a>;

    fn open(&mut self, pin: u8) -> Self::Line<'_> {
        self.pins.push(pin);
        self.sessions.opened += 1;
        FakeDhtSession {
            frame: self.frame,
            sessions: &mut self.sessions,
        }
    }
}

/// Records requested millisecond delays
#[derive(Debug, Default)]
pub struct FakeDelay {
    pub ms: Vec<u32>,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.ms.push(ms);
    }
}
