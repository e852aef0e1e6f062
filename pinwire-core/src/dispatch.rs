//! Command dispatch
//!
//! Maps a decoded [`Frame`] onto the GPIO surface or the sensor adapter and
//! streams the reply. One frame produces one set of side effects and at most
//! one reply line.

use embedded_io::Write;

use pinwire_hal::{Gpio, Level, PinMode, SystemInfo};
use pinwire_protocol::response::{DHT_READ_FAILURE, LABEL_FREE_MEMORY, LABEL_VERSION};
use pinwire_protocol::{Command, Fixed2, Frame, ModeRequest, ReplyError, ResponseEncoder};

use crate::config::BoardConfig;
use crate::traits::{SensorAdapter, DEVICE_DISCONNECTED_C};

/// What a dispatch put on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// A complete reply line was written
    Replied,
    /// Only the preamble was written; the command/operation pair is unknown
    Dropped,
}

fn pin_mode(request: ModeRequest) -> PinMode {
    match request {
        ModeRequest::Input => PinMode::Input,
        ModeRequest::InputPullup => PinMode::InputPullup,
        ModeRequest::Output => PinMode::Output,
    }
}

/// Executes commands against the board's collaborators
pub struct Dispatcher<'c, G, S, M> {
    board: &'c BoardConfig,
    gpio: G,
    sensors: S,
    system: M,
}

impl<'c, G, S, M> Dispatcher<'c, G, S, M>
where
    G: Gpio,
    S: SensorAdapter,
    M: SystemInfo,
{
    pub fn new(board: &'c BoardConfig, gpio: G, sensors: S, system: M) -> Self {
        Self {
            board,
            gpio,
            sensors,
            system,
        }
    }

    pub fn board(&self) -> &BoardConfig {
        self.board
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    pub fn gpio_mut(&mut self) -> &mut G {
        &mut self.gpio
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    pub fn system(&self) -> &M {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut M {
        &mut self.system
    }

    /// Execute `frame` and write its reply to `out`
    ///
    /// The device id, and the pin for every non-system command, go out
    /// before the command runs. An unrecognized command/operation pair
    /// leaves that preamble unterminated and returns [`Outcome::Dropped`].
    pub fn dispatch<W: Write>(
        &mut self,
        frame: &Frame,
        out: &mut W,
    ) -> Result<Outcome, ReplyError<W::Error>> {
        let command = Command::from_frame(frame);
        debug!("Dispatch {:?}", command);

        let pin = if frame.is_system() {
            None
        } else {
            Some(frame.pin())
        };
        let mut reply = ResponseEncoder::begin(out, self.board.device_id, pin)?;

        match command {
            Command::FreeMemory => {
                reply.token(LABEL_FREE_MEMORY)?;
                reply.finish(self.system.free_memory())?;
            }
            Command::Version => {
                reply.token(LABEL_VERSION)?;
                reply.finish(self.board.firmware_version.as_str())?;
            }
            Command::AnalogRead { channel } => {
                reply.finish(self.gpio.analog_read(channel.get()))?;
            }
            Command::AnalogWrite { pin, duty } => {
                if self.board.is_pwm_capable(pin.get()) {
                    let clamped = duty.get().min(u16::from(u8::MAX)) as u8;
                    self.gpio.analog_write(pin.get(), clamped);
                } else {
                    debug!("Pin {} has no PWM, write skipped", pin.get());
                }
                reply.finish(duty)?;
            }
            Command::DigitalRead { pin } => {
                reply.finish(self.gpio.digital_read(pin.get()).as_u8())?;
            }
            Command::DigitalWrite { pin, high } => {
                self.gpio.digital_write(pin.get(), Level::from(high));
                reply.finish(self.gpio.digital_read(pin.get()).as_u8())?;
            }
            Command::SetMode { pin, mode } => {
                let mode = pin_mode(mode);
                self.gpio.set_pin_mode(pin.get(), mode);
                reply.finish(mode.code())?;
            }
            Command::QueryMode { pin } => {
                reply.finish(self.gpio.current_mode(pin.get()).code())?;
            }
            Command::OneWireTemperature { bus_pin, index } => {
                let celsius = match self.sensors.one_wire_celsius(bus_pin.get(), index.get()) {
                    Ok(celsius) => celsius,
                    Err(e) => {
                        warn!("One-wire read on pin {} failed: {:?}", bus_pin.get(), e);
                        DEVICE_DISCONNECTED_C
                    }
                };
                reply.token(index)?;
                reply.finish(Fixed2(celsius))?;
            }
            Command::HumidityTemperature { pin, kind } => {
                match self.sensors.humidity_temperature(pin.get(), kind.get()) {
                    Ok(reading) if !reading.is_nan() => {
                        reply.finish_pair(Fixed2(reading.humidity), Fixed2(reading.temperature))?;
                    }
                    Ok(_) => {
                        warn!("Humidity sensor on pin {} returned NaN", pin.get());
                        reply.finish(DHT_READ_FAILURE)?;
                    }
                    Err(e) => {
                        warn!("Humidity sensor on pin {} failed: {:?}", pin.get(), e);
                        reply.finish(DHT_READ_FAILURE)?;
                    }
                }
            }
            Command::Unrecognized { command, operation } => {
                // The preamble is already out; the host sees no terminator.
                warn!(
                    "Unrecognized command {=u8:#x}/{=u8:#x}, reply dropped",
                    command,
                    operation
                );
                return Ok(Outcome::Dropped);
            }
        }

        Ok(Outcome::Replied)
    }
}
