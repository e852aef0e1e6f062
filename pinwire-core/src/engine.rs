//! Poll-driven command engine
//!
//! Busy-polls the serial port one byte at a time. A byte that completes a
//! frame is dispatched and answered before `poll` returns, so at most one
//! command is ever in flight.
//!
//! A frame left open for longer than the read timeout with no further bytes
//! is abandoned and reported as invalid, the way a host sees a truncated
//! command. The clock is [`SystemInfo::uptime_ms`].
//!
//! Sensor reads block the loop for as long as the sensor takes. A sensor
//! that never answers stalls the device; nothing here times it out.

use embedded_io::Error as _;

use pinwire_hal::{Gpio, SerialPort, SystemInfo};
use pinwire_protocol::response::{write_boot_banner, write_invalid_frame};
use pinwire_protocol::{FrameError, FrameParser, ReplyError};

use crate::dispatch::{Dispatcher, Outcome};
use crate::traits::SensorAdapter;

/// Longest gap between two bytes of one frame
pub const DEFAULT_READ_TIMEOUT_MS: u32 = 1000;

/// Result of a single poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Poll {
    /// No byte was available
    Idle,
    /// A byte was consumed, no frame completed yet
    Pending,
    /// A frame was dispatched and fully answered
    Replied,
    /// A frame was dispatched but its command/operation pair is unknown;
    /// only the preamble went out
    Dropped,
    /// A frame of the wrong length, or one that timed out half-received,
    /// was discarded and reported
    Rejected,
}

/// Owns the serial link and drives frames through the dispatcher
pub struct CommandEngine<'c, P, G, S, M> {
    port: P,
    parser: FrameParser,
    dispatcher: Dispatcher<'c, G, S, M>,
    read_timeout_ms: u32,
    /// Uptime at the last byte consumed
    last_byte_ms: u32,
}

impl<'c, P, G, S, M> CommandEngine<'c, P, G, S, M>
where
    P: SerialPort,
    G: Gpio,
    S: SensorAdapter,
    M: SystemInfo,
{
    pub fn new(port: P, dispatcher: Dispatcher<'c, G, S, M>) -> Self {
        Self {
            port,
            parser: FrameParser::new(),
            dispatcher,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            last_byte_ms: 0,
        }
    }

    /// Override how long a partial frame may wait for its next byte
    pub fn with_read_timeout(mut self, ms: u32) -> Self {
        self.read_timeout_ms = ms;
        self
    }

    pub fn read_timeout_ms(&self) -> u32 {
        self.read_timeout_ms
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn dispatcher(&self) -> &Dispatcher<'c, G, S, M> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<'c, G, S, M> {
        &mut self.dispatcher
    }

    /// Announce readiness to the host
    pub fn boot(&mut self) -> Result<(), P::Error> {
        let board = self.dispatcher.board();
        info!(
            "Pinwire {} on '{}' (device {}, {} baud)",
            board.firmware_version.as_str(),
            board.name.as_str(),
            board.device_id,
            board.uart.baudrate
        );
        write_boot_banner(&mut self.port)?;
        self.port.flush()
    }

    /// Consume at most one byte from the port
    ///
    /// Never waits for data. When the byte completes a frame, the frame is
    /// dispatched and its reply flushed before returning. A partial frame
    /// whose read timeout has run out is reported instead, before any new
    /// byte is read.
    pub fn poll(&mut self) -> Result<Poll, ReplyError<P::Error>> {
        let now = self.dispatcher.system().uptime_ms();
        let stale = now.wrapping_sub(self.last_byte_ms) >= self.read_timeout_ms;
        if let Some(raw) = stale.then(|| self.parser.abort()).flatten() {
            warn!("Frame timed out after {} bytes", raw.len());
            write_invalid_frame(&mut self.port, &raw).map_err(ReplyError::Transport)?;
            self.port.flush().map_err(ReplyError::Transport)?;
            return Ok(Poll::Rejected);
        }

        if !self.port.read_ready().map_err(ReplyError::Transport)? {
            return Ok(Poll::Idle);
        }

        let mut byte = [0u8; 1];
        if self.port.read(&mut byte).map_err(ReplyError::Transport)? == 0 {
            return Ok(Poll::Idle);
        }
        self.last_byte_ms = now;

        let poll = match self.parser.feed(byte[0]) {
            Ok(None) => return Ok(Poll::Pending),
            Ok(Some(frame)) => match self.dispatcher.dispatch(&frame, &mut self.port)? {
                Outcome::Replied => Poll::Replied,
                Outcome::Dropped => Poll::Dropped,
            },
            Err(FrameError::InvalidFrame(raw)) => {
                warn!("Invalid frame: {} bytes", raw.len());
                write_invalid_frame(&mut self.port, &raw).map_err(ReplyError::Transport)?;
                Poll::Rejected
            }
        };

        self.port.flush().map_err(ReplyError::Transport)?;
        Ok(poll)
    }

    /// Service the host forever
    ///
    /// Transport errors are logged and polling continues.
    pub fn run(&mut self) -> ! {
        loop {
            match self.poll() {
                Ok(_) => {}
                Err(ReplyError::Transport(e)) => error!("Serial error: {:?}", e.kind()),
                Err(ReplyError::Format) => error!("Reply formatting failed"),
            }
        }
    }
}
