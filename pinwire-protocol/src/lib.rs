//! Pinwire Host Command Protocol
//!
//! This crate defines the serial protocol a host uses to drive the I/O
//! board. Requests are fixed-width ASCII frames; replies are
//! percent-delimited text lines.
//!
//! # Protocol Overview
//!
//! ```text
//! request:  < C O P P V V V >
//!             │ │ └┬┘ └─┬─┘
//!             │ │  │    └── value (3 decimal digits)
//!             │ │  └─────── pin (2 decimal digits)
//!             │ └────────── operation
//!             └──────────── command
//!
//! reply:    <device-id>%[<pin>%]<payload>\n
//! ```
//!
//! Exactly one command is in flight at a time: the board replies before it
//! reads the next byte, and there is no acknowledgement or retransmission.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod frame;
pub mod response;

pub use command::{Command, ModeRequest};
pub use frame::{
    CommandValue, Frame, FrameError, FrameParser, PinAddress, RawFrame, FRAME_END, FRAME_LEN,
    FRAME_START, MAX_RAW_LEN,
};
pub use response::{Fixed2, ReplyError, ResponseEncoder};
