//! Board configuration
//!
//! Describes the pins of the board the engine runs on and the identity it
//! reports to the host. Loaded from a TOML board file parsed by a small
//! no_std parser.

pub mod board;
pub mod parser;

pub use board::*;
pub use parser::{parse_board_config, ParseError};
