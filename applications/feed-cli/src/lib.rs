//! Headless Fuplay feed
//!
//! Drives a vertical video feed over a local media directory from the
//! terminal: one line of input per gesture, one line of output per event.

pub mod config;
pub mod error;
pub mod library;
pub mod session;

pub use config::{AppConfig, LibrarySettings};
pub use error::{CliError, Result};
pub use session::{Input, Session, HELP};
