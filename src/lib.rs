//! Interactive front-end for flashing Intel HEX images to an AVR board through avrdude.
//!
//! The flow is strictly sequential: find an image, pick a serial port, find avrdude and run it.
//! Console interaction goes through generic `BufRead`/`Write` handles so every step can be driven
//! from tests.

pub mod chooser;
mod error;
pub mod flow;
pub mod image;
pub mod invoke;
pub mod locate;
mod pathglob;
pub mod platform;
pub mod ports;
pub mod select;

pub use error::Error;
pub use flow::{run, Settings};
pub use invoke::Target;
pub use locate::Locator;
pub use platform::Platform;
pub use ports::SystemPorts;
