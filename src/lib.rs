// Allow unusual byte groupings for UUIDs which have standard format
#![allow(clippy::unusual_byte_groupings)]

//! # bluefruit-gatt
//!
//! Configure and operate the GATT table of a Bluefruit LE class module
//! from a host microcontroller or computer, over the module's AT command
//! set.
//!
//! The crate covers the protocol layer only: it builds command lines,
//! exchanges them over a [`Transport`] you provide, and parses the replies.
//! The physical link (SPI or UART framing, line buffering, the COMMAND/DATA
//! mode switch) stays behind the [`Transport`] trait.
//!
//! ## Features
//!
//! - **GATT setup**: device name, services by 128-bit UUID, characteristics
//!   by 16-bit UUID with properties and length bounds
//! - **Characteristic values**: raw bytes, `i16`/`i32` (big-endian on the
//!   wire) and `f32` (native order on the wire)
//! - **Mode safety**: commands always run in command mode and the caller's
//!   mode is restored afterwards, also on failure
//! - **Fatal error policy**: failures raise an [`AlertSink`] and halt the
//!   session, returned as [`Error`] so the caller decides what to do
//!
//! ## Quick Start
//!
//! ```rust
//! use bluefruit_gatt::{CharacteristicProperties, Gatt, Result, ScriptedTransport};
//!
//! fn main() -> Result<()> {
//!     // A real application passes its SPI or UART transport here
//!     let mut link = ScriptedTransport::new();
//!     link.expect("AT+GAPDEVNAME=Thermo", &["OK"]);
//!     link.expect(
//!         "AT+GATTADDCHAR=UUID=0x2A6E,PROPERTIES=0x12,MIN_LEN=2,MAX_LEN=2,VALUE=00-00",
//!         &["1", "OK"],
//!     );
//!     link.expect("AT+GATTCHAR=1,08-FC", &["OK"]);
//!
//!     let mut gatt = Gatt::new(link);
//!     gatt.set_device_name("Thermo")?;
//!
//!     let temperature = gatt.add_characteristic(
//!         0x2A6E,
//!         CharacteristicProperties::READ | CharacteristicProperties::NOTIFY,
//!         2,
//!         2,
//!     )?;
//!     gatt.set_characteristic_i16(temperature, 2300)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for configuration and
//!   value types

// Public modules
pub mod alert;
pub mod config;
pub mod error;
pub mod gatt;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use alert::{AlertSink, LogAlert, RecordingAlert};
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use gatt::Gatt;
pub use protocol::{Reply, Status};
pub use session::{CommandMode, Session};
pub use transport::{ProtocolMode, ScriptedTransport, Transport};
pub use types::{CharacteristicHandle, CharacteristicProperties};
