//! GATT value types shared by the command builder and the facade.

use std::fmt;

use uuid::Uuid;

use crate::error::{Error, Result};

bitflags::bitflags! {
    /// Characteristic properties accepted by `AT+GATTADDCHAR`.
    ///
    /// Flags combine with `|`. The empty set declares a characteristic with
    /// no readable or writable attribute.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[repr(transparent)]
    pub struct CharacteristicProperties: u8 {
        /// Value can be read by a central.
        const READ = 0x02;
        /// Value can be written without a response.
        const WRITE_NO_RESPONSE = 0x04;
        /// Value can be written with a response.
        const WRITE = 0x08;
        /// Value changes are notified.
        const NOTIFY = 0x10;
        /// Value changes are indicated (acknowledged).
        const INDICATE = 0x20;
    }
}

impl CharacteristicProperties {
    /// No properties.
    pub const NONE: Self = Self::empty();

    /// Convert to the raw bitmask sent to the module.
    pub fn to_raw(&self) -> u8 {
        self.bits()
    }
}

/// Module-assigned identifier of a registered service or characteristic.
///
/// Handles only come from module replies; the value 0 is reserved and never
/// addresses a characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacteristicHandle(i8);

impl CharacteristicHandle {
    /// Wrap a raw handle value.
    pub fn new(raw: i8) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    pub fn raw(&self) -> i8 {
        self.0
    }

    /// Whether this handle may address a characteristic operation.
    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }

    /// Build a handle from the integer payload of an add reply.
    ///
    /// The reserved handle 0 is what a reply without digits parses to, so
    /// it is rejected along with values outside `i8`.
    pub(crate) fn from_reply(value: i32) -> Result<Self> {
        match i8::try_from(value) {
            Ok(0) => Err(Error::InvalidReply {
                context: "Module returned reserved handle 0".to_string(),
            }),
            Ok(raw) => Ok(Self(raw)),
            Err(_) => Err(Error::InvalidReply {
                context: format!("Handle {} out of range", value),
            }),
        }
    }

    /// Fail unless this handle may address a characteristic.
    pub(crate) fn require_valid(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidHandle { handle: self.0 })
        }
    }
}

impl fmt::Display for CharacteristicHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The Bluetooth Base UUID that 16-bit UUIDs are aliases into.
pub const BLUETOOTH_BASE_UUID: u128 = 0x0000_0000_0000_1000_8000_00805f9b34fb;

/// Expand a 16-bit UUID onto the Bluetooth Base UUID.
pub const fn uuid_from_u16(uuid16: u16) -> Uuid {
    Uuid::from_u128(((uuid16 as u128) << 96) | BLUETOOTH_BASE_UUID)
}

/// Narrow a UUID to its 16-bit alias, if it is one.
pub fn uuid16_from_uuid(uuid: &Uuid) -> Option<u16> {
    let value = uuid.as_u128();
    let alias = (value >> 96) as u32;
    if value & ((1 << 96) - 1) == BLUETOOTH_BASE_UUID && alias & 0xFFFF_0000 == 0 {
        Some(alias as u16)
    } else {
        None
    }
}
