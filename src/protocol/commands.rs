//! AT command builders for the GAP/GATT command set.
//!
//! All functions are pure: they produce a command line (without the line
//! terminator, which the transport appends) and perform no I/O.
//!
//! # Wire grammar
//!
//! ```text
//! AT+GAPDEVNAME=<name>
//! AT+GATTADDSERVICE=UUID128=<uuid>
//! AT+GATTADDCHAR=UUID=0xXXXX,PROPERTIES=0xXX,MIN_LEN=<d>,MAX_LEN=<d>,VALUE=<hex>
//! AT+GATTCHAR=<handle>,<hex>
//! AT+GATTCHAR=<handle>
//! ```
//!
//! # Numeric values
//!
//! Integers travel most-significant byte first. Floats travel in the host's
//! native byte order and are not reversed; module firmware expects exactly
//! that layout.

use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::protocol::hex;
use crate::types::{CharacteristicHandle, CharacteristicProperties};

/// Prefix of the set device name command.
pub const GAP_DEVICE_NAME: &str = "AT+GAPDEVNAME=";
/// Prefix of the add service command.
pub const GATT_ADD_SERVICE: &str = "AT+GATTADDSERVICE=UUID128=";
/// Prefix of the add characteristic command.
pub const GATT_ADD_CHAR: &str = "AT+GATTADDCHAR=";
/// Prefix of the characteristic get/set command.
pub const GATT_CHAR: &str = "AT+GATTCHAR=";

/// Concatenate a command prefix and its parameters.
///
/// The buffer is sized exactly, so the output can neither overflow nor be
/// silently truncated.
pub fn encode_command(prefix: &str, params: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(prefix.len() + params.len());
    buf.put_slice(prefix.as_bytes());
    buf.put_slice(params.as_bytes());
    buf.freeze()
}

/// Build `AT+GAPDEVNAME=<name>`.
pub fn cmd_set_device_name(name: &str) -> Bytes {
    encode_command(GAP_DEVICE_NAME, name)
}

/// Build `AT+GATTADDSERVICE=UUID128=<uuid128>`.
///
/// The UUID text is embedded verbatim. A malformed UUID is reported by the
/// module as `ERROR`, not rejected here.
pub fn cmd_add_service(uuid128: &str) -> Bytes {
    encode_command(GATT_ADD_SERVICE, uuid128)
}

/// Build an add service command for a [`Uuid`].
///
/// The 16 UUID bytes are rendered in the module's dash-separated hex form,
/// e.g. `6E-40-00-01-B5-A3-...`.
pub fn cmd_add_service_uuid(uuid: &Uuid) -> Result<Bytes> {
    let text = hex::encode(uuid.as_bytes())?;
    Ok(cmd_add_service(&text))
}

/// Build `AT+GATTADDCHAR=...`.
///
/// The characteristic is seeded with `max_len` zero bytes, so `max_len`
/// must be at least 1.
///
/// # Arguments
///
/// * `uuid16` - 16-bit characteristic UUID
/// * `props` - Characteristic properties
/// * `min_len` - Minimum value length in bytes
/// * `max_len` - Maximum value length in bytes
pub fn cmd_add_characteristic(
    uuid16: u16,
    props: CharacteristicProperties,
    min_len: u8,
    max_len: u8,
) -> Result<Bytes> {
    if max_len == 0 {
        return Err(Error::InvalidParameter {
            name: "max_len".to_string(),
            value: max_len.to_string(),
        });
    }

    let params = format!(
        "UUID=0x{:04X},PROPERTIES=0x{:02X},MIN_LEN={},MAX_LEN={},VALUE={}",
        uuid16,
        props.to_raw(),
        min_len,
        max_len,
        hex::zero_fill(max_len as usize)
    );
    Ok(encode_command(GATT_ADD_CHAR, &params))
}

/// Build `AT+GATTCHAR=<handle>,<hex>`.
///
/// Rejects the reserved handle 0 and an empty value.
pub fn cmd_set_characteristic_value(
    handle: CharacteristicHandle,
    hex_text: &str,
) -> Result<Bytes> {
    handle.require_valid()?;
    if hex_text.is_empty() {
        return Err(Error::EmptyValue);
    }

    let mut params = String::with_capacity(5 + hex_text.len());
    params.push_str(&handle.to_string());
    params.push(',');
    params.push_str(hex_text);
    Ok(encode_command(GATT_CHAR, &params))
}

/// Build `AT+GATTCHAR=<handle>`.
pub fn cmd_get_characteristic_value(handle: CharacteristicHandle) -> Result<Bytes> {
    handle.require_valid()?;
    Ok(encode_command(GATT_CHAR, &handle.to_string()))
}

// ---------------------------------------------------------------
// Numeric value layout
// ---------------------------------------------------------------

/// Wire bytes of an `i16` (most-significant byte first).
pub fn i16_to_wire(value: i16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Wire bytes of an `i32` (most-significant byte first).
pub fn i32_to_wire(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Wire bytes of an `f32` (native order, unreversed).
pub fn f32_to_wire(value: f32) -> [u8; 4] {
    value.to_ne_bytes()
}

/// Read an `i16` from wire bytes.
pub fn i16_from_wire(bytes: [u8; 2]) -> i16 {
    i16::from_be_bytes(bytes)
}

/// Read an `i32` from wire bytes.
pub fn i32_from_wire(bytes: [u8; 4]) -> i32 {
    i32::from_be_bytes(bytes)
}

/// Read an `f32` from wire bytes.
pub fn f32_from_wire(bytes: [u8; 4]) -> f32 {
    f32::from_ne_bytes(bytes)
}
