//! GATT configuration and characteristic access.
//!
//! [`Gatt`] is the application-facing API. It builds AT commands, runs them
//! through a [`Session`], and enforces the fatal error policy: a rejected
//! precondition or a non-`OK` status alerts, halts the session, and returns
//! an error.
//!
//! # Example
//!
//! ```
//! use bluefruit_gatt::{CharacteristicProperties, Gatt, ScriptedTransport};
//!
//! let mut link = ScriptedTransport::new();
//! link.expect(
//!     "AT+GATTADDSERVICE=UUID128=00-11-22-33-44-55-66-77-88-99-AA-BB-CC-DD-EE-FF",
//!     &["1", "OK"],
//! );
//! link.expect(
//!     "AT+GATTADDCHAR=UUID=0x2A19,PROPERTIES=0x12,MIN_LEN=1,MAX_LEN=1,VALUE=00",
//!     &["2", "OK"],
//! );
//! link.expect("AT+GATTCHAR=2,64", &["OK"]);
//!
//! let mut gatt = Gatt::new(link);
//! gatt.add_service("00-11-22-33-44-55-66-77-88-99-AA-BB-CC-DD-EE-FF")?;
//! let battery = gatt.add_characteristic(
//!     0x2A19,
//!     CharacteristicProperties::READ | CharacteristicProperties::NOTIFY,
//!     1,
//!     1,
//! )?;
//! gatt.set_characteristic_value(battery, &[100])?;
//! # Ok::<(), bluefruit_gatt::Error>(())
//! ```

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::protocol::commands;
use crate::protocol::hex;
use crate::session::Session;
use crate::transport::Transport;
use crate::types::{CharacteristicHandle, CharacteristicProperties};

/// GATT operations over an AT command session.
pub struct Gatt<T: Transport> {
    session: Session<T>,
}

impl<T: Transport> Gatt<T> {
    /// Create a facade over a fresh session with default settings.
    pub fn new(transport: T) -> Self {
        Self::from_session(Session::new(transport))
    }

    /// Create a facade over an existing session.
    pub fn from_session(session: Session<T>) -> Self {
        Self { session }
    }

    /// The underlying session.
    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Mutable access to the underlying session.
    pub fn session_mut(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    /// Give the session back.
    pub fn into_session(self) -> Session<T> {
        self.session
    }

    /// Set the advertised device name.
    pub fn set_device_name(&mut self, name: &str) -> Result<()> {
        let ok = self
            .session
            .send_command_check_ok(&commands::cmd_set_device_name(name))?;
        self.session.assert_ok(ok, "Could not set device name")
    }

    /// Register a service by its 128-bit UUID text, sent verbatim.
    pub fn add_service(&mut self, uuid128: &str) -> Result<CharacteristicHandle> {
        self.add(&commands::cmd_add_service(uuid128), "Could not add service")
    }

    /// Register a service by [`Uuid`].
    pub fn add_service_uuid(&mut self, uuid: &Uuid) -> Result<CharacteristicHandle> {
        let command = self.session.check(commands::cmd_add_service_uuid(uuid))?;
        self.add(&command, "Could not add service")
    }

    /// Register a characteristic in the most recently added service.
    ///
    /// The value starts out as `max_len` zero bytes.
    pub fn add_characteristic(
        &mut self,
        uuid16: u16,
        props: CharacteristicProperties,
        min_len: u8,
        max_len: u8,
    ) -> Result<CharacteristicHandle> {
        let command = self.session.check(commands::cmd_add_characteristic(
            uuid16, props, min_len, max_len,
        ))?;
        self.add(&command, "Could not add characteristic")
    }

    fn add(&mut self, command: &[u8], context: &str) -> Result<CharacteristicHandle> {
        let (ok, value) = self.session.send_command_with_int_reply(command)?;
        self.session.assert_ok(ok, context)?;
        let handle = self
            .session
            .check(CharacteristicHandle::from_reply(value))?;
        debug!("Module assigned handle {}", handle);
        Ok(handle)
    }

    /// Write raw bytes to a characteristic.
    pub fn set_characteristic_value(
        &mut self,
        handle: CharacteristicHandle,
        value: &[u8],
    ) -> Result<()> {
        self.session.check(handle.require_valid())?;
        let hex_text = self.session.check(hex::encode(value))?;
        let command = self
            .session
            .check(commands::cmd_set_characteristic_value(handle, &hex_text))?;
        let ok = self.session.send_command_check_ok(&command)?;
        self.session.assert_ok(ok, "Could not set characteristic value")
    }

    /// Write an `i16`, most-significant byte first.
    pub fn set_characteristic_i16(
        &mut self,
        handle: CharacteristicHandle,
        value: i16,
    ) -> Result<()> {
        self.set_characteristic_value(handle, &commands::i16_to_wire(value))
    }

    /// Write an `i32`, most-significant byte first.
    pub fn set_characteristic_i32(
        &mut self,
        handle: CharacteristicHandle,
        value: i32,
    ) -> Result<()> {
        self.set_characteristic_value(handle, &commands::i32_to_wire(value))
    }

    /// Write an `f32` in native byte order.
    pub fn set_characteristic_f32(
        &mut self,
        handle: CharacteristicHandle,
        value: f32,
    ) -> Result<()> {
        self.set_characteristic_value(handle, &commands::f32_to_wire(value))
    }

    /// Read a characteristic into `out`.
    ///
    /// Returns the number of bytes written, at most `out.len()`. Bytes the
    /// module sends beyond that are dropped, as are groups cut off by the
    /// session's reply cap. A malformed reply reads as 0 bytes rather than
    /// an error.
    pub fn get_characteristic_value(
        &mut self,
        handle: CharacteristicHandle,
        out: &mut [u8],
    ) -> Result<usize> {
        let command = self
            .session
            .check(commands::cmd_get_characteristic_value(handle))?;
        let reply = self.session.send_command_with_string_reply(&command)?;
        self.session
            .assert_ok(reply.ok, "Could not get characteristic value")?;

        let text = if reply.truncated {
            hex::whole_groups(&reply.payload)
        } else {
            reply.payload.as_str()
        };
        if !text.is_empty() && !hex::is_well_framed(text.len()) {
            warn!(
                "Malformed value for characteristic {}: {:?}",
                handle, reply.payload
            );
        }
        Ok(hex::decode(text, out))
    }

    /// Read an `i16`; `None` if fewer than two bytes came back.
    pub fn get_characteristic_i16(&mut self, handle: CharacteristicHandle) -> Result<Option<i16>> {
        let mut bytes = [0u8; 2];
        let count = self.get_characteristic_value(handle, &mut bytes)?;
        Ok((count == bytes.len()).then(|| commands::i16_from_wire(bytes)))
    }

    /// Read an `i32`; `None` if fewer than four bytes came back.
    pub fn get_characteristic_i32(&mut self, handle: CharacteristicHandle) -> Result<Option<i32>> {
        let mut bytes = [0u8; 4];
        let count = self.get_characteristic_value(handle, &mut bytes)?;
        Ok((count == bytes.len()).then(|| commands::i32_from_wire(bytes)))
    }

    /// Read an `f32`; `None` if fewer than four bytes came back.
    pub fn get_characteristic_f32(&mut self, handle: CharacteristicHandle) -> Result<Option<f32>> {
        let mut bytes = [0u8; 4];
        let count = self.get_characteristic_value(handle, &mut bytes)?;
        Ok((count == bytes.len()).then(|| commands::f32_from_wire(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::RecordingAlert;
    use crate::error::Error;
    use crate::transport::{ProtocolMode, ScriptedTransport};
    use pretty_assertions::assert_eq;

    fn gatt(link: ScriptedTransport) -> (Gatt<ScriptedTransport>, RecordingAlert) {
        let alerts = RecordingAlert::new();
        let session = Session::new(link).with_alert(alerts.clone());
        (Gatt::from_session(session), alerts)
    }

    fn sent(gatt: &Gatt<ScriptedTransport>) -> Vec<String> {
        gatt.session()
            .transport()
            .sent_lines()
            .iter()
            .map(|line| String::from_utf8(line.clone()).unwrap())
            .collect()
    }

    #[test]
    fn test_set_device_name() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GAPDEVNAME=Thermo", &["OK"]);
        let (mut gatt, alerts) = gatt(link);

        gatt.set_device_name("Thermo").unwrap();
        assert_eq!(alerts.count(), 0);
    }

    #[test]
    fn test_set_device_name_failure_halts() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GAPDEVNAME=Thermo", &["ERROR"]);
        let (mut gatt, alerts) = gatt(link);

        let result = gatt.set_device_name("Thermo");
        assert!(matches!(result, Err(Error::CommandFailed { .. })));
        assert!(gatt.session().is_halted());
        assert_eq!(alerts.count(), 1);
        assert!(matches!(gatt.set_device_name("Thermo"), Err(Error::Halted)));
    }

    #[test]
    fn test_add_service_returns_handle() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTADDSERVICE=UUID128=AB-CD", &["1", "OK"]);
        let (mut gatt, _) = gatt(link);

        let handle = gatt.add_service("AB-CD").unwrap();
        assert_eq!(handle.raw(), 1);
    }

    #[test]
    fn test_add_service_uuid() {
        let uuid = Uuid::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff);
        let mut link = ScriptedTransport::new();
        link.expect(
            "AT+GATTADDSERVICE=UUID128=00-11-22-33-44-55-66-77-88-99-AA-BB-CC-DD-EE-FF",
            &["1", "OK"],
        );
        let (mut gatt, _) = gatt(link);

        assert_eq!(gatt.add_service_uuid(&uuid).unwrap().raw(), 1);
    }

    #[test]
    fn test_add_service_rejected_by_module() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTADDSERVICE=UUID128=zz", &["ERROR"]);
        let (mut gatt, alerts) = gatt(link);

        assert!(gatt.add_service("zz").is_err());
        assert_eq!(
            alerts.messages(),
            vec!["Command failed: Could not add service".to_string()]
        );
    }

    #[test]
    fn test_add_characteristic() {
        let mut link = ScriptedTransport::new();
        link.expect(
            "AT+GATTADDCHAR=UUID=0x2A19,PROPERTIES=0x12,MIN_LEN=1,MAX_LEN=4,VALUE=00-00-00-00",
            &["2", "OK"],
        );
        let (mut gatt, _) = gatt(link);

        let props = CharacteristicProperties::READ | CharacteristicProperties::NOTIFY;
        let handle = gatt.add_characteristic(0x2A19, props, 1, 4).unwrap();
        assert_eq!(handle, CharacteristicHandle::new(2));
    }

    #[test]
    fn test_add_characteristic_zero_max_len_not_sent() {
        let (mut gatt, alerts) = gatt(ScriptedTransport::new());

        let result = gatt.add_characteristic(0x2A19, CharacteristicProperties::READ, 0, 0);
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));
        assert!(sent(&gatt).is_empty());
        assert_eq!(alerts.count(), 1);
    }

    #[test]
    fn test_add_reply_without_handle() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTADDSERVICE=UUID128=AB", &["no handle", "OK"]);
        let (mut gatt, alerts) = gatt(link);

        let result = gatt.add_service("AB");
        assert!(matches!(result, Err(Error::InvalidReply { .. })));
        assert!(gatt.session().is_halted());
        assert_eq!(alerts.count(), 1);
    }

    #[test]
    fn test_add_handle_out_of_range() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTADDSERVICE=UUID128=AB", &["300", "OK"]);
        let (mut gatt, _) = gatt(link);

        let result = gatt.add_service("AB");
        assert!(matches!(result, Err(Error::InvalidReply { .. })));
        assert!(gatt.session().is_halted());
    }

    #[test]
    fn test_set_value_rejects_handle_zero_before_sending() {
        let (mut gatt, alerts) = gatt(ScriptedTransport::new());

        let result = gatt.set_characteristic_value(CharacteristicHandle::new(0), &[1, 2]);
        assert!(matches!(result, Err(Error::InvalidHandle { handle: 0 })));
        assert!(sent(&gatt).is_empty());
        assert_eq!(alerts.count(), 1);
        assert!(gatt.session().is_halted());
    }

    #[test]
    fn test_set_value_rejects_empty_before_sending() {
        let (mut gatt, _) = gatt(ScriptedTransport::new());

        let result = gatt.set_characteristic_value(CharacteristicHandle::new(1), &[]);
        assert!(matches!(result, Err(Error::EmptyValue)));
        assert!(sent(&gatt).is_empty());
    }

    #[test]
    fn test_set_typed_values() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTCHAR=3,12-34", &["OK"]);
        link.expect("AT+GATTCHAR=3,00-01-00-00", &["OK"]);
        let (mut gatt, _) = gatt(link);

        let handle = CharacteristicHandle::new(3);
        gatt.set_characteristic_i16(handle, 0x1234).unwrap();
        gatt.set_characteristic_i32(handle, 0x0001_0000).unwrap();
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn test_set_float_native_order() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTCHAR=3,00-00-80-3F", &["OK"]);
        let (mut gatt, _) = gatt(link);

        gatt.set_characteristic_f32(CharacteristicHandle::new(3), 1.0)
            .unwrap();
    }

    #[test]
    fn test_get_value() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTCHAR=2", &["DE-AD-BE-EF", "OK"]);
        let (mut gatt, _) = gatt(link);

        let mut buf = [0u8; 8];
        let count = gatt
            .get_characteristic_value(CharacteristicHandle::new(2), &mut buf)
            .unwrap();
        assert_eq!(&buf[..count], &[0xDEu8, 0xAD, 0xBE, 0xEF][..]);
    }

    #[test]
    fn test_get_value_discards_excess() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTCHAR=2", &["01-02-03-04", "OK"]);
        link.expect("AT+GATTCHAR=2", &["05", "OK"]);
        let (mut gatt, _) = gatt(link);

        let mut buf = [0u8; 2];
        let handle = CharacteristicHandle::new(2);
        assert_eq!(gatt.get_characteristic_value(handle, &mut buf).unwrap(), 2);
        assert_eq!(buf, [0x01, 0x02]);
        // The stream stayed aligned for the next command
        assert_eq!(gatt.get_characteristic_value(handle, &mut buf).unwrap(), 1);
        assert_eq!(buf[0], 0x05);
    }

    #[test]
    fn test_get_long_value_past_reply_cap() {
        let value: Vec<u8> = (0..22).collect();
        let text = hex::encode(&value).unwrap();
        assert_eq!(text.len(), 65);

        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTCHAR=2", &[text.as_str(), "OK"]);
        link.expect("AT+GATTCHAR=2", &[text.as_str(), "OK"]);
        let (mut gatt, alerts) = gatt(link);
        let handle = CharacteristicHandle::new(2);

        let mut buf = [0u8; 2];
        assert_eq!(gatt.get_characteristic_value(handle, &mut buf).unwrap(), 2);
        assert_eq!(buf, [0x00, 0x01]);

        // Only the groups that fit in 64 characters survive
        let mut buf = [0u8; 32];
        assert_eq!(gatt.get_characteristic_value(handle, &mut buf).unwrap(), 21);
        assert_eq!(&buf[..21], &value[..21]);
        assert_eq!(alerts.count(), 0);
    }

    #[test]
    fn test_get_value_into_empty_buffer() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTCHAR=2", &["01-02", "OK"]);
        let (mut gatt, _) = gatt(link);

        let mut buf = [0u8; 0];
        let count = gatt
            .get_characteristic_value(CharacteristicHandle::new(2), &mut buf)
            .unwrap();
        assert_eq!(count, 0);
        assert!(!gatt.session().is_halted());
    }

    #[test]
    fn test_get_malformed_value_is_soft() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTCHAR=2", &["1-2", "OK"]);
        let (mut gatt, alerts) = gatt(link);

        let mut buf = [0u8; 4];
        let count = gatt
            .get_characteristic_value(CharacteristicHandle::new(2), &mut buf)
            .unwrap();
        assert_eq!(count, 0);
        assert!(!gatt.session().is_halted());
        assert_eq!(alerts.count(), 0);
    }

    #[test]
    fn test_get_empty_value() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTCHAR=2", &["OK"]);
        let (mut gatt, _) = gatt(link);

        let mut buf = [0u8; 4];
        assert_eq!(
            gatt.get_characteristic_value(CharacteristicHandle::new(2), &mut buf)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_get_rejects_handle_zero() {
        let (mut gatt, _) = gatt(ScriptedTransport::new());

        let mut buf = [0u8; 4];
        let result = gatt.get_characteristic_value(CharacteristicHandle::new(0), &mut buf);
        assert!(matches!(result, Err(Error::InvalidHandle { .. })));
        assert!(sent(&gatt).is_empty());
    }

    #[test]
    fn test_get_typed_values() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTCHAR=4", &["FF-FE", "OK"]);
        link.expect("AT+GATTCHAR=4", &["00-00-01-00", "OK"]);
        link.expect("AT+GATTCHAR=4", &["07", "OK"]);
        let (mut gatt, _) = gatt(link);

        let handle = CharacteristicHandle::new(4);
        assert_eq!(gatt.get_characteristic_i16(handle).unwrap(), Some(-2));
        assert_eq!(gatt.get_characteristic_i32(handle).unwrap(), Some(256));
        assert_eq!(gatt.get_characteristic_i16(handle).unwrap(), None);
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn test_get_float_native_order() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTCHAR=4", &["00-00-80-3F", "OK"]);
        let (mut gatt, _) = gatt(link);

        let value = gatt
            .get_characteristic_f32(CharacteristicHandle::new(4))
            .unwrap();
        assert_eq!(value, Some(1.0));
    }

    #[test]
    fn test_get_failure_halts() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTCHAR=4", &["ERROR"]);
        let (mut gatt, _) = gatt(link);

        let mut buf = [0u8; 4];
        let result = gatt.get_characteristic_value(CharacteristicHandle::new(4), &mut buf);
        assert!(matches!(result, Err(Error::CommandFailed { .. })));
        assert!(gatt.session().is_halted());
    }

    #[test]
    fn test_operations_in_data_mode_restore_it() {
        let mut link = ScriptedTransport::with_mode(ProtocolMode::Data);
        link.expect("AT+GATTCHAR=1,2A", &["OK"]);
        let (mut gatt, _) = gatt(link);

        gatt.set_characteristic_value(CharacteristicHandle::new(1), &[0x2A])
            .unwrap();
        assert_eq!(gatt.session().transport().mode(), ProtocolMode::Data);
    }
}
