//! Heart Rate Peripheral Example
//!
//! Sets up a Heart Rate service on a module and publishes a few readings.
//! The module is simulated with a scripted transport so the example runs
//! without hardware; swap in your SPI or UART transport to drive a real
//! Bluefruit LE module.
//!
//! Run with: cargo run --example heart_rate_peripheral

use bluefruit_gatt::types::uuid_from_u16;
use bluefruit_gatt::{
    CharacteristicProperties, Gatt, ProtocolMode, Result, ScriptedTransport, Session,
    SessionConfig,
};
use tracing_subscriber::EnvFilter;

/// Heart Rate Measurement characteristic.
const HEART_RATE_MEASUREMENT: u16 = 0x2A37;
/// Body Sensor Location characteristic.
const BODY_SENSOR_LOCATION: u16 = 0x2A38;

fn simulated_module(service: &str, readings: &[u8]) -> ScriptedTransport {
    let mut link = ScriptedTransport::with_mode(ProtocolMode::Data);
    link.expect("AT+GAPDEVNAME=Pulse", &["OK"]);
    link.expect(&format!("AT+GATTADDSERVICE=UUID128={}", service), &["1", "OK"]);
    link.expect(
        "AT+GATTADDCHAR=UUID=0x2A37,PROPERTIES=0x10,MIN_LEN=2,MAX_LEN=3,VALUE=00-00-00",
        &["1", "OK"],
    );
    link.expect(
        "AT+GATTADDCHAR=UUID=0x2A38,PROPERTIES=0x02,MIN_LEN=1,MAX_LEN=1,VALUE=00",
        &["2", "OK"],
    );
    link.expect("AT+GATTCHAR=2,03", &["OK"]);
    for bpm in readings {
        link.expect(&format!("AT+GATTCHAR=1,00-{:02X}", bpm), &["OK"]);
    }
    link.expect("AT+GATTCHAR=2", &["03", "OK"]);
    link
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("bluefruit_gatt=info".parse().unwrap()),
        )
        .init();

    let service = uuid_from_u16(0x180D);
    let service_text = bluefruit_gatt::protocol::hex::encode(service.as_bytes())?;
    let readings = [72u8, 75, 79, 77];

    let link = simulated_module(&service_text, &readings);
    let session = Session::with_config(link, SessionConfig::new().with_verbose(true));
    let mut gatt = Gatt::from_session(session);

    gatt.set_device_name("Pulse")?;
    gatt.add_service_uuid(&service)?;

    let measurement = gatt.add_characteristic(
        HEART_RATE_MEASUREMENT,
        CharacteristicProperties::NOTIFY,
        2,
        3,
    )?;
    let location =
        gatt.add_characteristic(BODY_SENSOR_LOCATION, CharacteristicProperties::READ, 1, 1)?;

    // Finger
    gatt.set_characteristic_value(location, &[0x03])?;

    for bpm in readings {
        // Flags byte 0: 8-bit heart rate value follows
        gatt.set_characteristic_value(measurement, &[0x00, bpm])?;
        println!("Published {} bpm", bpm);
    }

    let mut value = [0u8; 1];
    let count = gatt.get_characteristic_value(location, &mut value)?;
    println!("Sensor location readback: {:02X?}", &value[..count]);

    Ok(())
}
