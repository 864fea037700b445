//! Wire types for sensor readings.
//!
//! These types match the JSON objects the field controller writes to the
//! realtime database. They are the common data format between every source
//! (feed, simulation, files, streams) and the dashboard.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single sensor sample.
///
/// Immutable once received; the next reading supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// Soil moisture in percent (0-100).
    pub soil_moisture: f64,

    /// Tank water level in percent (0-100).
    pub water_level: f64,

    /// Solar panel voltage in volts (0-3.3 typical).
    pub solar_voltage: f64,

    /// Whether the pump is running.
    /// On the wire this is `0`/`1` (or `true`/`false`); only `1` means active.
    #[serde(
        default,
        deserialize_with = "deserialize_pump_status",
        serialize_with = "serialize_pump_status"
    )]
    pub pump_status: bool,

    /// Air temperature in degrees Celsius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Relative humidity in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,

    /// When the sample was taken, as epoch seconds or epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl Reading {
    /// Create a reading from the three mandatory metrics.
    pub fn new(soil_moisture: f64, water_level: f64, solar_voltage: f64) -> Self {
        Self {
            soil_moisture,
            water_level,
            solar_voltage,
            pump_status: false,
            temperature: None,
            humidity: None,
            timestamp: None,
        }
    }

    /// Set the pump status.
    pub fn with_pump(mut self, active: bool) -> Self {
        self.pump_status = active;
        self
    }

    /// Set the climate metrics.
    pub fn with_climate(mut self, temperature: f64, humidity: f64) -> Self {
        self.temperature = Some(temperature);
        self.humidity = Some(humidity);
        self
    }

    /// Set the sample timestamp.
    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PumpValue {
    Flag(bool),
    Number(f64),
}

fn deserialize_pump_status<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<PumpValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(PumpValue::Flag(flag)) => flag,
        Some(PumpValue::Number(n)) => n == 1.0,
        None => false,
    })
}

fn serialize_pump_status<S>(active: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*active))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_reading() {
        let json = r#"{
            "soilMoisture": 45,
            "waterLevel": 75,
            "solarVoltage": 2.8,
            "pumpStatus": 1,
            "temperature": 24.5,
            "humidity": 61,
            "timestamp": 1718000000
        }"#;

        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.soil_moisture, 45.0);
        assert_eq!(reading.water_level, 75.0);
        assert_eq!(reading.solar_voltage, 2.8);
        assert!(reading.pump_status);
        assert_eq!(reading.temperature, Some(24.5));
        assert_eq!(reading.humidity, Some(61.0));
        assert_eq!(reading.timestamp, Some(1_718_000_000.0));
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{"soilMoisture": 10, "waterLevel": 20, "solarVoltage": 1.5}"#;
        let reading: Reading = serde_json::from_str(json).unwrap();
        assert!(!reading.pump_status);
        assert!(reading.temperature.is_none());
        assert!(reading.humidity.is_none());
        assert!(reading.timestamp.is_none());
    }

    #[test]
    fn test_pump_status_variants() {
        let parse = |pump: &str| -> bool {
            let json = format!(
                r#"{{"soilMoisture": 1, "waterLevel": 1, "solarVoltage": 1, "pumpStatus": {}}}"#,
                pump
            );
            serde_json::from_str::<Reading>(&json).unwrap().pump_status
        };

        assert!(parse("1"));
        assert!(parse("true"));
        assert!(!parse("0"));
        assert!(!parse("false"));
        assert!(!parse("null"));
        // Only exactly 1 counts as active
        assert!(!parse("2"));
    }

    #[test]
    fn test_missing_required_field_fails() {
        let json = r#"{"soilMoisture": 10, "waterLevel": 20}"#;
        assert!(serde_json::from_str::<Reading>(json).is_err());
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let reading = Reading::new(45.0, 75.0, 2.8).with_pump(true);
        let value = serde_json::to_value(&reading).unwrap();
        assert_eq!(value["soilMoisture"], 45.0);
        assert_eq!(value["pumpStatus"], 1);
        assert!(value.get("temperature").is_none());
    }
}
