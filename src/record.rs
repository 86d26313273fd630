use crate::error::HotboxError;
use serde::Deserialize;

/// One sample as printed by the hot box firmware, e.g.
/// `{"ms":61000,"sensors":[{"sensor00":26.5,"sensor01":27.1,"sensor02":21.0}],"sensorMean":26.8,"fan":220,"heatingElement":false}`
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub elapsed_ms: u64,
    pub sensor_readings: [f64; 3],
    pub sensor_mean: f64,
    pub fan_level: u32,
    pub heating_element: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    ms: u64,
    sensors: Vec<RawSensors>,
    sensor_mean: f64,
    fan: u32,
    heating_element: Flag,
}

#[derive(Deserialize)]
struct RawSensors {
    sensor00: f64,
    sensor01: f64,
    sensor02: f64,
}

/// the relay state is serialized as a bool by the firmware, older logs carry 0/1
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl From<Flag> for i64 {
    fn from(flag: Flag) -> i64 {
        match flag {
            Flag::Bool(b) => b as i64,
            Flag::Int(i) => i,
        }
    }
}

impl LogRecord {
    /// Parse a single JSON line; `index` is only used for the error report.
    pub fn from_json_line(line: &str, index: usize) -> Result<LogRecord, HotboxError> {
        let raw: RawRecord = serde_json::from_str(line.trim())
            .map_err(|source| HotboxError::Record { index, source })?;
        let first = raw
            .sensors
            .into_iter()
            .next()
            .ok_or(HotboxError::MissingSensors { index })?;
        Ok(LogRecord {
            elapsed_ms: raw.ms,
            sensor_readings: [first.sensor00, first.sensor01, first.sensor02],
            sensor_mean: raw.sensor_mean,
            fan_level: raw.fan,
            heating_element: raw.heating_element.into(),
        })
    }
}

/// true for lines that look like a JSON object once trimmed, i.e. `^\{.*\}$`
pub fn is_json_line(line: &str) -> bool {
    let l = line.trim();
    l.starts_with('{') && l.ends_with('}')
}

/// Keeps the lines that look like JSON objects, verbatim and in their order.
/// No further validation: a line with matching braces but broken content
/// fails later in `parse_records`.
pub fn filter_json_lines<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter(|l| is_json_line(l.as_ref()))
        .map(|l| l.as_ref().to_string())
        .collect()
}

/// Parses every filtered line, stopping at the first bad one.
pub fn parse_records(lines: &[String]) -> Result<Vec<LogRecord>, HotboxError> {
    lines
        .iter()
        .enumerate()
        .map(|(i, l)| LogRecord::from_json_line(l, i))
        .collect()
}
