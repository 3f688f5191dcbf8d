use serde::{Deserialize, Deserializer, Serialize};

/// Invocation payload sent to the backend function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendRequest {
    pub range: TimeRange,
    pub targets: Targets,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    /// RFC3339, second precision.
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Targets {
    pub target: String,
    #[serde(rename = "type")]
    pub r#type: String,
}

/// A `[value, timestamp_ms]` pair as emitted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datapoint(pub i64, pub i64);

impl Datapoint {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSeries {
    #[serde(rename = "Target", alias = "target", default, deserialize_with = "null_as_default")]
    pub target: String,
    #[serde(
        rename = "Datapoints",
        alias = "datapoints",
        default,
        deserialize_with = "null_as_default"
    )]
    pub datapoints: Vec<Datapoint>,
}

/// Backends written in dynamic languages send `null` for empty fields.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub type BackendResponse = Vec<BackendSeries>;
