use arbiterid::{ArbiterId, EPOCH_MILLIS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON body of `POST /generate`. Both fields are optional.
///
/// Signed so that out-of-range values reach validation instead of failing
/// deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub id_type: Option<i64>,
    pub count: Option<i64>,
}

/// Query parameters of `POST /generate`, consulted when the body omits a
/// field. Unparseable values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuery {
    #[serde(rename = "type")]
    pub id_type: Option<String>,
    pub count: Option<String>,
}

impl GenerateQuery {
    pub fn id_type(&self) -> Option<i64> {
        self.id_type.as_deref().and_then(|s| s.trim().parse().ok())
    }

    pub fn count(&self) -> Option<i64> {
        self.count.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

/// One generated id in every representation the service hands out.
#[derive(Debug, Serialize)]
pub struct IdData {
    /// Base58 text.
    pub id: String,
    /// Raw value, serialized as a quoted decimal.
    pub id_int64: ArbiterId,
    pub id_base64: String,
    pub id_hex: String,
    #[serde(rename = "type")]
    pub id_type: u16,
    pub time: String,
    pub node: u8,
    pub sequence: u16,
}

impl From<ArbiterId> for IdData {
    fn from(id: ArbiterId) -> Self {
        Self {
            id: id.to_base58(),
            id_int64: id,
            id_base64: id.to_base64(),
            id_hex: format!("{:x}", id.to_raw()),
            id_type: id.category(),
            time: id.to_iso8601(),
            node: id.node(),
            sequence: id.sequence(),
        }
    }
}

/// A single id for `count == 1`, a list otherwise.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GenerateData {
    One(IdData),
    Many(Vec<IdData>),
}

impl From<Vec<ArbiterId>> for GenerateData {
    fn from(ids: Vec<ArbiterId>) -> Self {
        let mut data: Vec<IdData> = ids.into_iter().map(IdData::from).collect();
        if data.len() == 1 {
            if let Some(one) = data.pop() {
                return Self::One(one);
            }
        }
        Self::Many(data)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: &'static str,
    pub timestamp: String,
    pub node_id: u8,
    pub last_id: ArbiterId,
}

#[derive(Debug, Serialize)]
pub struct BitLayout {
    #[serde(rename = "type")]
    pub category: String,
    pub timestamp: String,
    pub node: String,
    pub sequence: String,
}

impl Default for BitLayout {
    fn default() -> Self {
        Self {
            category: format!(
                "{} bits (0-{})",
                ArbiterId::CATEGORY_BITS,
                ArbiterId::MAX_CATEGORY
            ),
            timestamp: format!(
                "{} bits (milliseconds since epoch)",
                ArbiterId::TIMESTAMP_BITS
            ),
            node: format!("{} bits (0-{})", ArbiterId::NODE_BITS, ArbiterId::MAX_NODE),
            sequence: format!(
                "{} bits (0-{})",
                ArbiterId::SEQUENCE_BITS,
                ArbiterId::MAX_SEQUENCE
            ),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InfoData {
    pub service: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub node_id: u8,
    pub epoch: String,
    pub epoch_millis: u64,
    pub bit_layout: BitLayout,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

impl InfoData {
    pub fn new(node_id: u8) -> Self {
        Self {
            service: "ArbiterID Generation Service",
            version: env!("CARGO_PKG_VERSION"),
            description: "Distributed unique ID generation service using a Snowflake-style layout",
            node_id,
            epoch: ArbiterId::ZERO.to_iso8601(),
            epoch_millis: EPOCH_MILLIS,
            bit_layout: BitLayout::default(),
            endpoints: BTreeMap::from([
                ("POST /generate", "Generate new ID(s)"),
                ("GET /health", "Health check"),
                ("GET /info", "Service information"),
            ]),
        }
    }
}

/// Wire format shared by every response.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope<()> {
    pub const fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}
