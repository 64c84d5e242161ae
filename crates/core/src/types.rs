//! Shared identifier, timestamp, and identity types.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Store-native document ids are opaque strings.
pub type DocId = String;

/// All timestamps are UTC.
pub type Timestamp = DateTime<Utc>;

/// Generate a fresh document id (UUID v4, hyphenless).
pub fn new_doc_id() -> DocId {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Portable timestamp representation, as persisted in documents and
/// backup files: whole seconds since the Unix epoch plus a nanosecond
/// remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTimestamp {
    pub seconds: i64,
    pub nanoseconds: u32,
}

impl From<Timestamp> for WireTimestamp {
    fn from(ts: Timestamp) -> Self {
        Self {
            seconds: ts.timestamp(),
            nanoseconds: ts.timestamp_subsec_nanos(),
        }
    }
}

impl From<WireTimestamp> for Timestamp {
    fn from(wire: WireTimestamp) -> Self {
        Utc.timestamp_opt(wire.seconds, wire.nanoseconds)
            .single()
            .unwrap_or_default()
    }
}

/// Serde adapter storing a [`Timestamp`] in its wire form.
///
/// Used on domain structs whose serialized shape must match the document
/// and backup-file format.
pub mod wire_ts {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Timestamp, WireTimestamp};

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        WireTimestamp::from(*ts).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        Ok(WireTimestamp::deserialize(deserializer)?.into())
    }
}

/// Identity attached to area updates, as provided by the auth provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub uid: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(rename = "photoURL", default)]
    pub photo_url: String,
}

/// Identity attached to spot creation. Spot records never store a photo
/// URL for their author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotAuthor {
    pub uid: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_timestamp_round_trip() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 15).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let wire = WireTimestamp::from(ts);
        assert_eq!(wire.nanoseconds, 123_456_789);
        let back: Timestamp = wire.into();
        assert_eq!(back, ts);
    }

    #[test]
    fn wire_timestamp_json_shape() {
        let wire = WireTimestamp {
            seconds: 1_700_000_000,
            nanoseconds: 42,
        };
        let json = serde_json::to_value(wire).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "seconds": 1_700_000_000, "nanoseconds": 42 })
        );
    }

    #[test]
    fn doc_ids_are_unique_and_hyphenless() {
        let a = new_doc_id();
        let b = new_doc_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(!a.contains('-'));
    }
}
