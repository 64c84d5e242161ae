//! Posting area model, status enum, and the wire record codec.
//!
//! The backing store rejects nested arrays, so polygon geometry is stored
//! as a JSON string inside the document and parsed back on read. The
//! codec is lossless for well-formed areas:
//! `from_wire(to_wire(area), id) == area`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{wire_ts, DocId, Timestamp, UserRef, WireTimestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Posting-progress status of an area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaStatus {
    #[default]
    Planned,
    Completed,
    Cancelled,
}

impl AreaStatus {
    /// Return the status name as stored in area documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(Self::Planned),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &["planned", "completed", "cancelled"];
}

impl std::fmt::Display for AreaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// GeoJSON-like polygon geometry: rings of `[lng, lat]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

impl Geometry {
    /// Build a single-ring polygon.
    pub fn polygon(ring: Vec<[f64; 2]>) -> Self {
        Self::Polygon {
            coordinates: vec![ring],
        }
    }

    /// The invalid-geometry sentinel: an empty coordinate ring.
    ///
    /// Produced when a stored geometry cannot be parsed. Callers skip
    /// rendering such areas instead of failing.
    pub fn invalid() -> Self {
        Self::Polygon {
            coordinates: Vec::new(),
        }
    }

    /// Whether the geometry carries a drawable ring (at least a triangle).
    pub fn is_renderable(&self) -> bool {
        let Self::Polygon { coordinates } = self;
        coordinates.first().is_some_and(|ring| ring.len() >= 3)
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::invalid()
    }
}

// ---------------------------------------------------------------------------
// Area
// ---------------------------------------------------------------------------

/// A user-drawn posting area.
///
/// The serde shape of this struct is the portable form used by backup
/// files and API responses: camelCase keys, structured geometry, and
/// `{seconds, nanoseconds}` timestamps. The store-internal form (geometry
/// as a string) is produced by [`to_wire`] / consumed by [`from_wire`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    #[serde(default)]
    pub id: DocId,
    #[serde(default)]
    pub geometry: Geometry,
    #[serde(default)]
    pub status: AreaStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_count: Option<i64>,
    #[serde(default)]
    pub memo: String,
    #[serde(with = "wire_ts")]
    pub created_at: Timestamp,
    #[serde(with = "wire_ts")]
    pub updated_at: Timestamp,
    #[serde(default)]
    pub updated_by: UserRef,
}

// ---------------------------------------------------------------------------
// Wire codec
// ---------------------------------------------------------------------------

/// Mirror of an area document as stored, with every field optional so
/// reads never fail outright.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireArea {
    #[serde(default)]
    geometry: Value,
    #[serde(default)]
    status: String,
    #[serde(default)]
    planned_count: Option<i64>,
    #[serde(default)]
    actual_count: Option<i64>,
    #[serde(default)]
    memo: String,
    #[serde(default)]
    created_at: Option<WireTimestamp>,
    #[serde(default)]
    updated_at: Option<WireTimestamp>,
    #[serde(default)]
    updated_by: Option<UserRef>,
}

/// Serialize an area to its store wire record.
///
/// Geometry goes out as a JSON string; timestamps in `{seconds,
/// nanoseconds}` form; the document id is the store key, never a field.
pub fn to_wire(area: &Area) -> Value {
    let mut record = serde_json::Map::new();
    record.insert(
        "geometry".into(),
        Value::String(serde_json::to_string(&area.geometry).unwrap_or_default()),
    );
    record.insert("status".into(), Value::String(area.status.as_str().into()));
    if let Some(n) = area.planned_count {
        record.insert("plannedCount".into(), n.into());
    }
    if let Some(n) = area.actual_count {
        record.insert("actualCount".into(), n.into());
    }
    record.insert("memo".into(), Value::String(area.memo.clone()));
    record.insert(
        "createdAt".into(),
        serde_json::to_value(WireTimestamp::from(area.created_at)).unwrap_or_default(),
    );
    record.insert(
        "updatedAt".into(),
        serde_json::to_value(WireTimestamp::from(area.updated_at)).unwrap_or_default(),
    );
    record.insert(
        "updatedBy".into(),
        serde_json::to_value(&area.updated_by).unwrap_or_default(),
    );
    Value::Object(record)
}

/// Deserialize a store wire record into an [`Area`].
///
/// Total: malformed geometry degrades to the invalid sentinel, missing
/// fields default, unknown status falls back to `planned`. A read never
/// fails because of a single bad document.
pub fn from_wire(record: &Value, id: &str) -> Area {
    let wire: WireArea = serde_json::from_value(record.clone()).unwrap_or_else(|_| WireArea {
        geometry: Value::Null,
        status: String::new(),
        planned_count: None,
        actual_count: None,
        memo: String::new(),
        created_at: None,
        updated_at: None,
        updated_by: None,
    });

    Area {
        id: id.to_string(),
        geometry: parse_geometry(&wire.geometry),
        status: AreaStatus::from_str(&wire.status).unwrap_or_default(),
        planned_count: wire.planned_count,
        actual_count: wire.actual_count,
        memo: wire.memo,
        created_at: wire.created_at.map(Into::into).unwrap_or_default(),
        updated_at: wire.updated_at.map(Into::into).unwrap_or_default(),
        updated_by: wire.updated_by.unwrap_or_default(),
    }
}

/// Parse a stored geometry value.
///
/// Accepts both the string form this codec writes and an
/// already-structured object (pre-migration documents). Anything that is
/// not a well-formed `Polygon` becomes the invalid sentinel.
fn parse_geometry(raw: &Value) -> Geometry {
    let parsed = match raw {
        Value::String(s) => serde_json::from_str::<Geometry>(s),
        other => serde_json::from_value::<Geometry>(other.clone()),
    };
    parsed.unwrap_or_else(|_| Geometry::invalid())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    fn sample_area() -> Area {
        Area {
            id: "area-1".into(),
            geometry: Geometry::polygon(vec![
                [139.70, 35.68],
                [139.71, 35.68],
                [139.71, 35.69],
                [139.70, 35.68],
            ]),
            status: AreaStatus::Completed,
            planned_count: Some(120),
            actual_count: Some(87),
            memo: "北側は集合住宅が多い".into(),
            created_at: Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 4, 2, 9, 30, 0).unwrap(),
            updated_by: UserRef {
                uid: "u-1".into(),
                display_name: "Sato".into(),
                photo_url: "https://example.com/p.png".into(),
            },
        }
    }

    #[test]
    fn wire_round_trip_is_lossless() {
        let area = sample_area();
        let record = to_wire(&area);
        assert!(record["geometry"].is_string());
        assert_eq!(from_wire(&record, "area-1"), area);
    }

    #[test]
    fn wire_round_trip_without_counts() {
        let mut area = sample_area();
        area.planned_count = None;
        area.actual_count = None;
        let record = to_wire(&area);
        assert!(record.get("plannedCount").is_none());
        assert_eq!(from_wire(&record, "area-1"), area);
    }

    #[test]
    fn reads_structured_geometry_object() {
        // Pre-migration documents carried geometry as a nested object.
        let record = json!({
            "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]] },
            "status": "planned",
            "memo": "",
            "createdAt": { "seconds": 0, "nanoseconds": 0 },
            "updatedAt": { "seconds": 0, "nanoseconds": 0 },
            "updatedBy": { "uid": "u", "displayName": "", "photoURL": "" },
        });
        let area = from_wire(&record, "a");
        assert!(area.geometry.is_renderable());
    }

    #[test]
    fn malformed_geometry_degrades_to_sentinel() {
        for bad in [
            json!("not json at all"),
            json!("{\"type\":\"Point\",\"coordinates\":[1,2]}"),
            json!({ "type": "LineString", "coordinates": [[0, 0]] }),
            json!(42),
        ] {
            let record = json!({ "geometry": bad });
            let area = from_wire(&record, "a");
            assert_eq!(area.geometry, Geometry::invalid());
            assert!(!area.geometry.is_renderable());
        }
    }

    #[test]
    fn unknown_status_falls_back_to_planned() {
        let record = json!({ "status": "archived" });
        assert_eq!(from_wire(&record, "a").status, AreaStatus::Planned);
    }

    #[test]
    fn backup_shape_uses_wire_timestamps() {
        let area = sample_area();
        let json = serde_json::to_value(&area).unwrap();
        assert_eq!(json["createdAt"]["seconds"], area.created_at.timestamp());
        assert_eq!(json["updatedBy"]["displayName"], "Sato");
        assert_eq!(json["geometry"]["type"], "Polygon");

        let back: Area = serde_json::from_value(json).unwrap();
        assert_eq!(back, area);
    }

    #[test]
    fn status_string_round_trip() {
        for name in AreaStatus::ALL {
            assert_eq!(AreaStatus::from_str(name).unwrap().as_str(), *name);
        }
        assert!(AreaStatus::from_str("done").is_none());
    }
}
