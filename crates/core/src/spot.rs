//! Spot pointer/content model and the legacy/split record union.
//!
//! Spots are stored split in two: a lightweight pointer document
//! (category, tags, thumbnail) that every map client loads, and a heavy
//! content document (memo, inline photos) fetched lazily on first
//! interaction. Documents written before the split carry memo and photos
//! inline on the pointer; that distinction is resolved exactly once, at
//! the read boundary, into [`SpotRecord`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{DocId, SpotAuthor, Timestamp, WireTimestamp};

/// Cap on photos per spot, enforced before any write.
pub const MAX_PHOTOS_PER_SPOT: usize = 2;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Category of a spot pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotCategory {
    Prohibited,
    Caution,
    Info,
}

impl SpotCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prohibited => "prohibited",
            Self::Caution => "caution",
            Self::Info => "info",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "prohibited" => Some(Self::Prohibited),
            "caution" => Some(Self::Caution),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    /// All valid category values.
    pub const ALL: &'static [&'static str] = &["prohibited", "caution", "info"];

    /// Suggested tag set for this category, as offered by the collection UI.
    pub fn default_tags(&self) -> &'static [&'static str] {
        match self {
            Self::Prohibited => &["ステッカーあり", "住人拒否", "管理人NG", "過去にクレーム"],
            Self::Caution => &["犬注意", "ポスト場所不明", "投函口狭い", "足元注意", "チラシ溢れ"],
            Self::Info => &["集合ポスト", "管理人許可済", "その他"],
        }
    }
}

impl std::fmt::Display for SpotCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Spot / SpotContent
// ---------------------------------------------------------------------------

/// A geographic coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Whether both components are finite (NaN coordinates render nothing).
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// The lightweight spot pointer record.
#[derive(Debug, Clone, PartialEq)]
pub struct Spot {
    pub id: DocId,
    pub name: Option<String>,
    pub location: GeoPoint,
    pub category: SpotCategory,
    pub tags: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: Timestamp,
    pub created_by: SpotAuthor,
}

/// The heavyweight content record, keyed 1:1 by spot id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotContent {
    pub id: DocId,
    pub memo: String,
    pub photo_urls: Vec<String>,
}

impl SpotContent {
    /// The resolution of a missing content document: never an error,
    /// always empty content.
    pub fn empty(id: impl Into<DocId>) -> Self {
        Self {
            id: id.into(),
            memo: String::new(),
            photo_urls: Vec::new(),
        }
    }

    /// Serialize to the content document wire shape.
    pub fn to_wire(&self) -> Value {
        serde_json::json!({ "memo": self.memo, "photoUrls": self.photo_urls })
    }

    /// Deserialize a content document. Missing fields default to empty.
    pub fn from_wire(record: &Value, id: &str) -> Self {
        Self {
            id: id.to_string(),
            memo: record
                .get("memo")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            photo_urls: string_array(record.get("photoUrls")),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire codec
// ---------------------------------------------------------------------------

/// Mirror of a spot pointer document, including the legacy inline fields
/// that pre-split documents still carry.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSpot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    location: GeoPoint,
    #[serde(default)]
    category: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thumbnail_url: Option<String>,
    #[serde(default)]
    created_at: Option<WireTimestamp>,
    #[serde(default)]
    created_by: Option<SpotAuthor>,
    // Legacy inline fields (read-only; never written by this codec).
    #[serde(default, skip_serializing)]
    memo: Option<String>,
    #[serde(default, skip_serializing)]
    photo_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing)]
    photo_url: Option<String>,
}

/// Serialize a spot pointer to its store wire record.
pub fn to_wire(spot: &Spot) -> Value {
    let wire = WireSpot {
        name: spot.name.clone(),
        location: spot.location,
        category: spot.category.as_str().to_string(),
        tags: spot.tags.clone(),
        thumbnail_url: spot.thumbnail_url.clone(),
        created_at: Some(spot.created_at.into()),
        created_by: Some(spot.created_by.clone()),
        ..WireSpot::default()
    };
    serde_json::to_value(wire).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// SpotRecord: the legacy/split union
// ---------------------------------------------------------------------------

/// A spot document as read from the store, with its schema variant
/// resolved once at the data-access boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum SpotRecord {
    /// Pre-split document carrying memo and photos inline on the pointer.
    Legacy {
        spot: Spot,
        memo: String,
        photo_urls: Vec<String>,
    },
    /// Post-split document; content lives in its own record under the
    /// same id.
    Split { spot: Spot },
}

impl SpotRecord {
    /// Resolve a raw pointer document into its schema variant.
    ///
    /// A document with a non-empty inline `photoUrls`, or a legacy
    /// single `photoUrl`, is a legacy record; everything else is split.
    /// Unknown categories default to `caution`.
    pub fn from_wire(record: &Value, id: &str) -> Self {
        let wire: WireSpot = serde_json::from_value(record.clone()).unwrap_or_default();

        let spot = Spot {
            id: id.to_string(),
            name: wire.name.filter(|n| !n.is_empty()),
            location: wire.location,
            category: SpotCategory::from_str(&wire.category).unwrap_or(SpotCategory::Caution),
            tags: wire.tags,
            thumbnail_url: wire.thumbnail_url,
            created_at: wire.created_at.map(Into::into).unwrap_or_default(),
            created_by: wire.created_by.unwrap_or_default(),
        };

        let mut legacy_photos = wire.photo_urls.unwrap_or_default();
        if legacy_photos.is_empty() {
            if let Some(single) = wire.photo_url.filter(|u| !u.is_empty()) {
                legacy_photos.push(single);
            }
        }

        if legacy_photos.is_empty() {
            Self::Split { spot }
        } else {
            Self::Legacy {
                memo: wire.memo.unwrap_or_default(),
                photo_urls: legacy_photos,
                spot,
            }
        }
    }

    pub fn spot(&self) -> &Spot {
        match self {
            Self::Legacy { spot, .. } | Self::Split { spot } => spot,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy { .. })
    }

    /// Whether displaying this record requires a content-document fetch.
    ///
    /// Legacy records never do; their inline values win unconditionally.
    pub fn needs_content_fetch(&self) -> bool {
        matches!(self, Self::Split { .. })
    }
}

// ---------------------------------------------------------------------------
// Display resolution
// ---------------------------------------------------------------------------

/// What a client displays for a spot, before or after the lazy content
/// fetch resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotView {
    pub memo: String,
    pub photo_urls: Vec<String>,
    /// True while the thumbnail stands in for the not-yet-fetched photos.
    pub placeholder: bool,
}

impl SpotView {
    /// Resolve the displayed memo and photos for a record.
    ///
    /// Legacy inline values win over everything and never consult
    /// `content`. For split records, fetched content wins; until it
    /// arrives the stored thumbnail is substituted as a placeholder.
    pub fn resolve(record: &SpotRecord, content: Option<&SpotContent>) -> Self {
        match record {
            SpotRecord::Legacy {
                memo, photo_urls, ..
            } => Self {
                memo: memo.clone(),
                photo_urls: photo_urls.clone(),
                placeholder: false,
            },
            SpotRecord::Split { spot } => match content {
                Some(content) => Self {
                    memo: content.memo.clone(),
                    photo_urls: content.photo_urls.clone(),
                    placeholder: false,
                },
                None => Self {
                    memo: String::new(),
                    photo_urls: spot.thumbnail_url.iter().cloned().collect(),
                    placeholder: spot.thumbnail_url.is_some(),
                },
            },
        }
    }
}

fn string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
