use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::THUMBNAIL_PREFIX;

/// Opaque photo identifier.
///
/// The backend may hand out UUID strings or integer keys; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PhotoId(String);

impl PhotoId {
    pub fn new(id: impl Into<String>) -> Self {
        PhotoId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhotoId {
    fn from(value: &str) -> Self {
        PhotoId(value.to_string())
    }
}

impl<'de> Deserialize<'de> for PhotoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Integer(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => PhotoId(s),
            RawId::Integer(n) => PhotoId(n.to_string()),
        })
    }
}

/// Persisted photo row.
///
/// Listings may project only a few columns, so everything except `id` and
/// `url` falls back to a default when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: PhotoId,
    #[serde(default, rename = "user_id")]
    pub owner_id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PhotoRecord {
    /// Minimal record as returned by a `select=id,url,thumbnail_url` listing.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: PhotoId::new(id),
            owner_id: None,
            url: url.into(),
            thumbnail_url: None,
            tags: Vec::new(),
            year: None,
            description: None,
            created_at: None,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail_url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(thumbnail_url.into());
        self
    }

    /// A non-empty thumbnail URL is present.
    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// The thumbnail URL points below the derived `thumbnails/` prefix.
    pub fn has_derived_thumbnail(&self) -> bool {
        let marker = format!("{}/", THUMBNAIL_PREFIX);
        self.thumbnail_url
            .as_deref()
            .is_some_and(|url| url.contains(&marker))
    }
}

/// Fields accepted when inserting a photo.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewPhoto {
    pub user_id: String,
    pub url: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// Partial update of a photo row; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhotoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PhotoUpdate {
    pub fn thumbnail(url: impl Into<String>) -> Self {
        Self {
            thumbnail_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.thumbnail_url.is_none()
            && self.tags.is_none()
            && self.year.is_none()
            && self.description.is_none()
    }
}

/// Which rows a photo listing returns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoFilter {
    /// Restrict to one owner
    pub owner_id: Option<String>,
    /// Only rows without a thumbnail
    pub missing_thumbnail: bool,
}

impl PhotoFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn missing_thumbnail() -> Self {
        Self {
            missing_thumbnail: true,
            ..Default::default()
        }
    }

    pub fn owned_by(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            ..Default::default()
        }
    }
}

/// Limit/offset window over a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Pagination {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    pub fn first(limit: usize) -> Self {
        Self { limit, offset: 0 }
    }

    /// The window right after this one.
    pub fn next(self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset + self.limit,
        }
    }
}
