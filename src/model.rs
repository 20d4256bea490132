//! Data models for the post page service
//!
//! This module defines the request-side types (post path, query parameters)
//! and the typed shape of the post record returned by the content service.

use std::fmt;

use chrono::NaiveDateTime;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Timestamp layout used by the content service for `dateGmt`/`modifiedGmt`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Characters left as-is when encoding a post path for a redirect.
const URI_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Ordered URL segments of a post, joined with `/`
///
/// The joined form is both the cache key and the base of the GraphQL
/// identifier. Empty segments (from leading, trailing or doubled slashes)
/// are dropped when the path is built.
///
/// # Example
/// `/2024/05/hello-world/` -> `"2024/05/hello-world"`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct PostPath(String);

impl PostPath {
    /// Builds a path from route segments, skipping empty ones
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .filter(|s| !s.as_ref().is_empty())
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("/");
        Self(joined)
    }

    /// Builds a path from the raw catch-all route parameter (`a/b/c`)
    pub fn from_route(raw: &str) -> Self {
        Self::from_segments(raw.split('/'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// URI identifier understood by the content service: `"/<path>/"`
    pub fn uri_id(&self) -> String {
        format!("/{}/", self.0)
    }

    /// Percent-encodes the path the way `encodeURI` does, except that
    /// `?` and `#` are escaped too so they stay inside the path
    pub fn encoded(&self) -> String {
        utf8_percent_encode(&self.0, URI_PATH).to_string()
    }
}

impl fmt::Display for PostPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// GraphQL connection edge wrapper (`{ "node": ... }`)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Author {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedImage {
    pub source_url: String,
    pub alt_text: Option<String>,
}

/// A post as returned by the content service
///
/// Every field consumed by the page is listed explicitly; anything else the
/// service sends is ignored. Nullable fields on the service side are
/// `Option`s here so a sparse post still renders.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    /// Opaque global id assigned by the service
    pub id: String,

    /// HTML excerpt, sanitized before it is used in meta tags
    pub excerpt: Option<String>,

    pub title: Option<String>,

    /// Canonical permalink on the CMS side
    pub link: Option<String>,

    /// Publication time in GMT
    pub date_gmt: Option<NaiveDateTime>,

    /// Last modification time in GMT
    pub modified_gmt: Option<NaiveDateTime>,

    /// HTML body, trusted as pre-sanitized by the content service
    pub content: Option<String>,

    pub author: Option<Edge<Author>>,

    pub featured_image: Option<Edge<FeaturedImage>>,
}

impl PostRecord {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().map(|edge| edge.node.name.as_str())
    }

    pub fn image(&self) -> Option<&FeaturedImage> {
        self.featured_image.as_ref().map(|edge| &edge.node)
    }

    /// Alt text for the featured image, falling back to the post title
    pub fn image_alt(&self) -> &str {
        self.image()
            .and_then(|image| image.alt_text.as_deref())
            .filter(|alt| !alt.is_empty())
            .unwrap_or_else(|| self.title())
    }

    pub fn published_time(&self) -> Option<String> {
        self.date_gmt
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn modified_time(&self) -> Option<String> {
        self.modified_gmt
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
    }
}

/// Everything the page renderer needs for one post
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RenderPayload {
    pub path: PostPath,
    pub post: PostRecord,
    pub host: String,
}

/// Query parameters accepted on a post URL
///
/// # Example
/// Query string: `?fbclid=IwAR0abc`
#[derive(Debug, Default)]
pub struct PostParams {
    /// Ad-click tracking marker; its presence alone triggers the redirect
    pub fbclid: Option<String>,
}

impl PostParams {
    /// Picks the known parameters out of raw query pairs
    ///
    /// Keys may repeat (`?fbclid=a&fbclid=b`); the first non-empty value wins.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let fbclid = pairs
            .iter()
            .filter(|(key, _)| key == "fbclid")
            .map(|(_, value)| value.clone())
            .reduce(|first, next| if first.is_empty() { next } else { first });
        Self { fbclid }
    }

    /// The tracking marker, treating an empty value as absent
    pub fn tracking_marker(&self) -> Option<&str> {
        self.fbclid.as_deref().filter(|v| !v.is_empty())
    }
}
