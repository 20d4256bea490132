//! Content Query Service client
//!
//! The page only ever issues one query: a post looked up by its URI.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::model::{PostPath, PostRecord};

pub const POST_QUERY: &str = r#"query PostByUri($id: ID!) {
  post(id: $id, idType: URI) {
    id
    excerpt
    title
    link
    dateGmt
    modifiedGmt
    content
    author {
      node {
        name
      }
    }
    featuredImage {
      node {
        sourceUrl
        altText
      }
    }
  }
}"#;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content service unreachable: {0}")]
    Unavailable(String),

    #[error("content service timed out")]
    Timeout,

    #[error("content service answered with HTTP {0}")]
    Status(u16),

    #[error("content service sent an unexpected payload: {0}")]
    InvalidResponse(String),

    #[error("content query failed: {0}")]
    Query(String),
}

impl From<reqwest::Error> for ContentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ContentError::Timeout
        } else if err.is_decode() {
            ContentError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ContentError::Status(status.as_u16())
        } else {
            ContentError::Unavailable(err.to_string())
        }
    }
}

/// Source of post records
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Looks up the post published under `path`; `Ok(None)` when there is none
    async fn fetch_post(&self, path: &PostPath) -> Result<Option<PostRecord>, ContentError>;
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<PostData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct PostData {
    post: Option<PostRecord>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// [`ContentSource`] backed by a GraphQL endpoint
#[derive(Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl GraphQlClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, ContentError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ContentError::Unavailable(e.to_string()))?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl ContentSource for GraphQlClient {
    async fn fetch_post(&self, path: &PostPath) -> Result<Option<PostRecord>, ContentError> {
        let body = json!({
            "query": POST_QUERY,
            "variables": { "id": path.uri_id() },
        });

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        tracing::debug!(path = %path, len = text.len(), "content query answered");
        parse_response(&text)
    }
}

fn parse_response(text: &str) -> Result<Option<PostRecord>, ContentError> {
    let parsed: GraphQlResponse =
        serde_json::from_str(text).map_err(|e| ContentError::InvalidResponse(e.to_string()))?;

    match parsed.data {
        Some(PostData { post: Some(post) }) => Ok(Some(post)),
        _ if !parsed.errors.is_empty() => {
            let messages = parsed
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            Err(ContentError::Query(messages))
        }
        Some(PostData { post: None }) => Ok(None),
        None => Err(ContentError::InvalidResponse("missing data".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_post_is_not_found() {
        let result = parse_response(r#"{"data":{"post":null}}"#).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn post_is_decoded() {
        let post = parse_response(r#"{"data":{"post":{"id":"cG9zdDox","title":"Hi"}}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(post.id, "cG9zdDox");
        assert_eq!(post.title(), "Hi");
    }

    #[test]
    fn graphql_errors_without_post_fail() {
        let err = parse_response(
            r#"{"errors":[{"message":"bad id"},{"message":"try again"}],"data":{"post":null}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ContentError::Query(ref m) if m == "bad id; try again"));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            parse_response("<html>maintenance</html>"),
            Err(ContentError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_response("{}"),
            Err(ContentError::InvalidResponse(_))
        ));
    }

    #[test]
    fn query_asks_for_every_rendered_field() {
        for field in ["excerpt", "dateGmt", "modifiedGmt", "content", "sourceUrl", "altText", "idType: URI"] {
            assert!(POST_QUERY.contains(field), "missing {field}");
        }
    }
}
