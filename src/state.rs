//! Application state shared across all request handlers

use std::sync::Arc;

use crate::cache::{MemoryCache, NoCache, PostCache};
use crate::config::Config;
use crate::content::{ContentError, GraphQlClient};
use crate::resolver::Resolver;

/// Shared handler state
///
/// The resolver sits behind an `Arc` so that cloning the state per request
/// stays cheap inside the Axum router.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,

    /// Host used for pages requested without a `Host` header
    pub default_host: String,
}

impl AppState {
    pub fn new(resolver: Resolver, default_host: impl Into<String>) -> Self {
        Self {
            resolver: Arc::new(resolver),
            default_host: default_host.into(),
        }
    }

    /// Wires the GraphQL client and post cache described by `config`
    pub fn from_config(config: &Config) -> Result<Self, ContentError> {
        let source = GraphQlClient::new(config.graphql_endpoint.clone(), config.fetch_timeout)?;

        let cache: Arc<dyn PostCache> = match config.cache_ttl {
            Some(ttl) => Arc::new(MemoryCache::new(config.cache_max_entries, ttl)),
            None => Arc::new(NoCache),
        };

        let resolver = Resolver::new(Arc::new(source), cache, config.site_base());
        Ok(Self::new(resolver, config.default_host.clone()))
    }
}
