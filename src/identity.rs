//! Viewer identity resolution.
//!
//! The provider is chosen at the composition root. Nothing here manages
//! sessions; a provider only maps an incoming request to an identity.

use crate::models::Identity;
use axum::http::HeaderMap;
use clap::ValueEnum;
use std::sync::Arc;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";

pub trait IdentityProvider: Send + Sync {
    /// The authenticated identity behind a request, if any.
    fn identify(&self, headers: &HeaderMap) -> Option<Identity>;
}

/// Treats every request as unauthenticated.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousProvider;

impl IdentityProvider for AnonymousProvider {
    fn identify(&self, _headers: &HeaderMap) -> Option<Identity> {
        None
    }
}

/// Trusts `x-user-id` / `x-user-name` headers set by a fronting proxy.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderProvider;

impl IdentityProvider for HeaderProvider {
    fn identify(&self, headers: &HeaderMap) -> Option<Identity> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let subject = header(USER_ID_HEADER)?;
        Some(Identity::new(subject, header(USER_NAME_HEADER)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum IdentityMode {
    #[default]
    Anonymous,
    Header,
}

impl IdentityMode {
    pub fn provider(self) -> Arc<dyn IdentityProvider> {
        match self {
            IdentityMode::Anonymous => Arc::new(AnonymousProvider),
            IdentityMode::Header => Arc::new(HeaderProvider),
        }
    }
}

/// The viewer for a request, falling back to the anonymous identity.
pub fn viewer(provider: &dyn IdentityProvider, headers: &HeaderMap) -> Identity {
    provider
        .identify(headers)
        .unwrap_or_else(Identity::anonymous)
}
