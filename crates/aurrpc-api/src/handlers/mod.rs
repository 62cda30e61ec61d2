//! HTTP handlers: the public RPC surface, the admin surface, and the
//! status/documentation pages.

pub mod admin;
pub mod rpc;
pub mod status;

/// JSONP responses.
pub(crate) const CONTENT_TYPE_JS: &str = "text/javascript";
/// OpenSearch suggestion responses.
pub(crate) const CONTENT_TYPE_OPENSEARCH: &str = "application/x-suggestions+json";
