//! # PMS client
//!
//! A small blocking client for the property-management API our synthetic reservations are written to.
//! It normalizes every call into an [`ApiResult`], retries transport failures with a fixed backoff and
//! resolves the account-level source identifier each reservation write needs.

pub mod client;
pub mod configuration;
pub mod credentials;
pub mod room_types;
pub mod sources;
pub mod transport;

pub use client::{ApiClient, ApiError, ApiResult, DEFAULT_MAX_RETRIES};
pub use configuration::ApiEndpoints;
pub use credentials::Credentials;
pub use room_types::{list_room_types, test_connection, RoomType};
pub use sources::{resolve_source_id, SourceCache, FALLBACK_SOURCE_ID};
pub use transport::{
    HttpMethod, RawResponse, RequestBody, ReqwestTransport, Transport, TransportError,
    TransportRequest,
};
