//! Resolution of the account-level source every reservation write is attributed to.

use std::sync::OnceLock;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    client::{data_list, ApiClient},
    configuration::ApiEndpoints,
    credentials::Credentials,
    transport::Transport,
};

/// The source used whenever the API does not name a usable one.
pub const FALLBACK_SOURCE_ID: &str = "ss-123298-1";

/// Holds the resolved source identifier. It is filled at most once; concurrent first accesses
/// block on the single resolution in flight and every later access is a plain read.
#[derive(Debug, Default)]
pub struct SourceCache {
    source_id: OnceLock<String>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&str> {
        self.source_id.get().map(String::as_str)
    }
}

/// Returns the cached source identifier, resolving it through the sources endpoint on first use.
///
/// This never fails: a failed call, a response without a list, an empty list or a list in which no
/// entry carries an identifier all resolve to [`FALLBACK_SOURCE_ID`]. Either way the outcome is cached.
pub fn resolve_source_id<'c, T: Transport>(
    cache: &'c SourceCache,
    client: &ApiClient<T>,
    endpoints: &ApiEndpoints,
    credentials: &Credentials,
) -> &'c str {
    if let Some(source_id) = cache.get() {
        debug!(source_id, "using cached source");
        return source_id;
    }
    cache.source_id.get_or_init(|| {
        fetch_source_id(client, endpoints, credentials).unwrap_or_else(|| {
            warn!(
                fallback = FALLBACK_SOURCE_ID,
                "no usable source found, using the fallback source"
            );
            FALLBACK_SOURCE_ID.to_string()
        })
    })
}

fn fetch_source_id<T: Transport>(
    client: &ApiClient<T>,
    endpoints: &ApiEndpoints,
    credentials: &Credentials,
) -> Option<String> {
    info!("fetching available sources");
    let response = client
        .get(
            &endpoints.sources_url(),
            &[("propertyID", credentials.property_id())],
            credentials,
        )
        .map_err(|e| warn!(error = %e, "could not list sources"))
        .ok()?;
    let sources = data_list(&response)?;
    if sources.is_empty() {
        warn!("the sources listing is empty");
        return None;
    }
    for (idx, source) in sources.iter().enumerate() {
        info!(
            position = idx + 1,
            source_id = %source_id_of(source).unwrap_or_default(),
            name = source_name_of(source),
            "available source"
        );
    }
    let (source, source_id) = sources
        .iter()
        .find_map(|source| source_id_of(source).map(|id| (source, id)))?;
    info!(source_id = %source_id, name = source_name_of(source), "selected source");
    Some(source_id)
}

// Identifiers are strings upstream, but a numeric one is accepted too. Empty strings do not count.
fn source_id_of(source: &Value) -> Option<String> {
    match source.get("sourceID")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn source_name_of(source: &Value) -> &str {
    source
        .get("sourceName")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::tests::{ok, ScriptedTransport},
        transport::{RawResponse, TransportError},
    };
    use std::time::Duration;

    fn client(outcomes: Vec<Result<RawResponse, TransportError>>) -> ApiClient<ScriptedTransport> {
        ApiClient::with_transport(ScriptedTransport::new(outcomes)).with_retry_backoff(Duration::ZERO)
    }

    fn resolve(cache: &SourceCache, client: &ApiClient<ScriptedTransport>) -> String {
        resolve_source_id(
            cache,
            client,
            &ApiEndpoints::new("http://api"),
            &Credentials::new("token", "6000"),
        )
        .to_string()
    }

    #[test]
    fn second_resolution_uses_the_cache() {
        let cache = SourceCache::new();
        let client = client(vec![ok(
            r#"{"success": true, "data": [{"sourceID": "ss-1", "sourceName": "Walk-In"}]}"#,
        )]);
        assert_eq!("ss-1", resolve(&cache, &client));
        assert_eq!(1, client.transport().calls());
        assert_eq!("ss-1", resolve(&cache, &client));
        assert_eq!(1, client.transport().calls());
    }

    #[test]
    fn queries_sources_for_the_property() {
        let cache = SourceCache::new();
        let client = client(vec![ok(r#"[{"sourceID": "ss-1"}]"#)]);
        resolve(&cache, &client);
        let seen = client.transport().seen.lock().unwrap();
        assert_eq!("http://api/getSources", seen[0].1);
        assert_eq!(vec![("propertyID".to_string(), "6000".to_string())], seen[0].2);
    }

    #[test]
    fn picks_the_first_entry_with_an_identifier() {
        let cache = SourceCache::new();
        let client = client(vec![ok(
            r#"[{"sourceName": "No id"}, {"sourceID": ""}, {"sourceID": "ss-7"}, {"sourceID": "ss-8"}]"#,
        )]);
        assert_eq!("ss-7", resolve(&cache, &client));
    }

    #[test]
    fn empty_listing_falls_back_and_caches_the_fallback() {
        let cache = SourceCache::new();
        let client = client(vec![ok(r#"{"success": true, "data": []}"#)]);
        assert_eq!(FALLBACK_SOURCE_ID, resolve(&cache, &client));
        assert_eq!(Some(FALLBACK_SOURCE_ID), cache.get());
        assert_eq!(FALLBACK_SOURCE_ID, resolve(&cache, &client));
        assert_eq!(1, client.transport().calls());
    }

    #[test]
    fn failed_call_falls_back() {
        let cache = SourceCache::new();
        let client = client(vec![Ok(RawResponse {
            status: 401,
            body: r#"{"message": "Unauthorized"}"#.to_string(),
        })]);
        assert_eq!(FALLBACK_SOURCE_ID, resolve(&cache, &client));
    }

    #[test]
    fn entries_without_identifiers_fall_back() {
        let cache = SourceCache::new();
        let client = client(vec![ok(r#"[{"sourceName": "A"}, null]"#)]);
        assert_eq!(FALLBACK_SOURCE_ID, resolve(&cache, &client));
    }

    #[test]
    fn cache_is_never_overwritten() {
        let cache = SourceCache::new();
        let first = client(vec![ok(r#"[{"sourceID": "ss-1"}]"#)]);
        let second = client(vec![ok(r#"[{"sourceID": "ss-2"}]"#)]);
        assert_eq!("ss-1", resolve(&cache, &first));
        assert_eq!("ss-1", resolve(&cache, &second));
        assert_eq!(0, second.transport().calls());
    }
}
