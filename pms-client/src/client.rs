use std::{thread, time::Duration};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    configuration::RETRY_BACKOFF,
    credentials::Credentials,
    transport::{
        HttpMethod, RawResponse, RequestBody, ReqwestTransport, Transport, TransportError,
        TransportRequest,
    },
};

/// How often a call that failed at the transport level is attempted again.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Every failure a call can end in. The `Display` output is the message reported to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The API answered with a status other than 200/201. Never retried.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Request timed out after {retries} retries")]
    TimedOut { retries: u32 },
    #[error("Connection error - check your internet connection")]
    ConnectionFailed { retries: u32 },
    #[error("Connection error: {0}")]
    Unexpected(String),
}

/// The tagged result of a call: the parsed response body or the reason there is none.
pub type ApiResult = Result<Value, ApiError>;

pub struct ApiClient<T = ReqwestTransport> {
    transport: T,
    retry_backoff: Duration,
}

impl ApiClient<ReqwestTransport> {
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self::with_transport(ReqwestTransport::new()?))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            retry_backoff: RETRY_BACKOFF,
        }
    }

    /// Replaces the fixed pause between attempts.
    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issues a single API call.
    ///
    /// Timeouts and connection failures are retried up to `max_retries` times, waiting the same
    /// backoff before every attempt. A response with an error status is returned as
    /// [`ApiError::Rejected`] straight away.
    pub fn call(
        &self,
        method: HttpMethod,
        url: &str,
        params: &[(&str, &str)],
        credentials: &Credentials,
        body: Option<&RequestBody>,
        max_retries: u32,
    ) -> ApiResult {
        let request = TransportRequest {
            method,
            url,
            params,
            bearer_token: credentials.access_token(),
            body,
        };
        let mut retries = 0;
        loop {
            let failure = match self.transport.send(&request) {
                Ok(response) => return normalize_response(response),
                Err(failure) => failure,
            };
            let exhausted = retries >= max_retries;
            match &failure {
                TransportError::Timeout if exhausted => {
                    warn!(url, max_retries, "API call timed out, giving up");
                    return Err(ApiError::TimedOut {
                        retries: max_retries,
                    });
                }
                TransportError::Connection(reason) if exhausted => {
                    warn!(url, max_retries, %reason, "connection error, giving up");
                    return Err(ApiError::ConnectionFailed {
                        retries: max_retries,
                    });
                }
                TransportError::Timeout | TransportError::Connection(_) => {
                    retries += 1;
                    warn!(url, retry = retries, max_retries, error = %failure, "transport failure, retrying");
                    thread::sleep(self.retry_backoff);
                }
                TransportError::Other(reason) => {
                    warn!(url, %reason, "unexpected error");
                    return Err(ApiError::Unexpected(reason.clone()));
                }
            }
        }
    }

    pub fn get(&self, url: &str, params: &[(&str, &str)], credentials: &Credentials) -> ApiResult {
        self.call(
            HttpMethod::Get,
            url,
            params,
            credentials,
            None,
            DEFAULT_MAX_RETRIES,
        )
    }

    /// Posts a form-encoded body without query parameters.
    pub fn post_form(
        &self,
        url: &str,
        fields: Vec<(String, String)>,
        credentials: &Credentials,
    ) -> ApiResult {
        let body = RequestBody::Form(fields);
        self.call(
            HttpMethod::Post,
            url,
            &[],
            credentials,
            Some(&body),
            DEFAULT_MAX_RETRIES,
        )
    }
}

fn normalize_response(response: RawResponse) -> ApiResult {
    match response.status {
        200 | 201 => {
            if response.body.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&response.body)
                .map_err(|e| ApiError::Unexpected(format!("invalid JSON in response body: {}", e)))
        }
        status => {
            let message = error_message(&response.body)
                .unwrap_or_else(|| format!("HTTP {}", status));
            debug!(status, body = %response.body, "API error response");
            Err(ApiError::Rejected { status, message })
        }
    }
}

// The `message` field of a JSON object body, if there is one.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        Value::String(message) => Some(message.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// The list carried by a response, which is either a bare array or the `data` field of an envelope.
pub(crate) fn data_list(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(entries) => Some(entries),
        Value::Object(envelope) => envelope.get("data").and_then(Value::as_array),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::{collections::VecDeque, sync::Mutex, time::Instant};

    /// Plays back a fixed sequence of outcomes and records the requests it saw.
    pub(crate) struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
        pub(crate) seen: Mutex<Vec<(HttpMethod, String, Vec<(String, String)>, Option<RequestBody>)>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(outcomes: Vec<Result<RawResponse, TransportError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, request: &TransportRequest<'_>) -> Result<RawResponse, TransportError> {
            let params = request
                .params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.seen.lock().unwrap().push((
                request.method,
                request.url.to_string(),
                params,
                request.body.cloned(),
            ));
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(TransportError::Timeout))
        }
    }

    pub(crate) fn ok(body: &str) -> Result<RawResponse, TransportError> {
        Ok(RawResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    fn client(outcomes: Vec<Result<RawResponse, TransportError>>) -> ApiClient<ScriptedTransport> {
        ApiClient::with_transport(ScriptedTransport::new(outcomes)).with_retry_backoff(Duration::ZERO)
    }

    fn credentials() -> Credentials {
        Credentials::new("token", "6000")
    }

    #[test]
    fn succeeds_on_third_attempt_after_two_timeouts() {
        let client = client(vec![
            Err(TransportError::Timeout),
            Err(TransportError::Timeout),
            ok(r#"{"success": true}"#),
        ]);
        let result = client.get("http://api/getSources", &[], &credentials());
        assert_eq!(Ok(serde_json::json!({"success": true})), result);
        assert_eq!(3, client.transport().calls());
    }

    #[test]
    fn gives_up_after_max_retries_of_timeouts() {
        let client = client(vec![]);
        let error = client
            .call(HttpMethod::Get, "http://api", &[], &credentials(), None, 2)
            .unwrap_err();
        assert_eq!(ApiError::TimedOut { retries: 2 }, error);
        assert!(error.to_string().contains("timed out"));
        // the first attempt plus two retries
        assert_eq!(3, client.transport().calls());
    }

    #[test]
    fn waits_the_backoff_before_each_retry_only() {
        let backoff = Duration::from_millis(100);
        let client = ApiClient::with_transport(ScriptedTransport::new(vec![]))
            .with_retry_backoff(backoff);
        let started = Instant::now();
        let error = client.get("http://api", &[], &credentials()).unwrap_err();
        let elapsed = started.elapsed();
        assert_eq!(ApiError::TimedOut { retries: 2 }, error);
        // two retries, no pause after the final failure
        assert!(elapsed >= backoff * 2, "{:?}", elapsed);
        assert!(elapsed < backoff * 3, "{:?}", elapsed);
    }

    #[test]
    fn backoff_defaults_to_two_seconds() {
        let client = ApiClient::with_transport(ScriptedTransport::new(vec![]));
        assert_eq!(Duration::from_secs(2), client.retry_backoff);
    }

    #[test]
    fn connection_failures_are_retried_then_reported() {
        let client = client(vec![
            Err(TransportError::Connection("refused".to_string())),
            Err(TransportError::Connection("refused".to_string())),
            Err(TransportError::Connection("refused".to_string())),
        ]);
        let error = client.get("http://api", &[], &credentials()).unwrap_err();
        assert_eq!(
            "Connection error - check your internet connection",
            error.to_string()
        );
        assert_eq!(3, client.transport().calls());
    }

    #[test]
    fn error_statuses_are_never_retried() {
        let client = client(vec![Ok(RawResponse {
            status: 422,
            body: r#"{"success": false, "message": "Invalid dates"}"#.to_string(),
        })]);
        let error = client
            .post_form("http://api/postReservation", vec![], &credentials())
            .unwrap_err();
        assert_eq!(
            ApiError::Rejected {
                status: 422,
                message: "Invalid dates".to_string()
            },
            error
        );
        assert_eq!("Invalid dates", error.to_string());
        assert_eq!(1, client.transport().calls());
    }

    #[test]
    fn error_status_without_json_falls_back_to_status_code() {
        let client = client(vec![Ok(RawResponse {
            status: 503,
            body: "<html>unavailable</html>".to_string(),
        })]);
        let error = client.get("http://api", &[], &credentials()).unwrap_err();
        assert_eq!("HTTP 503", error.to_string());
    }

    #[test]
    fn created_status_counts_as_success() {
        let client = client(vec![Ok(RawResponse {
            status: 201,
            body: r#"{"reservationID": "R1"}"#.to_string(),
        })]);
        let data = client.get("http://api", &[], &credentials()).unwrap();
        assert_eq!("R1", data["reservationID"]);
    }

    #[test]
    fn undecodable_success_body_is_an_error_not_a_panic() {
        let client = client(vec![ok("not json")]);
        let error = client.get("http://api", &[], &credentials()).unwrap_err();
        assert!(matches!(error, ApiError::Unexpected(_)));
        assert!(error.to_string().starts_with("Connection error: "));
    }

    #[test]
    fn other_transport_errors_are_not_retried() {
        let client = client(vec![Err(TransportError::Other("bad url".to_string()))]);
        let error = client.get("http://api", &[], &credentials()).unwrap_err();
        assert_eq!("Connection error: bad url", error.to_string());
        assert_eq!(1, client.transport().calls());
    }

    #[test]
    fn post_form_sends_form_body_without_params() {
        let client = client(vec![ok("{}")]);
        client
            .post_form(
                "http://api/postReservation",
                vec![("propertyID".to_string(), "6000".to_string())],
                &credentials(),
            )
            .unwrap();
        let seen = client.transport().seen.lock().unwrap();
        let (method, url, params, body) = &seen[0];
        assert_eq!(HttpMethod::Post, *method);
        assert_eq!("http://api/postReservation", url);
        assert!(params.is_empty());
        assert_eq!(
            Some(RequestBody::Form(vec![(
                "propertyID".to_string(),
                "6000".to_string()
            )])),
            *body
        );
    }

    #[test]
    fn data_list_accepts_bare_arrays_and_envelopes() {
        let bare = serde_json::json!([1, 2]);
        let envelope = serde_json::json!({"success": true, "data": [1]});
        assert_eq!(2, data_list(&bare).unwrap().len());
        assert_eq!(1, data_list(&envelope).unwrap().len());
        assert!(data_list(&serde_json::json!({"success": true})).is_none());
    }
}
