//! The seam between [`ApiClient`](crate::ApiClient) and the network.
//!
//! The client only needs a status code and a body back, so a transport is anything that can turn a
//! [`TransportRequest`] into a [`RawResponse`] or classify why it could not.

use std::{error::Error as StdError, io, time::Duration};

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;

use crate::configuration::REQUEST_TIMEOUT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A request body together with its encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

impl RequestBody {
    pub fn content_type(&self) -> &'static str {
        match self {
            RequestBody::Json(_) => JSON_CONTENT_TYPE,
            RequestBody::Form(_) => FORM_CONTENT_TYPE,
        }
    }
}

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Copy)]
pub struct TransportRequest<'a> {
    pub method: HttpMethod,
    pub url: &'a str,
    pub params: &'a [(&'a str, &'a str)],
    pub bearer_token: &'a str,
    pub body: Option<&'a RequestBody>,
}

impl TransportRequest<'_> {
    /// Requests without a body are still announced as JSON.
    pub fn content_type(&self) -> &'static str {
        self.body.map_or(JSON_CONTENT_TYPE, RequestBody::content_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Why a request never produced a response. Only the first two are worth retrying.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("the request timed out")]
    Timeout,
    #[error("could not connect: {0}")]
    Connection(String),
    #[error("{0}")]
    Other(String),
}

pub trait Transport: Send + Sync {
    fn send(&self, request: &TransportRequest<'_>) -> Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &TransportRequest<'_>) -> Result<RawResponse, TransportError> {
        (**self).send(request)
    }
}

/// The production transport, a blocking `reqwest` client with a fixed per call timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new() -> reqwest::Result<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout
        } else if error.is_connect() || error.is_request() || was_disconnected(&error) {
            TransportError::Connection(error.to_string())
        } else {
            TransportError::Other(error.to_string())
        }
    }
}

// A connection that was reset or closed underneath the request, anywhere in the source chain.
fn was_disconnected(error: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(error);
    while let Some(current) = source {
        if let Some(io_error) = current.downcast_ref::<io::Error>() {
            if matches!(
                io_error.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::NotConnected
            ) {
                return true;
            }
        }
        source = current.source();
    }
    false
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &TransportRequest<'_>) -> Result<RawResponse, TransportError> {
        let builder = match request.method {
            HttpMethod::Get => self.client.get(request.url),
            HttpMethod::Post => self.client.post(request.url),
        };
        let mut builder = builder
            .bearer_auth(request.bearer_token)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .query(request.params);
        builder = match request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            None => builder.header(CONTENT_TYPE, request.content_type()),
        };
        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(RawResponse { status, body })
    }
}
