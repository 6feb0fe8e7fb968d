//! Request and response shapes exchanged with the transport.

use std::fmt;

use bytes::Bytes;
use cordial_core::Snowflake;
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Content type of JSON request bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP verbs the transport exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(verb)
    }
}

/// Rate-limit grouping key.
///
/// Requests with equal keys draw from the same quota. All role operations of
/// one guild share a bucket even though create, modify and delete use
/// different paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey(String);

impl BucketKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The shared bucket for every role operation in a guild.
    pub fn guild_roles(guild_id: Snowflake) -> Self {
        Self(format!("guilds/{guild_id}/roles"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A request addressed to one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub bucket: BucketKey,
    pub endpoint: String,
    pub body: Option<Bytes>,
    pub content_type: Option<&'static str>,
}

impl Request {
    /// A request without a body.
    pub fn new(bucket: BucketKey, endpoint: impl Into<String>) -> Self {
        Self {
            bucket,
            endpoint: endpoint.into(),
            body: None,
            content_type: None,
        }
    }

    /// Attach `value` as a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.body = Some(Bytes::from(serde_json::to_vec(value)?));
        self.content_type = Some(JSON_CONTENT_TYPE);
        Ok(self)
    }

    /// Decode the JSON body, if any.
    pub fn body_json<T: DeserializeOwned>(&self) -> Option<serde_json::Result<T>> {
        self.body.as_ref().map(|body| serde_json::from_slice(body))
    }
}

/// Metadata of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub bucket: BucketKey,
}

/// A completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct Response {
    pub meta: ResponseMeta,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, bucket: BucketKey, body: impl Into<Bytes>) -> Self {
        Self {
            meta: ResponseMeta { status, bucket },
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.meta.status
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        self.meta.status.is_success()
    }

    /// 204 status.
    pub fn is_no_content(&self) -> bool {
        self.meta.status == StatusCode::NO_CONTENT
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}
