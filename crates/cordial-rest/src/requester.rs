//! Transport abstraction for the REST surface.
//!
//! Implementations own retries and rate-limit bookkeeping. The core only
//! relies on each call completing with either a [`Response`] or a
//! [`RestError`].

use async_trait::async_trait;

use crate::error::Result;
use crate::request::{Method, Request, Response};

/// Verb-shaped REST transport.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Requester: Send + Sync {
    async fn get(&self, request: Request) -> Result<Response>;

    async fn post(&self, request: Request) -> Result<Response>;

    async fn patch(&self, request: Request) -> Result<Response>;

    async fn delete(&self, request: Request) -> Result<Response>;

    /// Issue `request` with the given verb.
    async fn send(&self, method: Method, request: Request) -> Result<Response> {
        match method {
            Method::Get => self.get(request).await,
            Method::Post => self.post(request).await,
            Method::Patch => self.patch(request).await,
            Method::Delete => self.delete(request).await,
        }
    }
}

/// A scripted in-memory transport for testing.
///
/// Responses are returned in the order they were queued, regardless of the
/// verb or endpoint; every request is recorded for later inspection.
pub mod memory {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Mutex, PoisonError};

    use bytes::Bytes;
    use http::StatusCode;
    use serde::Serialize;

    use crate::error::RestError;

    enum Scripted {
        Respond(StatusCode, Bytes),
        Fail(RestError),
    }

    /// In-memory requester.
    #[derive(Default)]
    pub struct MemoryRequester {
        script: Mutex<VecDeque<Scripted>>,
        log: Mutex<Vec<(Method, Request)>>,
    }

    impl MemoryRequester {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response with a raw body.
        pub fn respond(&self, status: StatusCode, body: impl Into<Bytes>) -> &Self {
            self.push(Scripted::Respond(status, body.into()));
            self
        }

        /// Queue a response with a JSON body.
        pub fn respond_json<T: Serialize>(&self, status: StatusCode, value: &T) -> &Self {
            let body = serde_json::to_vec(value).unwrap_or_default();
            self.respond(status, body)
        }

        /// Queue a transport failure.
        pub fn fail(&self, error: RestError) -> &Self {
            self.push(Scripted::Fail(error));
            self
        }

        /// Every request issued so far, oldest first.
        pub fn requests(&self) -> Vec<(Method, Request)> {
            self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        /// Number of scripted outcomes not yet consumed.
        pub fn pending(&self) -> usize {
            self.script.lock().unwrap_or_else(PoisonError::into_inner).len()
        }

        fn push(&self, item: Scripted) {
            self.script
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(item);
        }

        fn handle(&self, method: Method, request: Request) -> Result<Response> {
            tracing::debug!("{} {} (bucket {})", method, request.endpoint, request.bucket);
            let bucket = request.bucket.clone();
            self.log
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((method, request));

            let next = self
                .script
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();

            match next {
                Some(Scripted::Respond(status, body)) => Ok(Response::new(status, bucket, body)),
                Some(Scripted::Fail(error)) => Err(error),
                None => Err(RestError::Network("no scripted response".into())),
            }
        }
    }

    #[async_trait]
    impl Requester for MemoryRequester {
        async fn get(&self, request: Request) -> Result<Response> {
            self.handle(Method::Get, request)
        }

        async fn post(&self, request: Request) -> Result<Response> {
            self.handle(Method::Post, request)
        }

        async fn patch(&self, request: Request) -> Result<Response> {
            self.handle(Method::Patch, request)
        }

        async fn delete(&self, request: Request) -> Result<Response> {
            self.handle(Method::Delete, request)
        }
    }
}
