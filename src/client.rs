//! The contract between the dispatcher and the remote search service.
//!
//! The dispatcher never talks HTTP itself. It hands a [`Request`] to a client, which is any
//! [`tower::Service`] answering with a [`Response`], and interprets the decoded body.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::page::{FailedItem, Page};

/// Location of one remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub uri: String,
}

impl From<String> for Endpoint {
    fn from(uri: String) -> Self {
        Endpoint { uri }
    }
}

impl From<&str> for Endpoint {
    fn from(uri: &str) -> Self {
        Endpoint { uri: uri.to_owned() }
    }
}

/// Endpoint for each remote operation the dispatcher issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paths {
    pub post_batch: Endpoint,
    pub delete_batch: Endpoint,
    pub delete_pages: Endpoint,
}

impl Paths {
    pub fn new(
        post_batch: impl Into<Endpoint>,
        delete_batch: impl Into<Endpoint>,
        delete_pages: impl Into<Endpoint>,
    ) -> Self {
        Self {
            post_batch: post_batch.into(),
            delete_batch: delete_batch.into(),
            delete_pages: delete_pages.into(),
        }
    }
}

/// Predicate of a delete-by-query request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteQuery {
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
}

/// The verb a transport should use for a [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Delete,
}

/// One outbound call to the remote search service.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Index a batch of pages.
    PostBatch { uri: String, body: Arc<[Page]> },

    /// Remove a batch of pages by URL.
    DeleteBatch { uri: String, body: Arc<[String]> },

    /// Remove every page matching a type and date.
    DeletePages { uri: String, body: DeleteQuery },
}

impl Request {
    pub fn uri(&self) -> &str {
        match self {
            Request::PostBatch { uri, .. }
            | Request::DeleteBatch { uri, .. }
            | Request::DeletePages { uri, .. } => uri,
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Request::PostBatch { .. } => Method::Post,
            Request::DeleteBatch { .. } | Request::DeletePages { .. } => Method::Delete,
        }
    }

    /// The JSON body a transport should send.
    pub fn body(&self) -> serde_json::Result<Value> {
        match self {
            Request::PostBatch { body, .. } => serde_json::to_value(&body[..]),
            Request::DeleteBatch { body, .. } => serde_json::to_value(&body[..]),
            Request::DeletePages { body, .. } => serde_json::to_value(body),
        }
    }
}

/// The remote service's answer to a [`Request`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Option<Value>,
}

impl Response {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    /// Whether the service refused the request as a whole.
    pub fn is_rejected(&self) -> bool {
        self.status >= 400
    }
}

/// Body of an accepted push or delete batch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatchSummary {
    /// Items stored (push) or removed (delete).
    #[serde(alias = "stored", alias = "removed")]
    pub processed: u64,
    pub total: u64,
    /// Rejected items as the service listed them. `null` reads as an empty list.
    #[serde(deserialize_with = "null_as_empty")]
    pub failed: Vec<Value>,
}

impl BatchSummary {
    /// Reads every entry of `failed` on its own, so one malformed entry spoils only itself.
    pub fn failed_items(&self) -> impl Iterator<Item = serde_json::Result<FailedItem>> + '_ {
        self.failed.iter().map(FailedItem::deserialize)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of an accepted delete-by-query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeleteSummary {
    #[serde(alias = "count")]
    pub deleted: u64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}
