#![allow(dead_code)]

use std::{
    fmt, future,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use serde_json::json;
use tower::Service;
use tracing::Level;

use search_push::{BoxError, Log, Paths, Request, Response};

pub fn trace_init() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .with_thread_names(true)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

pub fn paths() -> Paths {
    Paths::new("postBatch.uri", "deleteBatch.uri", "deletePages.uri")
}

#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub level: Level,
    pub message: String,
    pub detail: Option<String>,
    pub span: Option<&'static str>,
}

/// A log sink that keeps every event for later inspection.
#[derive(Clone, Debug, Default)]
pub struct RecordingLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self, level: Level) -> Vec<Event> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.level == level)
            .cloned()
            .collect()
    }

    pub fn count(&self, level: Level) -> usize {
        self.events(level).len()
    }

    pub fn total(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl Log for RecordingLog {
    fn log(&self, level: Level, message: &str, detail: Option<&str>) {
        let span = tracing::Span::current();
        self.events.lock().unwrap().push(Event {
            level,
            message: message.to_owned(),
            detail: detail.map(str::to_owned),
            span: span.metadata().map(|metadata| metadata.name()),
        });
    }
}

type Responder = Arc<dyn Fn(&Request) -> Result<Response, BoxError> + Send + Sync>;

/// A client that records every request and answers through `responder`.
#[derive(Clone)]
pub struct RecordingClient {
    requests: Arc<Mutex<Vec<Request>>>,
    responder: Responder,
}

impl RecordingClient {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&Request) -> Result<Response, BoxError> + Send + Sync + 'static,
    {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
        }
    }

    /// Accepts every item of every request.
    pub fn accepting() -> Self {
        Self::new(|request| {
            let body = match request {
                Request::PostBatch { body, .. } => json!({ "stored": body.len(), "total": body.len() }),
                Request::DeleteBatch { body, .. } => {
                    json!({ "removed": body.len(), "total": body.len() })
                }
                Request::DeletePages { body, .. } => json!({ "deleted": 3, "type": body.kind }),
            };
            Ok(Response::new(200, body))
        })
    }

    /// Answers every request with `response`.
    pub fn answering(response: Response) -> Self {
        Self::new(move |_| Ok(response.clone()))
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn post_batches(&self) -> Vec<Vec<Option<String>>> {
        self.requests()
            .into_iter()
            .filter_map(|request| match request {
                Request::PostBatch { body, .. } => {
                    Some(body.iter().map(|page| page.url.clone()).collect())
                }
                _ => None,
            })
            .collect()
    }

    pub fn delete_batches(&self) -> Vec<Vec<String>> {
        self.requests()
            .into_iter()
            .filter_map(|request| match request {
                Request::DeleteBatch { body, .. } => Some(body.to_vec()),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Debug for RecordingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingClient")
            .field("requests", &self.requests)
            .finish()
    }
}

impl Service<Request> for RecordingClient {
    type Response = Response;
    type Error = BoxError;
    type Future = future::Ready<Result<Response, BoxError>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let response = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        future::ready(response)
    }
}
