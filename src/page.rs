use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A page to be indexed by the remote search service.
///
/// Only `url` and `title` are read by this crate; everything else travels untouched in `fields`.
/// A page without a `url` is still accepted and left for the remote service to reject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Page {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// An item of a batch the remote service did not accept.
///
/// Decoded from the `failed` list of an accepted response, where each entry is either an object
/// carrying `title`, `url` and `error`, or a bare URL string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawFailedItem")]
pub struct FailedItem {
    pub title: Option<String>,
    pub url: Option<String>,
    pub error: Option<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFailedItem {
    Url(String),
    Item {
        title: Option<String>,
        url: Option<String>,
        error: Option<Value>,
    },
}

impl From<RawFailedItem> for FailedItem {
    fn from(raw: RawFailedItem) -> Self {
        match raw {
            RawFailedItem::Url(url) => FailedItem {
                url: Some(url),
                ..FailedItem::default()
            },
            RawFailedItem::Item { title, url, error } => FailedItem { title, url, error },
        }
    }
}

/// What the outcome reporter needs to know about an item of a batch.
pub(crate) trait BatchItem {
    fn title(&self) -> Option<&str>;

    fn url(&self) -> Option<&str>;

    fn error(&self) -> Option<String> {
        None
    }
}

impl BatchItem for Page {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl BatchItem for String {
    fn title(&self) -> Option<&str> {
        None
    }

    fn url(&self) -> Option<&str> {
        Some(self)
    }
}

impl BatchItem for FailedItem {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn error(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(error) => Some(error.clone()),
            error => Some(error.to_string()),
        }
    }
}
