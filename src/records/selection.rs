use serde::Serialize;

/// The record currently open in the detail view, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "record", rename_all = "lowercase")]
pub enum Selection<R> {
    Closed,
    Open(R),
}

impl<R> Default for Selection<R> {
    fn default() -> Self {
        Self::Closed
    }
}

impl<R> Selection<R> {
    pub fn select(&mut self, record: R) {
        *self = Self::Open(record);
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    pub fn current(&self) -> Option<&R> {
        match self {
            Self::Open(record) => Some(record),
            Self::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> Selection<T> {
        match self {
            Self::Open(record) => Selection::Open(f(record)),
            Self::Closed => Selection::Closed,
        }
    }
}
