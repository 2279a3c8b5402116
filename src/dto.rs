use rocket::{http::Status, serde::json::Json, Responder};
use serde::Serialize;
use std::borrow::Cow;

/// The body of every failed response.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Responder, Debug, Clone)]
pub struct Error((Status, Json<ErrorBody>));

impl Error {
    pub fn new_static(status: Status, message: &'static str) -> Self {
        Error((
            status,
            Json(ErrorBody {
                success: false,
                message,
                error: None,
            }),
        ))
    }

    /// Attaches a human readable detail to the `error` field.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.0 .1 .0.error = Some(error.into());
        self
    }

    pub fn status(&self) -> Status {
        self.0 .0
    }

    pub fn body(&self) -> &ErrorBody {
        &self.0 .1 .0
    }
}

impl From<Status> for Error {
    fn from(value: Status) -> Self {
        Self::new_static(value, value.reason_lossy())
    }
}

/// The body of every successful JSON response.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn new(message: impl Into<Cow<'static, str>>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            count: None,
            data: Some(data),
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl Envelope<()> {
    /// An envelope that carries only a message.
    pub fn message(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            success: true,
            message: message.into(),
            count: None,
            data: None,
        }
    }
}

pub type JsonRes<T> = Result<(Status, Json<Envelope<T>>), Error>;
