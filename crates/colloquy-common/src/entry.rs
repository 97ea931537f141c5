//! Entries of a conversation log.

use serde::{Deserialize, Serialize};

use crate::request::ResponsesRequest;
use crate::response::Response;

/// One element of a conversation's append-only log: what was sent, or what
/// the model produced in reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    /// A request that was sent.
    Request(ResponsesRequest),
    /// A snapshot of a response, live while it is being streamed.
    Response(Response),
}

impl Entry {
    /// The response, if this entry is one.
    #[must_use]
    pub const fn as_response(&self) -> Option<&Response> {
        match self {
            Self::Response(response) => Some(response),
            Self::Request(_) => None,
        }
    }

    /// The request, if this entry is one.
    #[must_use]
    pub const fn as_request(&self) -> Option<&ResponsesRequest> {
        match self {
            Self::Request(request) => Some(request),
            Self::Response(_) => None,
        }
    }
}

impl From<ResponsesRequest> for Entry {
    fn from(request: ResponsesRequest) -> Self {
        Self::Request(request)
    }
}

impl From<Response> for Entry {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}
