use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;

/// A failed request, with enough context to tell the client which
/// operation failed on what.
#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Context {
    Search { resource: &'static str },
    Create { resource: &'static str },
    Read { resource: &'static str, id: String },
    Update { resource: &'static str, id: String },
    Delete { resource: &'static str, id: String },
}

impl Context {
    pub fn search(resource: &'static str) -> Context {
        Context::Search { resource }
    }

    pub fn create(resource: &'static str) -> Context {
        Context::Create { resource }
    }

    pub fn read(resource: &'static str, id: String) -> Context {
        Context::Read { resource, id }
    }

    pub fn update(resource: &'static str, id: String) -> Context {
        Context::Update { resource, id }
    }

    pub fn delete(resource: &'static str, id: String) -> Context {
        Context::Delete { resource, id }
    }
}
