use std::sync::Arc;

use log::Logger;

use crate::service::ResourceService;

/// What every handler of one resource needs.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub service: Arc<ResourceService>,
}

impl Environment {
    pub fn new(logger: Arc<Logger>, service: Arc<ResourceService>) -> Self {
        Self { logger, service }
    }

    /// The path segment the resource is served under.
    pub fn resource(&self) -> &'static str {
        self.service.schema().resource
    }
}
