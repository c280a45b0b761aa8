//! Request middleware
//!
//! Every request built by [`ApiClient`](super::ApiClient) runs through a
//! [`MiddlewarePipeline`] after it is built and before it is sent. Stages run
//! in the order they were added and may mutate the request in place. The
//! first stage that fails stops the pipeline; its error is then handed to the
//! `on_error` hook of each remaining stage and returned to the caller, so the
//! request is never transmitted.

use super::ClientError;
use reqwest::Request;
use std::fmt;
use std::sync::Arc;

/// A single request-preparation stage
pub trait RequestMiddleware: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Inspect or mutate an outgoing request
    fn on_request(&self, request: &mut Request) -> Result<(), ClientError>;

    /// Observe a failure raised by an earlier stage
    fn on_error(&self, error: ClientError) -> ClientError {
        error
    }
}

impl<F> RequestMiddleware for F
where
    F: Fn(&mut Request) -> Result<(), ClientError> + Send + Sync,
{
    fn on_request(&self, request: &mut Request) -> Result<(), ClientError> {
        self(request)
    }
}

/// Ordered list of [`RequestMiddleware`] stages
#[derive(Clone, Default)]
pub struct MiddlewarePipeline {
    stages: Vec<Arc<dyn RequestMiddleware>>,
}

impl MiddlewarePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage
    pub fn push(&mut self, stage: impl RequestMiddleware + 'static) {
        self.stages.push(Arc::new(stage));
    }

    /// Append a shared stage
    pub fn push_arc(&mut self, stage: Arc<dyn RequestMiddleware>) {
        self.stages.push(stage);
    }

    /// Append a stage, builder style
    #[must_use]
    pub fn with(mut self, stage: impl RequestMiddleware + 'static) -> Self {
        self.push(stage);
        self
    }

    pub(crate) fn into_stages(self) -> Vec<Arc<dyn RequestMiddleware>> {
        self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage over `request`
    pub fn run(&self, mut request: Request) -> Result<Request, ClientError> {
        let mut stages = self.stages.iter();

        while let Some(stage) = stages.next() {
            if let Err(error) = stage.on_request(&mut request) {
                tracing::debug!(stage = stage.name(), error = %error, "Request preparation failed");
                return Err(stages.fold(error, |error, stage| stage.on_error(error)));
            }
        }

        Ok(request)
    }
}

impl fmt::Debug for MiddlewarePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|stage| stage.name()))
            .finish()
    }
}
