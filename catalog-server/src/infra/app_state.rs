use std::{fmt, sync::Arc};

use catalog_core::{
    CatalogError,
    application::{CatalogUnitOfWork, catalog_dispatcher},
    mediator::{Dispatcher, Request},
};
use tokio_util::sync::CancellationToken;

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>, config: Arc<Config>) -> Self {
        Self { dispatcher, config }
    }

    /// Wire the catalog handlers over `uow`.
    pub fn from_unit_of_work(
        uow: &CatalogUnitOfWork,
        config: Arc<Config>,
    ) -> Result<Self, CatalogError> {
        Ok(Self::new(Arc::new(catalog_dispatcher(uow)?), config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Dispatch `request` under a fresh per-request token.
    ///
    /// A client disconnect drops this future, which abandons the handler at
    /// its next await point. Nothing observes the token afterwards.
    pub async fn send<R: Request>(&self, request: R) -> Result<R::Response, CatalogError> {
        let cancel = CancellationToken::new();
        self.dispatcher.send(request, &cancel).await
    }
}
