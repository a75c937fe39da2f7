use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::request::{Request, RequestHandler};
use crate::{
    cancellation::ensure_active,
    error::{CatalogError, Result},
};

struct Registration {
    request: &'static str,
    handler: &'static str,
    // Always an `Arc<dyn RequestHandler<R>>` for the request type keying the entry.
    erased: Box<dyn Any + Send + Sync>,
}

/// Collects handler registrations and validates them before any request is
/// served.
#[derive(Default)]
pub struct DispatcherBuilder {
    registrations: HashMap<TypeId, Registration>,
    duplicates: Vec<String>,
    expected: Vec<(TypeId, &'static str)>,
}

impl fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("registered", &self.registrations.len())
            .field("duplicates", &self.duplicates)
            .field("expected", &self.expected.len())
            .finish()
    }
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to request type `R`.
    ///
    /// A second registration for the same request type is recorded and
    /// reported by [`build`](Self::build).
    pub fn register<R, H>(self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        self.insert::<R>(type_name::<H>(), Arc::new(handler))
    }

    fn insert<R: Request>(
        mut self,
        handler_name: &'static str,
        handler: Arc<dyn RequestHandler<R>>,
    ) -> Self {
        let key = TypeId::of::<R>();
        let request = type_name::<R>();

        if let Some(existing) = self.registrations.get(&key) {
            self.duplicates.push(format!(
                "{request} is handled by both {} and {handler_name}",
                existing.handler
            ));
            return self;
        }

        self.registrations.insert(
            key,
            Registration {
                request,
                handler: handler_name,
                erased: Box::new(handler),
            },
        );
        self
    }

    /// Declare that the finished dispatcher must be able to serve `R`.
    pub fn expect<R: Request>(mut self) -> Self {
        self.expected.push((TypeId::of::<R>(), type_name::<R>()));
        self
    }

    /// Validate the registry: every request type has exactly one handler and
    /// every expected request type is covered.
    pub fn build(self) -> Result<Dispatcher> {
        let mut problems = self.duplicates;

        for (key, request) in &self.expected {
            if !self.registrations.contains_key(key) {
                problems.push(format!("no handler registered for {request}"));
            }
        }

        if !problems.is_empty() {
            return Err(CatalogError::Configuration(problems.join("; ")));
        }

        debug!(
            handlers = self.registrations.len(),
            "dispatcher registry validated"
        );

        Ok(Dispatcher {
            handlers: self.registrations,
        })
    }
}

/// Routes a typed request to its single registered handler.
pub struct Dispatcher {
    handlers: HashMap<TypeId, Registration>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut routes: Vec<_> = self
            .handlers
            .values()
            .map(|registration| (registration.request, registration.handler))
            .collect();
        routes.sort_unstable();
        f.debug_struct("Dispatcher").field("routes", &routes).finish()
    }
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn handles<R: Request>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<R>())
    }

    pub async fn send<R: Request>(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<R::Response> {
        let request_name = type_name::<R>();
        ensure_active(cancel, request_name)?;

        let handler = self.handler_for::<R>()?;
        debug!(request = request_name, "dispatching request");
        handler.handle(request, cancel).await
    }

    fn handler_for<R: Request>(&self) -> Result<Arc<dyn RequestHandler<R>>> {
        self.handlers
            .get(&TypeId::of::<R>())
            .and_then(|registration| {
                registration
                    .erased
                    .downcast_ref::<Arc<dyn RequestHandler<R>>>()
            })
            .cloned()
            .ok_or_else(|| {
                CatalogError::Configuration(format!(
                    "no handler registered for {}",
                    type_name::<R>()
                ))
            })
    }
}
