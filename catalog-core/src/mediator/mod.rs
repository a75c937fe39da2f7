//! In-process mediator: typed requests, their handlers, and the dispatch table.

pub mod dispatcher;
pub mod request;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use request::{Request, RequestHandler};
