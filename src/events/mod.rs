//! Domain events for the access layer.
//!
//! Actions fire events unconditionally; with no listeners registered the
//! dispatch is a no-op.
//!
//! ```rust,ignore
//! use portico::register_event_listeners;
//! use portico::events::listeners::LoggingListener;
//!
//! register_event_listeners(|registry| {
//!     registry.listen(LoggingListener::new());
//! });
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::PorticoEvent;
pub use listener::Listener;
pub use registry::{dispatch, register_event_listeners, EventRegistry};
