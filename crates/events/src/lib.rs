//! Domain events and in-process observer registration.
//!
//! Events raised by the job board (e.g. "job posted") are delivered
//! synchronously to every registered observer. Observers that need to do slow
//! work (matching, sending email) must hand it off to their own workers.

pub mod event;
pub mod observer;

pub use event::Event;
pub use observer::{Observer, ObserverId, ObserverRegistry};
