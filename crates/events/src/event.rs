use chrono::{DateTime, Utc};

/// A domain-agnostic event.
///
/// Events are immutable facts; observers receive them by reference and clone
/// whatever they need to keep.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "jobs.posting.created").
    fn event_type(&self) -> &'static str;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
