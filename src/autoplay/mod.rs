//! Continuation engine: queue-end handling, source selection, fallback
//! search

pub mod controller;
pub mod fallback;
pub mod selector;

pub use controller::{AutoplayController, AutoplaySessionState};
pub use fallback::{is_youtube_uri, FallbackSearch};
pub use selector::ContinuationSelector;
