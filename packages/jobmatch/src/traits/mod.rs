//! Core trait abstractions.
//!
//! Collaborators (scrape platform, inference service, record store, clock)
//! are injected through these seams rather than reached through global
//! client singletons, so every component can be exercised against mocks.

pub mod clock;
pub mod inference;
pub mod scraper;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use inference::BatchInference;
pub use scraper::ScrapeRunner;
pub use store::RecordStore;
