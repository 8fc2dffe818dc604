//! Libris library-state engine
//!
//! Owns the catalog, the readers and the circulation history, enforces the
//! borrowing protocol against a simulated clock, and persists everything to a
//! tagged-section text file.

pub mod clock;
pub mod observers;
pub mod persistence;
pub mod query;
pub mod state;

pub use clock::SimulatedClock;
pub use observers::{LibraryEvent, LibraryObserver, LoggingObserver, SubscriptionId};
pub use persistence::{
    decode, default_data_dir, default_data_path, encode, LibraryContents, DATA_FILE_NAME,
};
pub use query::BookQuery;
pub use state::LibraryState;
