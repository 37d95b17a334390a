//! CardioTrack - local-first blood pressure and pulse tracker.
//!
//! This library records blood-pressure/pulse readings, persists them locally,
//! and derives every downstream view (latest reading, averages, clinical
//! category, windowed chart series, CSV/JSON exports) from the stored list.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         CardioTrack                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │    Input    │──▶│   Record    │──▶│  Analytics  │       │
//! │  │ (validate)  │   │    Store    │   │ (windowing) │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │                           │                  │              │
//! │                           ▼                  ▼              │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │  Settings   │   │    Sync     │   │   Export    │       │
//! │  │    Store    │   │ (snapshot)  │   │ (CSV/JSON)  │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cardiotrack::{FileBlobStore, Observation, Tracker};
//!
//! let mut tracker = Tracker::open(FileBlobStore::new("/tmp/cardiotrack"));
//! tracker
//!     .add_reading(Observation::new(122, 78, 68, 1_700_000_000_000, None))
//!     .expect("Failed to save reading");
//!
//! let avg = cardiotrack::core::averages(tracker.records());
//! ```

pub mod app;
pub mod config;
pub mod core;
pub mod display;
pub mod export;
pub mod input;
pub mod insight;
pub mod store;
pub mod sync;

// Re-export key types at crate root for convenience
pub use app::{Dashboard, InsightState, Sequencer, SyncIndicator, SyncStart, Ticket, Tracker};
pub use config::{Config, ConfigError, InsightConfig};
pub use crate::core::{classify, Category, Observation, TimeRange};
pub use display::DisplayZone;
pub use export::ExportFormat;
pub use input::{InputError, ReadingForm};
pub use insight::InsightError;
pub use store::{
    BlobStore, FileBlobStore, MemoryBlobStore, RecordStore, Settings, SettingsStore, StoreError,
};
pub use sync::SyncOutcome;

#[cfg(feature = "sync")]
pub use sync::SyncDispatcher;

#[cfg(feature = "insight")]
pub use insight::InsightClient;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Data handling notice that can be displayed to users.
pub const DATA_NOTICE: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║               CARDIOTRACK - DATA HANDLING NOTICE                 ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  Your readings are stored only on this machine.                  ║
║                                                                  ║
║  ✓ STAYS LOCAL:                                                  ║
║    • Every reading, note and setting                             ║
║    • Averages, categories and charts (computed locally)          ║
║                                                                  ║
║  ✗ LEAVES THIS MACHINE ONLY WHEN YOU ASK:                        ║
║    • `sync` sends ALL readings to the URL you configured         ║
║    • `insight` sends your 20 most recent readings to a           ║
║      third-party text generation service                         ║
║                                                                  ║
║  Insights are advisory observations, not a medical diagnosis.    ║
║                                                                  ║
║  See where data is kept with:                                    ║
║    cardiotrack config                                            ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
