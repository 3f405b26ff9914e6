//! # Till Engine
//!
//! The stateful shell around [`till_core`]:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            till-engine                                  │
//! │                                                                         │
//! │   engine.rs ──── SettlementEngine facade (config + store + registers)   │
//! │   manager.rs ─── RegisterManager, the one Mutex in the workspace        │
//! │   store.rs ───── RecordStore trait, the persistence seam                │
//! │   memory.rs ──── MemoryStore, in-process RecordStore for tests          │
//! │   error.rs ───── TillError = core errors ∪ store errors                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All money math lives in `till-core`; nothing in this crate rounds,
//! clamps, or multiplies an amount.

pub mod engine;
pub mod error;
pub mod manager;
pub mod memory;
pub mod store;

pub use engine::SettlementEngine;
pub use error::{EngineResult, StoreError, TillError};
pub use manager::RegisterManager;
pub use memory::MemoryStore;
pub use store::RecordStore;

// The core crate is the vocabulary of every engine API; re-export it
// so callers depend on one crate.
pub use till_core;
