//! # flowsim — Deterministic Flow-Network Simulation Kernel
//!
//! A tick-driven kernel for simulating material or data flow through a
//! network of processing units. No async, no threads, no wall-clock
//! time — just pure state machines driven by an externally advanced
//! tick counter.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │         FlowNetwork           │ ← owns all units, routes bundles
//! │  ┌────────────────────────┐  │
//! │  │ Filter                  │  │ ← buffered, tick-driven node
//! │  │  ┌──────────────────┐  │  │
//! │  │  │ BundleQueue       │  │  │ ← FIFO input buffer
//! │  │  └──────────────────┘  │  │
//! │  │  ┌──────────────────┐  │  │
//! │  │  │ Workers           │  │  │ ← delay / transport machines
//! │  │  └──────────────────┘  │  │
//! │  └────────────────────────┘  │
//! │  ┌────────────────────────┐  │
//! │  │ Connectors              │  │ ← router / merger / splitter /
//! │  └────────────────────────┘  │   attribute setter (synchronous)
//! │  ┌────────────────────────┐  │
//! │  │ Repository              │  │ ← terminal storage
//! │  └────────────────────────┘  │
//! └──────────────────────────────┘
//! ```
//!
//! Entities travel in [`Bundle`]s. Connectors transform and forward a
//! bundle within the call that delivered it; filters park bundles
//! until a worker completes them during [`FlowNetwork::update`]. The
//! driver owns the clock: identical topology, injections and tick
//! sequence replay to identical state.

pub mod buffer;
pub mod bundle;
pub mod connector;
pub mod entity;
pub mod error;
pub mod filter;
pub mod network;
pub mod repository;
pub mod tick;
pub mod worker;

// Re-exports for convenience.
pub use buffer::BundleQueue;
pub use bundle::Bundle;
pub use connector::{AttributeSetter, Merger, Router, Splitter, StaticAttributeSetter};
pub use entity::Entity;
pub use error::{FlowError, FlowResult};
pub use filter::Filter;
pub use network::{FlowNetwork, UnitId, UnitNode};
pub use repository::Repository;
pub use tick::Tick;
pub use worker::{DelayWorker, DurationSource, TransportWorker, Worker, WorkerState};
