//! `tn-store` — the planner's view of the graph and traffic data store.
//!
//! The planner never writes to the store.  It reads a full node/edge snapshot
//! once per request and looks up historical flow samples when the live
//! predictor is unavailable.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                    |
//! |------------|-------------------------------------------------------------|
//! | [`model`]  | `Node`, `Edge`, `FlowSample`                                |
//! | [`store`]  | `GraphStore`, `FlowStore` read traits                       |
//! | [`memory`] | `MemoryStore` (R-tree bounds queries), `MemoryStoreBuilder` |
//! | [`loader`] | CSV loaders for nodes, edges and flow samples               |
//! | [`error`]  | `StoreError`, `StoreResult<T>`                              |

pub mod error;
pub mod loader;
pub mod memory;
pub mod model;
pub mod store;


pub use error::{StoreError, StoreResult};
pub use loader::{load_edges_reader, load_flows_reader, load_nodes_reader, load_store_dir};
pub use memory::{MemoryStore, MemoryStoreBuilder};
pub use model::{Edge, FlowSample, Node};
pub use store::{FlowStore, GraphStore};
