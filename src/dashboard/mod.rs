//! Dashboard state aggregation
//!
//! The [`Dispatcher`] decides when to run a cycle, the [`Collector`] fans out
//! across every configured instance, and the per-family [`extract`] modules
//! reduce each instance's records to one [`State`].

pub mod collector;
pub mod dispatcher;
pub mod extract;
pub mod ranked;
pub mod state;

pub use collector::{Collector, Instance, Sources};
pub use dispatcher::{DispatchError, Dispatcher, EventKind, Phase, Queued, Trigger};
pub use ranked::{LATEST_LIMIT, NEXT_LIMIT, Order, RankedList, Sortable};
pub use state::{Family, Snapshot, State};
