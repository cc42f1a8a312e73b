//! Search orchestrator: eligibility, tier planning, concurrent fan-out,
//! matching and decisions.
//!
//! [`dispatch`] runs the tier chains of many indexers concurrently;
//! [`search`] wires eligibility, adapters, dispatch, matching and the
//! decision pipeline into one invocation.

pub mod dispatch;
pub mod search;

pub use dispatch::ProviderPlan;
pub use search::ReleaseSearch;
