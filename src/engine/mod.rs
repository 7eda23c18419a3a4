//! Polling engine: change detection, fan-out, cycle orchestration.

pub mod agent;
pub mod dispatch;
pub mod filter;
pub mod poller;

pub use agent::{Agent, AgentConfig, CycleSummary};
pub use dispatch::dispatch;
pub use filter::filter_changed;
pub use poller::Poller;
