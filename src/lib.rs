//! Analytics engine over a table of channel metrics.
//!
//! The flow is strictly one way: [`ingest`] normalizes raw CSV rows,
//! [`filter`] narrows them, [`metrics`] and [`ranking`] derive scores and
//! aggregates, [`recommend`] turns peer comparisons into findings, and
//! [`views`] assembles one payload per audience. [`report`] renders those
//! payloads as markdown.

pub mod config;
pub mod countries;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod ranking;
pub mod recommend;
pub mod report;
pub mod views;

pub use error::{ConfigError, EngineError, IngestError, LoadError};
pub use models::{ChannelRecord, FilterCriteria, SubscriberTier};
