//! tend: a rule engine for the "Getting Things Done" method.
//!
//! The core is four pure, timestamp-driven pieces that share one set of
//! state derivations:
//!
//! - [`state`]: lifecycle state of each record, derived from timestamps.
//! - [`engage`]: which next actions fit the current situation, ranked.
//! - [`integrity`]: methodology violations across the whole system.
//! - [`infer`]: clarification defaults guessed from captured text.
//!
//! Around it sit the collaborators: [`storage`] for persistence,
//! [`calendar`] for a read-only event feed, and [`config`].

pub mod calendar;
pub mod config;
pub mod engage;
pub mod infer;
pub mod integrity;
pub mod model;
pub mod state;
pub mod storage;
