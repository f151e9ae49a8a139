//! # Dashboard Sync
//!
//! The administrative dashboard's data layer, built on `sync_framework`.
//!
//! - **[model]**: Records ([`NewsItem`](model::NewsItem), [`Sector`](model::Sector),
//!   [`LookupItem`](model::LookupItem)) and the resources they sync through.
//! - **[clients]**: Typed view clients that turn UI gestures into controller commands.
//! - **[lookups]**: Reference collections behind a TTL cache.
//! - **[lifecycle]**: [`DashboardSystem`](lifecycle::DashboardSystem), which starts and
//!   stops everything.

pub mod clients;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod lookups;
pub mod model;
