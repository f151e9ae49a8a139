//! Typed wrappers around [`SyncHandle`](sync_framework::SyncHandle), one per view.

pub mod news_client;
pub mod sector_client;
pub mod view_client;

pub use news_client::*;
pub use sector_client::*;
pub use view_client::*;
