//! Dashboard records and the resources they are synchronized through.

pub mod lookup;
pub mod news;
pub mod sector;

pub use lookup::*;
pub use news::*;
pub use sector::*;
