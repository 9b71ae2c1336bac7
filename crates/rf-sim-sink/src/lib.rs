//! Batched CSV result sink and post-run aggregation reports (§4.8).

mod error;
mod record;
mod report;
mod sink;

pub use error::*;
pub use record::*;
pub use report::*;
pub use sink::*;
