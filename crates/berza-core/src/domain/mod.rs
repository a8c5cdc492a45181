//! Domain models for the harvest pipeline.

mod range;
mod record;
mod symbol;

pub use range::DateRange;
pub use record::{FetchTask, TradeRecord};
pub use symbol::Symbol;
