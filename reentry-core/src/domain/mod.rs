//! Domain types for reentry analysis.

pub mod ids;
pub mod reference;
pub mod span;
pub mod trade;

pub use ids::DatasetHash;
pub use reference::ReferenceTrade;
pub use span::TradeSpan;
pub use trade::{ExitReason, TradeRecord};
