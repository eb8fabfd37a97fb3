//! Input loading: backtest trade table, signal log, reference trade list.

pub mod loader;
pub mod reference;
pub mod signals;
pub mod timestamp;

pub use loader::{load_trades, load_trades_from_reader, parse_pnl_percent, LoadError, PercentError, TradeTable};
pub use reference::{load_reference_trades, load_reference_trades_from_reader};
pub use signals::{load_signals, load_signals_from_reader};
pub use timestamp::parse_timestamp;
