//! TradeRecord: one closed trade from the backtest export.

use super::span::TradeSpan;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a position was closed.
///
/// The export uses short codes (`TP`, `SL`); anything else is kept verbatim
/// so that annotations such as `SL_first_in_both` survive into reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    Other(String),
}

/// Marker the alignment tooling puts on the first stop-loss trade shared by
/// both systems.
pub const FIRST_STOP_IN_BOTH: &str = "SL_first_in_both";

impl ExitReason {
    pub fn parse(code: &str) -> Self {
        let code = code.trim();
        if code.eq_ignore_ascii_case("TP") {
            ExitReason::TakeProfit
        } else if code.eq_ignore_ascii_case("SL") {
            ExitReason::StopLoss
        } else {
            ExitReason::Other(code.to_string())
        }
    }

    pub fn code(&self) -> &str {
        match self {
            ExitReason::TakeProfit => "TP",
            ExitReason::StopLoss => "SL",
            ExitReason::Other(code) => code,
        }
    }

    /// TP or SL: the exit was triggered by a price level, not by a signal.
    pub fn is_price_triggered(&self) -> bool {
        matches!(self, ExitReason::TakeProfit | ExitReason::StopLoss)
    }

    pub fn is_first_stop_in_both(&self) -> bool {
        matches!(self, ExitReason::Other(code) if code == FIRST_STOP_IN_BOTH)
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<String> for ExitReason {
    fn from(code: String) -> Self {
        ExitReason::parse(&code)
    }
}

impl From<ExitReason> for String {
    fn from(reason: ExitReason) -> Self {
        reason.code().to_string()
    }
}

/// A closed trade as exported by the backtest system.
///
/// Trades are kept in entry order; the position in the table is what
/// "previous" and "next" trade mean throughout the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_id: u32,

    // ── Entry ──
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    // ── Duration ──
    pub holding_bars: u32,

    // ── PnL ──
    /// Percent return, e.g. `9.93` for `"9.93%"` in the export.
    pub pnl_percent: f64,
    pub pnl_amount: f64,
    pub total_fee: f64,
}

impl TradeRecord {
    /// Entry and exit happened inside the same bar.
    pub fn is_zero_holding(&self) -> bool {
        self.holding_bars == 0
    }

    pub fn is_winner(&self) -> bool {
        self.pnl_percent > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.pnl_percent < 0.0
    }

    /// Exit price relative to entry price, in percent.
    pub fn price_change_pct(&self) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        (self.exit_price - self.entry_price) / self.entry_price * 100.0
    }

    pub fn holding_minutes(&self) -> f64 {
        (self.exit_time - self.entry_time).num_seconds() as f64 / 60.0
    }
}

impl TradeSpan for TradeRecord {
    fn id(&self) -> u32 {
        self.trade_id
    }

    fn entry_time(&self) -> NaiveDateTime {
        self.entry_time
    }

    fn exit_time(&self) -> NaiveDateTime {
        self.exit_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_trade() -> TradeRecord {
        let day = NaiveDate::from_ymd_opt(2024, 4, 13).unwrap();
        TradeRecord {
            trade_id: 7,
            entry_time: day.and_hms_opt(2, 30, 0).unwrap(),
            entry_price: 0.000_010,
            exit_time: day.and_hms_opt(3, 30, 0).unwrap(),
            exit_price: 0.000_011,
            exit_reason: ExitReason::TakeProfit,
            holding_bars: 4,
            pnl_percent: 9.96,
            pnl_amount: 99.6,
            total_fee: 1.2,
        }
    }

    #[test]
    fn exit_reason_codes() {
        assert_eq!(ExitReason::parse("TP"), ExitReason::TakeProfit);
        assert_eq!(ExitReason::parse(" sl "), ExitReason::StopLoss);
        assert_eq!(
            ExitReason::parse("Signal"),
            ExitReason::Other("Signal".into())
        );
        assert_eq!(ExitReason::StopLoss.to_string(), "SL");
    }

    #[test]
    fn first_stop_marker() {
        let reason = ExitReason::parse(FIRST_STOP_IN_BOTH);
        assert!(reason.is_first_stop_in_both());
        assert!(!reason.is_price_triggered());
        assert!(!ExitReason::StopLoss.is_first_stop_in_both());
    }

    #[test]
    fn price_change_and_holding() {
        let t = sample_trade();
        assert!((t.price_change_pct() - 10.0).abs() < 1e-9);
        assert!((t.holding_minutes() - 60.0).abs() < 1e-9);
        assert!(t.is_winner());
        assert!(!t.is_loser());
        assert!(!t.is_zero_holding());
    }

    #[test]
    fn zero_entry_price_has_no_price_change() {
        let mut t = sample_trade();
        t.entry_price = 0.0;
        assert_eq!(t.price_change_pct(), 0.0);
    }

    #[test]
    fn exit_reason_serializes_as_code() {
        let t = sample_trade();
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"exit_reason\":\"TP\""));
        let back: TradeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.exit_reason, ExitReason::TakeProfit);
    }
}
