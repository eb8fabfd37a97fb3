//! Case studies of rule violations: zero-holding trades and quick reentries.
//!
//! Each case carries the surrounding trades and a list of [`CaseNote`]s
//! that explain what probably happened. Notes are derived from exit reason,
//! PnL and price movement only; the bar data itself is not available here.

use serde::{Deserialize, Serialize};

use super::intervals::{minutes_between, ReentryInterval, BAR_MINUTES};
use crate::domain::{ExitReason, TradeRecord};

/// |PnL| at or above this means the bar moved enough to hit TP/SL alone.
pub const VIOLENT_BAR_PNL_PCT: f64 = 10.0;

/// How many of the fastest reentries the console walks through.
pub const TOP_CASES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseNote {
    /// TP or SL fired inside the entry bar.
    TriggeredWithinBar(String),
    ViolentBar,
    FirstStopInBoth,
    SameBarReentry,
    AdjacentBarReentry,
    /// Stopped out, then bought back lower.
    BottomFishing,
    /// Took profit, then bought back lower.
    ChasingDown,
}

impl CaseNote {
    pub fn describe(&self) -> String {
        match self {
            CaseNote::TriggeredWithinBar(code) => {
                format!("{code} condition triggered within the entry bar")
            }
            CaseNote::ViolentBar => {
                "violent bar: a single candle moved far enough to reach the stop/target".into()
            }
            CaseNote::FirstStopInBoth => {
                "special marker: first stop-loss trade in both systems".into()
            }
            CaseNote::SameBarReentry => {
                "re-entered in the same bar; price likely swung hard within the candle".into()
            }
            CaseNote::AdjacentBarReentry => {
                "re-entered on the next bar; the strategy has no cooldown".into()
            }
            CaseNote::BottomFishing => {
                "price kept falling after the stop; re-entry looks like bottom fishing".into()
            }
            CaseNote::ChasingDown => {
                "price pulled back after the target; re-entry looks like chasing down".into()
            }
        }
    }
}

/// A neighbouring trade and the gap to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub trade_id: u32,
    pub exit_reason: ExitReason,
    /// Previous trade's exit, or next trade's entry.
    pub time: chrono::NaiveDateTime,
    pub interval_minutes: f64,
}

/// A trade that entered and exited inside one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroHoldingCase {
    pub index: usize,
    pub trade: TradeRecord,
    pub price_change_pct: f64,
    pub previous: Option<Neighbor>,
    pub next: Option<Neighbor>,
    pub notes: Vec<CaseNote>,
}

fn zero_holding_notes(trade: &TradeRecord) -> Vec<CaseNote> {
    let mut notes = Vec::new();
    if trade.exit_reason.is_price_triggered() {
        notes.push(CaseNote::TriggeredWithinBar(trade.exit_reason.code().to_string()));
        if trade.pnl_percent.abs() >= VIOLENT_BAR_PNL_PCT {
            notes.push(CaseNote::ViolentBar);
        }
    }
    if trade.exit_reason.is_first_stop_in_both() {
        notes.push(CaseNote::FirstStopInBoth);
    }
    notes
}

/// Every zero-holding trade, in table order, with its neighbours.
pub fn zero_holding_cases(trades: &[TradeRecord]) -> Vec<ZeroHoldingCase> {
    trades
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_zero_holding())
        .map(|(i, t)| {
            let previous = i.checked_sub(1).map(|p| {
                let prev = &trades[p];
                Neighbor {
                    trade_id: prev.trade_id,
                    exit_reason: prev.exit_reason.clone(),
                    time: prev.exit_time,
                    interval_minutes: minutes_between(prev.exit_time, t.entry_time),
                }
            });
            let next = trades.get(i + 1).map(|next| Neighbor {
                trade_id: next.trade_id,
                exit_reason: next.exit_reason.clone(),
                time: next.entry_time,
                interval_minutes: minutes_between(t.exit_time, next.entry_time),
            });
            ZeroHoldingCase {
                index: i,
                trade: t.clone(),
                price_change_pct: t.price_change_pct(),
                previous,
                next,
                notes: zero_holding_notes(t),
            }
        })
        .collect()
}

/// An exit followed by a reentry within one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReentryCase {
    pub exit_trade: TradeRecord,
    pub reentry_trade: TradeRecord,
    pub interval_minutes: f64,
    /// Reentry price relative to the previous exit price, in percent.
    pub price_change_pct: f64,
    pub notes: Vec<CaseNote>,
}

impl ReentryCase {
    fn new(exit_trade: &TradeRecord, reentry_trade: &TradeRecord, interval_minutes: f64) -> Self {
        let price_change_pct = if exit_trade.exit_price == 0.0 {
            0.0
        } else {
            (reentry_trade.entry_price - exit_trade.exit_price) / exit_trade.exit_price * 100.0
        };

        let mut notes = Vec::new();
        if interval_minutes == 0.0 {
            notes.push(CaseNote::SameBarReentry);
        } else if interval_minutes > 0.0 {
            notes.push(CaseNote::AdjacentBarReentry);
        }
        let lower = reentry_trade.entry_price < exit_trade.exit_price;
        match exit_trade.exit_reason {
            ExitReason::StopLoss if lower => notes.push(CaseNote::BottomFishing),
            ExitReason::TakeProfit if lower => notes.push(CaseNote::ChasingDown),
            _ => {}
        }

        Self {
            exit_trade: exit_trade.clone(),
            reentry_trade: reentry_trade.clone(),
            interval_minutes,
            price_change_pct,
            notes,
        }
    }
}

/// Reentries within one bar, in table order.
pub fn quick_reentry_cases(
    trades: &[TradeRecord],
    intervals: &[ReentryInterval],
) -> Vec<ReentryCase> {
    intervals
        .iter()
        .filter(|iv| iv.minutes <= BAR_MINUTES)
        .filter_map(|iv| {
            let exit = trades.get(iv.trade_index)?;
            let reentry = trades.get(iv.trade_index + 1)?;
            Some(ReentryCase::new(exit, reentry, iv.minutes))
        })
        .collect()
}

/// Stable sort, shortest interval first.
pub fn fastest_first(cases: &mut [ReentryCase]) {
    cases.sort_by(|a, b| {
        a.interval_minutes
            .partial_cmp(&b.interval_minutes)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
