//! ReferenceTrade: a trade from the reference platform's trade log.
//!
//! The reference platform only publishes a short list of trades in its
//! comparison report. That list is transcribed once, here, and every stage
//! reads it through [`ReferenceTrade::canonical`]. A CSV can replace it via
//! configuration when a newer report is available.

use super::span::TradeSpan;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTrade {
    pub id: u32,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    /// Percent return; absent when the source report omits it.
    pub pnl_percent: Option<f64>,
}

/// (entry, exit, pnl %) with times as (year, month, day, hour, minute).
type Row = ((i32, u32, u32, u32, u32), (i32, u32, u32, u32, u32), f64);

const CANONICAL: [Row; 9] = [
    ((2023, 5, 6, 2, 44), (2023, 5, 6, 3, 29), 9.93),
    ((2023, 8, 18, 5, 30), (2023, 8, 18, 6, 0), 10.36),
    ((2023, 11, 10, 0, 0), (2023, 11, 11, 7, 59), 10.23),
    ((2024, 1, 3, 19, 59), (2024, 1, 4, 0, 15), 10.27),
    ((2024, 3, 6, 3, 45), (2024, 3, 6, 4, 59), 9.98),
    ((2024, 4, 13, 2, 30), (2024, 4, 13, 3, 29), 9.96),
    ((2024, 4, 14, 4, 0), (2024, 4, 14, 5, 44), 9.90),
    ((2025, 10, 11, 5, 15), (2025, 10, 11, 5, 30), 28.09),
    ((2025, 10, 11, 5, 44), (2025, 10, 13, 2, 15), 9.92),
];

fn at((y, m, d, h, mi): (i32, u32, u32, u32, u32)) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(h, mi, 0))
}

impl ReferenceTrade {
    /// The nine trades listed in the reference platform's comparison report.
    pub fn canonical() -> Vec<ReferenceTrade> {
        CANONICAL
            .iter()
            .enumerate()
            .filter_map(|(i, &(entry, exit, pnl))| {
                Some(ReferenceTrade {
                    id: i as u32 + 1,
                    entry_time: at(entry)?,
                    exit_time: at(exit)?,
                    pnl_percent: Some(pnl),
                })
            })
            .collect()
    }
}

impl TradeSpan for ReferenceTrade {
    fn id(&self) -> u32 {
        self.id
    }

    fn entry_time(&self) -> NaiveDateTime {
        self.entry_time
    }

    fn exit_time(&self) -> NaiveDateTime {
        self.exit_time
    }
}
