//! Period anchor resolution.
//!
//! Every (date, note type) pair maps to exactly one anchor: the first day of
//! the period containing the date. Weeks start on Monday.

use crate::model::{NoteType, PeriodAnchor};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum QuarterNameMode {
    /// `2024-Q4`
    #[default]
    Numeric,
    /// `2024 4th quarter`
    Ordinal,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodResolver {
    quarter_names: QuarterNameMode,
}

impl PeriodResolver {
    pub fn new(quarter_names: QuarterNameMode) -> Self {
        PeriodResolver { quarter_names }
    }

    pub fn set_quarter_name_mode(&mut self, mode: QuarterNameMode) {
        self.quarter_names = mode;
    }

    pub fn resolve_anchor(&self, date: NaiveDate, note_type: NoteType) -> PeriodAnchor {
        resolve_anchor(date, note_type)
    }

    /// Human readable title of the period starting at `anchor`.
    pub fn title(&self, anchor: PeriodAnchor, note_type: NoteType) -> String {
        let date = anchor.date();
        match note_type {
            NoteType::Daily => date.format("%Y-%m-%d").to_string(),
            NoteType::Weekly => date.format("%G-W%V").to_string(),
            NoteType::Monthly => date.format("%Y-%m").to_string(),
            NoteType::Quarterly => {
                let quarter = quarter_of(date);
                match self.quarter_names {
                    QuarterNameMode::Numeric => format!("{}-Q{}", date.year(), quarter),
                    QuarterNameMode::Ordinal => {
                        format!("{} {} quarter", date.year(), ordinal(quarter))
                    }
                }
            }
            NoteType::Yearly => date.year().to_string(),
        }
    }
}

pub fn resolve_anchor(date: NaiveDate, note_type: NoteType) -> PeriodAnchor {
    let anchor = match note_type {
        NoteType::Daily => date,
        NoteType::Weekly => {
            let since_monday = date.weekday().number_from_monday() - 1;
            // Only the first days of the representable range have no Monday before them.
            date.checked_sub_days(Days::new(u64::from(since_monday)))
                .unwrap_or(NaiveDate::MIN)
        }
        NoteType::Monthly => NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date),
        NoteType::Quarterly => {
            NaiveDate::from_ymd_opt(date.year(), quarter_of(date) * 3 - 2, 1).unwrap_or(date)
        }
        NoteType::Yearly => NaiveDate::from_yo_opt(date.year(), 1).unwrap_or(date),
    };
    PeriodAnchor::new(anchor)
}

/// Quarter of the year, 1 through 4.
pub fn quarter_of(date: NaiveDate) -> u32 {
    date.month0() / 3 + 1
}

/// Inclusive first and last day of the period starting at `anchor`.
pub fn period_bounds(anchor: PeriodAnchor, note_type: NoteType) -> (NaiveDate, NaiveDate) {
    let start = anchor.date();
    let end = match note_type {
        NoteType::Daily => start,
        NoteType::Weekly => start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX),
        NoteType::Monthly => last_day_of_month(start.year(), start.month()),
        NoteType::Quarterly => last_day_of_month(start.year(), start.month() + 2),
        NoteType::Yearly => NaiveDate::from_ymd_opt(start.year(), 12, 31).unwrap_or(start),
    };
    (start, end)
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).unwrap_or(first)
}

fn ordinal(n: u32) -> &'static str {
    match n {
        1 => "1st",
        2 => "2nd",
        3 => "3rd",
        _ => "4th",
    }
}
