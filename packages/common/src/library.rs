use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Fine charged per day a book is kept past its due date.
pub const FINE_PER_DAY: i64 = 5;

/// Days a book is (or was) overdue.
///
/// Returned books count up to the return date; books still out count up
/// to `today`.
pub fn days_late(due_date: NaiveDate, return_date: Option<NaiveDate>, today: NaiveDate) -> i64 {
    let until = return_date.unwrap_or(today);
    (until - due_date).num_days().max(0)
}

pub fn fine_for(days_late: i64) -> Decimal {
    Decimal::from(days_late * FINE_PER_DAY)
}

/// What a book issue currently owes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fine {
    /// Settled on return; store it on the issue record.
    Recorded(Decimal),
    /// Still accruing on an unreturned book; report it, do not store it.
    Accruing(Decimal),
    None,
}

impl Fine {
    pub fn amount(&self) -> Decimal {
        match self {
            Fine::Recorded(a) | Fine::Accruing(a) => *a,
            Fine::None => Decimal::ZERO,
        }
    }
}

pub fn assess_fine(
    due_date: NaiveDate,
    return_date: Option<NaiveDate>,
    is_returned: bool,
    today: NaiveDate,
) -> Fine {
    match return_date {
        Some(returned) if returned > due_date => {
            Fine::Recorded(fine_for(days_late(due_date, Some(returned), today)))
        }
        None if !is_returned && today > due_date => {
            Fine::Accruing(fine_for(days_late(due_date, None, today)))
        }
        _ => Fine::None,
    }
}
