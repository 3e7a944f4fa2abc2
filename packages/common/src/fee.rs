use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::enums::PaymentStatus;

/// Payment status a fee takes on save.
///
/// Amount-based states win over the date-based one: a partially paid fee
/// past its due date stays `Partial`. When no rule applies the current
/// status is kept.
pub fn payment_status(
    amount: Decimal,
    paid_amount: Decimal,
    due_date: NaiveDate,
    current: PaymentStatus,
    today: NaiveDate,
) -> PaymentStatus {
    if paid_amount >= amount {
        PaymentStatus::Paid
    } else if paid_amount > Decimal::ZERO {
        PaymentStatus::Partial
    } else if paid_amount.is_zero() && due_date < today {
        PaymentStatus::Overdue
    } else {
        current
    }
}

/// Outstanding amount.
pub fn balance(amount: Decimal, paid_amount: Decimal) -> Decimal {
    amount - paid_amount
}

/// Whether the fee still counts towards a student's pending total.
pub fn is_outstanding(status: PaymentStatus) -> bool {
    !matches!(status, PaymentStatus::Paid)
}
