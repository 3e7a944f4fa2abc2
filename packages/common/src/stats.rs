use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to two decimal places, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Share of `present` in `total`, as a percentage. Zero without records.
pub fn attendance_percentage(present: u64, total: u64) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    round2(Decimal::from(present) * Decimal::ONE_HUNDRED / Decimal::from(total))
}

/// Mean of `values`, or zero for an empty slice.
pub fn average(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = values.iter().copied().sum();
    round2(sum / Decimal::from(values.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_without_records_is_zero() {
        assert_eq!(attendance_percentage(0, 0), Decimal::ZERO);
    }

    #[test]
    fn attendance_rounds_to_two_places() {
        assert_eq!(attendance_percentage(2, 3), Decimal::new(6667, 2));
        assert_eq!(attendance_percentage(3, 4), Decimal::from(75));
    }

    #[test]
    fn average_of_marks() {
        let marks = [Decimal::from(80), Decimal::from(91), Decimal::from(70)];
        assert_eq!(average(&marks), Decimal::new(8033, 2));
        assert_eq!(average(&[]), Decimal::ZERO);
    }
}
