use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grade bucket for an exam result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Lower bound (inclusive) of each bucket, best first.
    const THRESHOLDS: [(i64, Grade); 5] = [
        (90, Grade::APlus),
        (80, Grade::A),
        (70, Grade::B),
        (60, Grade::C),
        (50, Grade::D),
    ];

    pub fn from_percentage(percentage: Decimal) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(floor, _)| percentage >= Decimal::from(*floor))
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::F)
    }

    pub fn from_marks(marks: Decimal, total_marks: i32) -> Self {
        Self::from_percentage(percentage(marks, total_marks))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `marks / total_marks * 100`, or zero for a zero total.
pub fn percentage(marks: Decimal, total_marks: i32) -> Decimal {
    if total_marks <= 0 {
        return Decimal::ZERO;
    }
    marks * Decimal::ONE_HUNDRED / Decimal::from(total_marks)
}

/// Grade to store for a result.
///
/// An explicit, non-blank grade always wins. Otherwise the existing grade
/// is kept, and only when neither is present is one derived from marks.
pub fn resolve_grade(
    explicit: Option<&str>,
    existing: Option<&str>,
    marks: Decimal,
    total_marks: i32,
) -> String {
    let present = |g: Option<&str>| g.map(str::trim).filter(|g| !g.is_empty()).map(String::from);
    present(explicit)
        .or_else(|| present(existing))
        .unwrap_or_else(|| Grade::from_marks(marks, total_marks).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn buckets_follow_thresholds() {
        assert_eq!(Grade::from_marks(dec(95), 100), Grade::APlus);
        assert_eq!(Grade::from_marks(dec(90), 100), Grade::APlus);
        assert_eq!(Grade::from_marks(dec(85), 100), Grade::A);
        assert_eq!(Grade::from_marks(dec(70), 100), Grade::B);
        assert_eq!(Grade::from_marks(dec(65), 100), Grade::C);
        assert_eq!(Grade::from_marks(dec(50), 100), Grade::D);
        assert_eq!(Grade::from_marks(dec(45), 100), Grade::F);
    }

    #[test]
    fn boundary_just_below_a_plus_is_a() {
        let marks = Decimal::new(8999, 2);
        assert_eq!(Grade::from_marks(marks, 100), Grade::A);
    }

    #[test]
    fn percentage_scales_by_total() {
        assert_eq!(percentage(dec(40), 50), dec(80));
        assert_eq!(Grade::from_marks(dec(40), 50), Grade::A);
    }

    #[test]
    fn zero_total_counts_as_zero_percent() {
        assert_eq!(percentage(dec(10), 0), Decimal::ZERO);
        assert_eq!(Grade::from_marks(dec(10), 0), Grade::F);
    }

    #[test]
    fn explicit_grade_wins() {
        assert_eq!(resolve_grade(Some("B"), None, dec(99), 100), "B");
    }

    #[test]
    fn existing_grade_is_never_recomputed() {
        assert_eq!(resolve_grade(None, Some("C"), dec(99), 100), "C");
    }

    #[test]
    fn blank_grades_are_derived() {
        assert_eq!(resolve_grade(Some("  "), None, dec(85), 100), "A");
        assert_eq!(resolve_grade(None, Some(""), dec(45), 100), "F");
    }

    #[test]
    fn a_plus_serializes_with_symbol() {
        assert_eq!(serde_json::to_string(&Grade::APlus).unwrap(), "\"A+\"");
    }
}
