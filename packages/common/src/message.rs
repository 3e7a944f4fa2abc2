use chrono::NaiveDateTime;

/// Read state of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadState {
    pub is_read: bool,
    pub read_at: Option<NaiveDateTime>,
}

impl ReadState {
    /// Marks the message read. Returns `false` when it already was, in
    /// which case the original `read_at` is kept.
    pub fn mark_read(&mut self, now: NaiveDateTime) -> bool {
        if self.is_read {
            return false;
        }
        self.is_read = true;
        self.read_at = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn first_read_sets_timestamp() {
        let mut state = ReadState {
            is_read: false,
            read_at: None,
        };
        assert!(state.mark_read(at(8)));
        assert_eq!(state.read_at, Some(at(8)));
    }

    #[test]
    fn second_read_keeps_first_timestamp() {
        let mut state = ReadState {
            is_read: false,
            read_at: None,
        };
        state.mark_read(at(8));
        assert!(!state.mark_read(at(17)));
        assert_eq!(state.read_at, Some(at(8)));
    }
}
