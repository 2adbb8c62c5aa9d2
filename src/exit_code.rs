use crate::state::State;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PENDING: i32 = 2;
pub const UNRECOGNIZED: i32 = 3;

/// Process exit code for an overall state.
///
/// No checks at all, or an explicitly empty state literal, signals nothing
/// and exits 0.
pub fn exit_code(overall: Option<&State>) -> i32 {
    let Some(state) = overall else {
        return SUCCESS;
    };
    match state {
        State::Success | State::Neutral => SUCCESS,
        State::Failure
        | State::Error
        | State::ActionRequired
        | State::Cancelled
        | State::TimedOut => FAILURE,
        State::Pending => PENDING,
        State::Unrecognized(raw) if raw.is_empty() => SUCCESS,
        State::Unrecognized(_) => UNRECOGNIZED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table() {
        let cases = [
            ("success", 0),
            ("neutral", 0),
            ("failure", 1),
            ("error", 1),
            ("action_required", 1),
            ("cancelled", 1),
            ("timed_out", 1),
            ("pending", 2),
            ("unknown_state", 3),
            ("", 0),
        ];
        for (literal, expected) in cases {
            let state = State::parse(literal);
            assert_eq!(exit_code(Some(&state)), expected, "state {literal:?}");
        }
    }

    #[test]
    fn test_no_checks_exits_zero() {
        assert_eq!(exit_code(None), SUCCESS);
    }
}
