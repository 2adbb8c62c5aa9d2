use std::fmt;

use serde::Deserialize;

/// Recognized check states, lowest aggregation severity first.
pub const SEVERITY_ORDER: [&str; 8] = [
    "neutral",
    "success",
    "pending",
    "cancelled",
    "timed_out",
    "action_required",
    "failure",
    "error",
];

/// Display rank per state. Failing checks are listed first; anything not in
/// this table ranks alongside `pending`.
const DISPLAY_RANK: &[(&str, u32)] = &[
    ("failure", 1),
    ("error", 1),
    ("action_required", 1),
    ("cancelled", 1),
    ("timed_out", 1),
    ("pending", 2),
    ("success", 3),
    ("neutral", 3),
];

const DEFAULT_DISPLAY_RANK: u32 = 2;

/// Glyph and ANSI SGR color code shown next to a check in verbose output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub glyph: &'static str,
    pub color: u8,
}

const CHECK: Marker = Marker {
    glyph: "\u{2714}\u{fe0e}",
    color: 32,
};
const CROSS: Marker = Marker {
    glyph: "\u{2716}\u{fe0e}",
    color: 31,
};
const CIRCLE: Marker = Marker {
    glyph: "\u{25e6}",
    color: 30,
};
const DOT: Marker = Marker {
    glyph: "\u{25cf}",
    color: 33,
};

const MARKERS: &[(&str, Marker)] = &[
    ("success", CHECK),
    ("failure", CROSS),
    ("error", CROSS),
    ("action_required", CROSS),
    ("cancelled", CROSS),
    ("timed_out", CROSS),
    ("neutral", CIRCLE),
    ("pending", DOT),
];

/// Whether `state` is one of the recognized literals.
pub fn is_recognized(state: &str) -> bool {
    SEVERITY_ORDER.iter().any(|s| *s == state)
}

/// State reported for a single check.
///
/// Parsing never fails: literals outside the vocabulary are kept verbatim in
/// [`State::Unrecognized`], which ranks below every recognized state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum State {
    Neutral,
    Success,
    Pending,
    Cancelled,
    TimedOut,
    ActionRequired,
    Failure,
    Error,
    Unrecognized(String),
}

impl State {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "neutral" => State::Neutral,
            "success" => State::Success,
            "pending" => State::Pending,
            "cancelled" => State::Cancelled,
            "timed_out" => State::TimedOut,
            "action_required" => State::ActionRequired,
            "failure" => State::Failure,
            "error" => State::Error,
            other => State::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            State::Neutral => "neutral",
            State::Success => "success",
            State::Pending => "pending",
            State::Cancelled => "cancelled",
            State::TimedOut => "timed_out",
            State::ActionRequired => "action_required",
            State::Failure => "failure",
            State::Error => "error",
            State::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, State::Unrecognized(_))
    }

    /// Position in [`SEVERITY_ORDER`], or -1 for unrecognized states.
    pub fn severity(&self) -> i32 {
        if !self.is_recognized() {
            return -1;
        }
        SEVERITY_ORDER
            .iter()
            .position(|s| *s == self.as_str())
            .map_or(-1, |i| i as i32)
    }

    /// Ordering bucket for verbose output (1 is shown first).
    pub fn display_rank(&self) -> u32 {
        if !self.is_recognized() {
            return DEFAULT_DISPLAY_RANK;
        }
        DISPLAY_RANK
            .iter()
            .find(|(s, _)| *s == self.as_str())
            .map_or(DEFAULT_DISPLAY_RANK, |(_, rank)| *rank)
    }

    pub fn marker(&self) -> Option<Marker> {
        if !self.is_recognized() {
            return None;
        }
        MARKERS
            .iter()
            .find(|(s, _)| *s == self.as_str())
            .map(|(_, marker)| *marker)
    }
}

impl From<String> for State {
    fn from(raw: String) -> Self {
        State::parse(&raw)
    }
}

impl From<&str> for State {
    fn from(raw: &str) -> Self {
        State::parse(raw)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_recognized_literal() {
        for literal in SEVERITY_ORDER {
            let state = State::parse(literal);
            assert!(state.is_recognized(), "{literal} should be recognized");
            assert_eq!(state.as_str(), literal);
        }
    }

    #[test]
    fn test_parse_keeps_unrecognized_literal() {
        let state = State::parse("skipped");
        assert_eq!(state, State::Unrecognized("skipped".to_string()));
        assert_eq!(state.to_string(), "skipped");
        assert!(!is_recognized("skipped"));
    }

    #[test]
    fn test_severity_follows_table_order() {
        let severities: Vec<i32> = SEVERITY_ORDER
            .iter()
            .map(|s| State::parse(s).severity())
            .collect();
        assert_eq!(severities, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(State::parse("mystery").severity(), -1);
    }

    #[test]
    fn test_display_rank_differs_from_severity() {
        // failing family is shown first regardless of its severity position
        assert!(State::Cancelled.severity() > State::Pending.severity());
        assert_eq!(State::Cancelled.display_rank(), 1);
        assert_eq!(State::Pending.display_rank(), 2);
        // neutral is the least severe yet shares the last bucket with success
        assert_eq!(State::Neutral.display_rank(), 3);
        assert_eq!(State::Success.display_rank(), 3);
        assert_eq!(State::parse("mystery").display_rank(), 2);
    }

    #[test]
    fn test_failing_family_shares_rank_and_marker() {
        for state in [
            State::Failure,
            State::Error,
            State::ActionRequired,
            State::Cancelled,
            State::TimedOut,
        ] {
            assert_eq!(state.display_rank(), 1);
            assert_eq!(state.marker(), Some(CROSS));
        }
    }

    #[test]
    fn test_markers() {
        assert_eq!(State::Success.marker().unwrap().color, 32);
        assert_eq!(State::Neutral.marker().unwrap().glyph, "\u{25e6}");
        assert_eq!(State::Pending.marker().unwrap().color, 33);
        assert!(State::parse("skipped").marker().is_none());
    }

    #[test]
    fn test_unrecognized_variant_never_borrows_a_recognized_rank() {
        let forged = State::Unrecognized("success".to_string());
        assert_eq!(forged.severity(), -1);
        assert_eq!(forged.display_rank(), 2);
        assert!(forged.marker().is_none());
    }

    #[test]
    fn test_deserialize_from_json_string() {
        let state: State = serde_json::from_str("\"timed_out\"").unwrap();
        assert_eq!(state, State::TimedOut);
        let state: State = serde_json::from_str("\"stale\"").unwrap();
        assert_eq!(state, State::Unrecognized("stale".to_string()));
    }
}
