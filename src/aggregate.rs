use crate::sources::CheckResult;
use crate::state::State;

/// Collapse checks into the single most severe state.
///
/// Returns `None` for an empty slice. Ties keep the first check seen, so a
/// run of unrecognized states reports the first one.
pub fn overall_state(checks: &[CheckResult]) -> Option<State> {
    let (first, rest) = checks.split_first()?;
    let worst = rest.iter().fold(&first.state, |worst, check| {
        if check.state.severity() > worst.severity() {
            &check.state
        } else {
            worst
        }
    });
    Some(worst.clone())
}
