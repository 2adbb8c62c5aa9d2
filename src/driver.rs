use tracing::{debug, info};

use crate::aggregate::overall_state;
use crate::config::Config;
use crate::error::Result;
use crate::exit_code::exit_code;
use crate::render::{Renderer, ReportSpec};
use crate::resolve::{Reference, RevParse, resolve};
use crate::sources::{CheckResult, CheckSource};

pub const NO_STATUS: &str = "no status";

/// Text for stdout and the code to exit with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub exit_code: i32,
}

/// Resolve the configured reference, fetch its checks, and report on them.
pub fn run(
    config: &Config,
    colorize: bool,
    source: &dyn CheckSource,
    git: &dyn RevParse,
) -> Result<Outcome> {
    let reference = Reference::parse(config.reference.as_deref())?;
    let target = resolve(&reference, source, git)?;

    if config.noop {
        return Ok(Outcome {
            output: format!("Would request CI status for {}\n", target.sha),
            exit_code: 0,
        });
    }

    let checks = source.fetch_checks(&target.project, &target.sha)?;
    info!(project = %target.project, sha = %target.sha, count = checks.len(), "fetched checks");

    Ok(report(&checks, &config.report_spec(colorize)))
}

/// Aggregate `checks` and produce either the one-line verdict or the verbose
/// per-check report.
pub fn report(checks: &[CheckResult], spec: &ReportSpec) -> Outcome {
    let overall = overall_state(checks);
    let code = exit_code(overall.as_ref());
    debug!(overall = ?overall, exit_code = code, "aggregated checks");

    let output = if spec.verbose && !checks.is_empty() {
        Renderer::default().render(checks, spec).concat()
    } else {
        match overall {
            Some(state) if !state.as_str().is_empty() => format!("{state}\n"),
            _ => format!("{NO_STATUS}\n"),
        }
    };

    Outcome {
        output,
        exit_code: code,
    }
}
