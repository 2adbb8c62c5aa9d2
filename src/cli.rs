use clap::Parser;

use crate::color::ColorChoice;

/// ci-status — display the status of CI checks for a commit
///
/// Exit status: 0 for success/neutral (or no checks), 1 for failure, error,
/// action_required, cancelled or timed_out, 2 for pending, 3 for any other
/// state.
#[derive(Parser, Debug, Clone)]
#[command(name = "ci-status", version, about)]
pub struct Cli {
    /// Commit SHA or branch name (default: HEAD), PR<ID>, or a pull request URL
    pub reference: Option<String>,

    /// Print a detailed report of all checks and their URLs
    #[arg(short, long)]
    pub verbose: bool,

    /// Pretty print every check using FORMAT (implies --verbose).
    /// Placeholders: %U url, %S state, %sC state color, %t check name
    #[arg(short, long)]
    pub format: Option<String>,

    /// Colorize output (bare --color means always)
    #[arg(
        long,
        value_enum,
        value_name = "WHEN",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "always"
    )]
    pub color: Option<ColorChoice>,

    /// Path to config file (default: .ci-status.toml if present)
    #[arg(long)]
    pub config: Option<String>,

    /// Resolve the reference and report what would be fetched
    #[arg(long, alias = "dry-run")]
    pub noop: bool,
}
