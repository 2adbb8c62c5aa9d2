use std::io::Write;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ci_status::cli::Cli;
use ci_status::color::should_colorize;
use ci_status::config::Config;
use ci_status::driver;
use ci_status::resolve::LocalGit;
use ci_status::sources::github::GitHubSource;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let config = match Config::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    debug!(?config, "config loaded");

    let colorize = should_colorize(config.color);
    let source = GitHubSource::new(&config);

    match driver::run(&config, colorize, &source, &LocalGit) {
        Ok(outcome) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout
                .write_all(outcome.output.as_bytes())
                .and_then(|()| stdout.flush())
            {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
            std::process::exit(outcome.exit_code);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
