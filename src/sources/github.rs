use std::process::Command;
use std::thread;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::state::State;

use super::{CheckResult, CheckSource, DEFAULT_HOST, Project};

const INITIAL_BACKOFF_MS: u64 = 500;
const PER_PAGE: usize = 100;
const GH_FAILED: &str = "gh failed: ";

/// Substrings of `gh` errors that mean the request never reached GitHub.
const TRANSPORT_ERRORS: &[&str] = &[
    "error connecting to",
    "connection reset",
    "connection refused",
    "timed out",
    "timeout",
    "unexpected EOF",
    "TLS handshake",
];

/// Abstraction over `gh` CLI execution for testability.
pub trait GhClient {
    fn run(&self, args: &[&str]) -> Result<String>;

    /// `gh api` against a specific host.
    fn api(&self, host: &str, path: &str) -> Result<String> {
        self.run(&["api", "--hostname", host, path])
    }
}

/// Real `gh` CLI client with retry and exponential backoff.
struct DefaultGhClient {
    binary: String,
    retries: u32,
}

impl GhClient for DefaultGhClient {
    fn run(&self, args: &[&str]) -> Result<String> {
        retry_with_backoff_ms(
            || {
                let output = Command::new(&self.binary)
                    .args(args)
                    .output()
                    .map_err(|e| Error::Fetch(format!("failed to run {}: {e}", self.binary)))?;

                if output.status.success() {
                    String::from_utf8(output.stdout)
                        .map_err(|e| Error::Fetch(format!("invalid utf8 from gh: {e}")))
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(Error::Fetch(format!("{GH_FAILED}{}", stderr.trim())))
                }
            },
            INITIAL_BACKOFF_MS,
            self.retries,
        )
    }
}

/// Checks from GitHub commit statuses and check runs, via the `gh` CLI.
pub struct GitHubSource {
    client: Box<dyn GhClient>,
}

impl GitHubSource {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Box::new(DefaultGhClient {
                binary: config.gh_binary.clone(),
                retries: config.retries,
            }),
        }
    }

    pub fn with_client(client: Box<dyn GhClient>) -> Self {
        Self { client }
    }

    fn fetch_statuses(&self, project: &Project, sha: &str) -> Result<Vec<CheckResult>> {
        let path = format!(
            "repos/{}/{}/commits/{sha}/status",
            project.owner, project.name
        );
        let statuses =
            self.fetch_all_pages(project, &path, "commit status", |page: GhCombinedStatus| {
                (page.total_count, page.statuses)
            })?;

        Ok(statuses
            .into_iter()
            .map(|s| CheckResult::new(s.context, s.state, s.target_url.unwrap_or_default()))
            .collect())
    }

    fn fetch_check_runs(&self, project: &Project, sha: &str) -> Result<Vec<CheckResult>> {
        let path = format!(
            "repos/{}/{}/commits/{sha}/check-runs",
            project.owner, project.name
        );
        let runs = self.fetch_all_pages(project, &path, "check runs", |page: GhCheckRuns| {
            (page.total_count, page.check_runs)
        })?;

        Ok(runs.into_iter().map(check_run_result).collect())
    }

    /// Walk `path` page by page until `total_count` items arrived or a short
    /// page ends the listing.
    fn fetch_all_pages<P, T>(
        &self,
        project: &Project,
        path: &str,
        what: &str,
        split: impl Fn(P) -> (Option<usize>, Vec<T>),
    ) -> Result<Vec<T>>
    where
        P: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page_number = 1;

        loop {
            let paged = format!("{path}?per_page={PER_PAGE}&page={page_number}");
            let json = self.client.api(&project.host, &paged)?;
            let page: P = serde_json::from_str(&json)
                .map_err(|e| Error::Fetch(format!("failed to parse {what}: {e}")))?;
            let (total_count, batch) = split(page);
            let received = batch.len();
            items.extend(batch);

            let complete = total_count.is_some_and(|total| items.len() >= total);
            if received < PER_PAGE || complete {
                if let Some(total) = total_count
                    && items.len() < total
                {
                    warn!(what, total, received = items.len(), "listing ended early");
                }
                return Ok(items);
            }
            debug!(what, page = page_number, received = items.len(), "fetching next page");
            page_number += 1;
        }
    }
}

/// Map a check run onto the status vocabulary: anything not completed is
/// pending, completed runs report their conclusion verbatim.
fn check_run_result(run: GhCheckRun) -> CheckResult {
    let state = if run.status == "completed" {
        run.conclusion.unwrap_or_else(|| State::Unrecognized(String::new()))
    } else {
        State::Pending
    };
    CheckResult::new(run.name, state, run.html_url.unwrap_or_default())
}

fn host_from_url(url: &str) -> Option<String> {
    let re = Regex::new(r"^https?://([^/]+)").unwrap();
    re.captures(url).map(|c| c[1].to_string())
}

// --- gh / REST response types ---

#[derive(Debug, Deserialize)]
struct RepoInfo {
    name: String,
    owner: RepoOwner,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct RepoOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhPullRequest {
    head: GhPullRequestHead,
}

#[derive(Debug, Deserialize)]
struct GhPullRequestHead {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GhCombinedStatus {
    total_count: Option<usize>,
    #[serde(default)]
    statuses: Vec<GhStatus>,
}

#[derive(Debug, Deserialize)]
struct GhStatus {
    state: State,
    context: String,
    target_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhCheckRuns {
    total_count: Option<usize>,
    #[serde(default)]
    check_runs: Vec<GhCheckRun>,
}

#[derive(Debug, Deserialize)]
struct GhCheckRun {
    name: String,
    status: String,
    conclusion: Option<State>,
    html_url: Option<String>,
}

impl CheckSource for GitHubSource {
    fn current_project(&self) -> Result<Project> {
        let json = self
            .client
            .run(&["repo", "view", "--json", "owner,name,url"])?;
        let info: RepoInfo = serde_json::from_str(&json)
            .map_err(|e| Error::Fetch(format!("failed to parse repo info: {e}")))?;
        let host = host_from_url(&info.url).unwrap_or_else(|| DEFAULT_HOST.to_string());
        Ok(Project::new(&host, &info.owner.login, &info.name))
    }

    fn pull_request_head(&self, project: &Project, number: u64) -> Result<String> {
        let path = format!("repos/{}/{}/pulls/{number}", project.owner, project.name);
        let json = self.client.api(&project.host, &path)?;
        let pr: GhPullRequest = serde_json::from_str(&json)
            .map_err(|e| Error::Fetch(format!("failed to parse pull request: {e}")))?;
        debug!(number, sha = %pr.head.sha, "fetched pull request head");
        Ok(pr.head.sha)
    }

    fn fetch_checks(&self, project: &Project, sha: &str) -> Result<Vec<CheckResult>> {
        let mut checks = self.fetch_statuses(project, sha)?;
        let statuses = checks.len();
        checks.extend(self.fetch_check_runs(project, sha)?);
        debug!(
            statuses,
            check_runs = checks.len() - statuses,
            "fetched checks"
        );
        Ok(checks)
    }
}

fn retry_with_backoff_ms<F, T>(f: F, initial_backoff_ms: u64, max_retries: u32) -> Result<T>
where
    F: Fn() -> Result<T>,
{
    let mut backoff_ms = initial_backoff_ms;
    let mut attempt = 1;

    loop {
        match f() {
            Ok(val) => return Ok(val),
            Err(e) if attempt < max_retries && is_retryable(&e) => {
                warn!(attempt, error = %e, backoff_ms, "retrying after transient error");
                thread::sleep(Duration::from_millis(backoff_ms));
                backoff_ms = backoff_ms.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Only retry rate-limits (429), server errors (5xx), and transport/network
/// errors reported by `gh`.
fn is_retryable(err: &Error) -> bool {
    let Error::Fetch(message) = err else {
        return false;
    };
    let Some(stderr) = message.strip_prefix(GH_FAILED) else {
        return false;
    };
    let status_re = Regex::new(r"HTTP (\d{3})").unwrap();
    match status_re
        .captures(stderr)
        .and_then(|c| c[1].parse::<u16>().ok())
    {
        Some(code) => code == 429 || code >= 500,
        None => TRANSPORT_ERRORS.iter().any(|hint| stderr.contains(hint)),
    }
}
