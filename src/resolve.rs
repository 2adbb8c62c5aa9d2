use std::process::Command;

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::sources::{CheckSource, Project};

/// What the user asked to check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Commit SHA, branch name, or any other git revision.
    Revision(String),
    /// `PR<id>` in the current project.
    PullRequest(u64),
    /// Pull request URL, possibly for another project.
    PullRequestUrl { project: Project, number: u64 },
}

impl Reference {
    /// Classify a CLI argument. No argument means `HEAD`.
    ///
    /// A project URL that does not point at a pull request is an error rather
    /// than a revision.
    pub fn parse(arg: Option<&str>) -> Result<Self> {
        let Some(arg) = arg else {
            return Ok(Reference::Revision("HEAD".to_string()));
        };

        let pr_re = Regex::new(r"^PR(\d+)$").unwrap();
        if let Some(caps) = pr_re.captures(arg)
            && let Ok(number) = caps[1].parse::<u64>()
        {
            return Ok(Reference::PullRequest(number));
        }

        let url_re = Regex::new(r"^https?://([^/]+)/([^/]+)/([^/?#]+)/?([^?#]*)").unwrap();
        if let Some(caps) = url_re.captures(arg) {
            let name = caps[3].trim_end_matches(".git");
            let project = Project::new(&caps[1], &caps[2], name);
            let path_re = Regex::new(r"^pull/(\d+)").unwrap();
            let number = path_re
                .captures(&caps[4])
                .and_then(|c| c[1].parse::<u64>().ok())
                .ok_or_else(|| {
                    Error::Resolution(format!("the URL does not contain a pull request: {arg}"))
                })?;
            return Ok(Reference::PullRequestUrl { project, number });
        }

        Ok(Reference::Revision(arg.to_string()))
    }
}

/// A commit on a hosting project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub project: Project,
    pub sha: String,
}

/// Turns git revisions into commit SHAs.
pub trait RevParse {
    fn rev_parse(&self, revision: &str) -> Result<String>;
}

/// `git rev-parse` in the current working directory.
#[derive(Debug, Default)]
pub struct LocalGit;

impl RevParse for LocalGit {
    fn rev_parse(&self, revision: &str) -> Result<String> {
        let output = Command::new("git")
            .args(["rev-parse", "--verify", "--quiet"])
            .arg(format!("{revision}^{{commit}}"))
            .output()
            .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git(format!(
                "git rev-parse {revision} failed: {}",
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Resolve a reference to a project and commit SHA.
pub fn resolve(
    reference: &Reference,
    source: &dyn CheckSource,
    git: &dyn RevParse,
) -> Result<Target> {
    let target = match reference {
        Reference::Revision(revision) => {
            let project = source.current_project()?;
            let sha = git.rev_parse(revision).map_err(|e| {
                debug!(revision = %revision, error = %e, "rev-parse failed");
                Error::Resolution(format!(
                    "Aborted: no revision could be determined from '{revision}'"
                ))
            })?;
            Target { project, sha }
        }
        Reference::PullRequest(number) => {
            let project = source.current_project()?;
            let sha = pull_request_head(source, &project, *number)?;
            Target { project, sha }
        }
        Reference::PullRequestUrl { project, number } => {
            let sha = pull_request_head(source, project, *number)?;
            Target {
                project: project.clone(),
                sha,
            }
        }
    };
    debug!(project = %target.project, sha = %target.sha, "resolved reference");
    Ok(target)
}

fn pull_request_head(source: &dyn CheckSource, project: &Project, number: u64) -> Result<String> {
    source.pull_request_head(project, number).map_err(|e| {
        Error::Resolution(format!(
            "could not resolve pull request #{number} in {project}: {e}"
        ))
    })
}
