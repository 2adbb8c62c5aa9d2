pub mod github;

use std::fmt;

use crate::error::Result;
use crate::state::State;

pub const DEFAULT_HOST: &str = "github.com";

/// One reported check for a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub name: String,
    pub state: State,
    /// Empty when the check has no details link.
    pub target_url: String,
}

impl CheckResult {
    pub fn new(
        name: impl Into<String>,
        state: impl Into<State>,
        target_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
            target_url: target_url.into(),
        }
    }
}

/// A repository on a hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub host: String,
    pub owner: String,
    pub name: String,
}

impl Project {
    pub fn new(host: &str, owner: &str, name: &str) -> Self {
        Self {
            host: host.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Remote service that knows about projects, pull requests and their checks.
pub trait CheckSource {
    /// The project the current working directory belongs to.
    fn current_project(&self) -> Result<Project>;

    /// Head commit SHA of a pull request.
    fn pull_request_head(&self, project: &Project, number: u64) -> Result<String>;

    /// All checks reported for `sha`, in the order the service returns them.
    fn fetch_checks(&self, project: &Project, sha: &str) -> Result<Vec<CheckResult>>;
}
