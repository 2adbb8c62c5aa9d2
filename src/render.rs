use std::collections::HashMap;

use tracing::debug;

use crate::sources::CheckResult;
use crate::template::{Expander, PrettyFormat, sgr};

/// Settings for one verbose rendering pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSpec {
    pub verbose: bool,
    /// Custom pretty format; `None` or empty selects the built-in layout.
    pub format: Option<String>,
    pub colorize: bool,
}

impl ReportSpec {
    fn custom_format(&self) -> Option<&str> {
        self.format.as_deref().filter(|f| !f.is_empty())
    }
}

/// Renders one line per check, failing checks first.
pub struct Renderer {
    expander: Box<dyn Expander>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Box::new(PrettyFormat))
    }
}

impl Renderer {
    pub fn new(expander: Box<dyn Expander>) -> Self {
        Self { expander }
    }

    /// Expand the effective template for every check in display order.
    ///
    /// Each returned entry ends with exactly one newline.
    pub fn render(&self, checks: &[CheckResult], spec: &ReportSpec) -> Vec<String> {
        let width = context_width(checks);
        let ordered = display_order(checks);
        debug!(count = ordered.len(), width, "rendering verbose report");

        ordered
            .into_iter()
            .map(|check| {
                let template = match spec.custom_format() {
                    Some(format) => format.to_string(),
                    None => default_template(check, width),
                };
                let vars = placeholders(check, spec.colorize);
                let mut line = self.expander.expand(&template, &vars, spec.colorize);
                if !line.ends_with('\n') {
                    line.push('\n');
                }
                line
            })
            .collect()
    }
}

/// Length in characters of the longest check name, 0 when there are none.
pub fn context_width(checks: &[CheckResult]) -> usize {
    checks
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
}

/// Checks stably sorted by display rank. The input is left untouched.
pub fn display_order(checks: &[CheckResult]) -> Vec<&CheckResult> {
    let mut ordered: Vec<&CheckResult> = checks.iter().collect();
    ordered.sort_by_key(|c| c.state.display_rank());
    ordered
}

/// Built-in layout: marker, then the name, then the URL column when present.
pub fn default_template(check: &CheckResult, width: usize) -> String {
    let glyph = check.state.marker().map_or("", |m| m.glyph);
    if check.target_url.is_empty() {
        format!("%sC{glyph}%Creset\t%t%n")
    } else {
        format!("%sC{glyph}%Creset\t%<({width})%t\t%U%n")
    }
}

fn placeholders(check: &CheckResult, colorize: bool) -> HashMap<String, String> {
    let color = match check.state.marker() {
        Some(marker) if colorize => sgr(&marker.color.to_string()),
        _ => String::new(),
    };
    HashMap::from([
        ("S".to_string(), check.state.to_string()),
        ("sC".to_string(), color),
        ("t".to_string(), check.name.clone()),
        ("U".to_string(), check.target_url.clone()),
    ])
}
