use crate::visitor::{PathSegment, render_path};
use derive_more::Deref;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// VisitorContext
/// Narrow interface exposed to visitors and validators for reporting
/// non-fatal issues. Implemented by adapters via a short-lived context.
///

pub trait VisitorContext {
    fn add_issue(&mut self, issue: Issue);
    fn add_issue_at(&mut self, seg: PathSegment, issue: Issue);
}

impl dyn VisitorContext + '_ {
    pub fn issue(&mut self, msg: impl Into<String>) {
        self.add_issue(Issue {
            message: msg.into(),
        });
    }

    pub fn issue_at(&mut self, seg: PathSegment, msg: impl Into<String>) {
        self.add_issue_at(
            seg,
            Issue {
                message: msg.into(),
            },
        );
    }
}

/// VisitorContext that pins all issues to a single path segment.
pub struct ScopedContext<'a> {
    ctx: &'a mut dyn VisitorContext,
    seg: PathSegment,
}

impl<'a> ScopedContext<'a> {
    #[must_use]
    pub fn new(ctx: &'a mut dyn VisitorContext, seg: PathSegment) -> Self {
        Self { ctx, seg }
    }
}

impl VisitorContext for ScopedContext<'_> {
    fn add_issue(&mut self, issue: Issue) {
        self.ctx.add_issue_at(self.seg.clone(), issue);
    }

    fn add_issue_at(&mut self, _seg: PathSegment, issue: Issue) {
        self.ctx.add_issue_at(self.seg.clone(), issue);
    }
}

///
/// Issue
///

#[derive(Clone, Debug, Default)]
pub struct Issue {
    pub message: String,
}

///
/// Issues
///
/// Validation messages grouped by rendered path (`fields[2].name`).
/// The empty path holds issues raised against the root itself.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Issues(BTreeMap<String, Vec<String>>);

impl Issues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_default().push(message.into());
    }

    /// Merge another issue set, prefixing each of its paths.
    pub fn merge_under(&mut self, prefix: &str, other: Self) {
        for (path, messages) in other.0 {
            let key = match (prefix.is_empty(), path.is_empty()) {
                (true, _) => path,
                (false, true) => prefix.to_string(),
                (false, false) if path.starts_with('[') => format!("{prefix}{path}"),
                (false, false) => format!("{prefix}.{path}"),
            };
            self.0.entry(key).or_default().extend(messages);
        }
    }

    pub fn merge(&mut self, other: Self) {
        self.merge_under("", other);
    }

    /// Messages recorded for one path.
    #[must_use]
    pub fn at(&self, path: &str) -> &[String] {
        self.0.get(path).map_or(&[], Vec::as_slice)
    }

    /// Total number of messages across all paths.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl From<BTreeMap<String, Vec<String>>> for Issues {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Self(map)
    }
}

///
/// IssueCollector
/// Stand-alone root context; used where no traversal is involved.
///

#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: Issues,
}

impl IssueCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_issues(self) -> Issues {
        self.issues
    }
}

impl VisitorContext for IssueCollector {
    fn add_issue(&mut self, issue: Issue) {
        self.issues.add(String::new(), issue.message);
    }

    fn add_issue_at(&mut self, seg: PathSegment, issue: Issue) {
        self.issues.add(render_path(&[], Some(seg)), issue.message);
    }
}
