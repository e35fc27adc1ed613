mod context;
pub mod validate;

pub use context::{Issue, IssueCollector, Issues, ScopedContext, VisitorContext};

use crate::record::Record;
use std::fmt::Write;

// ============================================================================
// Path
// ============================================================================

#[derive(Clone, Debug)]
pub enum PathSegment {
    Empty,
    Field(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Field(s.to_string())
        }
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Field(s)
        }
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

pub(crate) fn render_path(path: &[PathSegment], extra: Option<PathSegment>) -> String {
    let mut out = String::new();
    let mut first = true;

    for seg in path.iter().cloned().chain(extra) {
        match seg {
            PathSegment::Field(s) => {
                if !first {
                    out.push('.');
                }
                out.push_str(&s);
            }
            PathSegment::Index(i) => {
                let _ = write!(out, "[{i}]");
            }
            PathSegment::Empty => continue,
        }
        first = false;
    }

    out
}

// ============================================================================
// Visitor
// ============================================================================

pub trait Visitor<E> {
    fn enter(&mut self, node: &Record, ctx: &mut dyn VisitorContext) -> Result<(), E>;

    fn exit(&mut self, node: &Record) -> Result<(), E>;
}

// ============================================================================
// VisitorCore (object-safe traversal)
// ============================================================================

pub trait VisitorCore {
    fn enter(&mut self, node: &Record);
    fn exit(&mut self, node: &Record);

    fn push(&mut self, _: PathSegment) {}
    fn pop(&mut self) {}
}

// ============================================================================
// Internal adapter context
// ============================================================================

struct AdapterContext<'a> {
    path: &'a [PathSegment],
    issues: &'a mut Issues,
}

impl VisitorContext for AdapterContext<'_> {
    fn add_issue(&mut self, issue: Issue) {
        self.issues.add(render_path(self.path, None), issue.message);
    }

    fn add_issue_at(&mut self, seg: PathSegment, issue: Issue) {
        self.issues
            .add(render_path(self.path, Some(seg)), issue.message);
    }
}

// ============================================================================
// VisitorAdapter
// ============================================================================

pub struct VisitorAdapter<V, E> {
    visitor: V,
    fatal: Option<E>,
    path: Vec<PathSegment>,
    issues: Issues,
}

impl<V, E> VisitorAdapter<V, E>
where
    V: Visitor<E>,
{
    #[must_use]
    pub fn new(visitor: V) -> Self {
        Self {
            visitor,
            fatal: None,
            path: Vec::new(),
            issues: Issues::new(),
        }
    }

    pub fn finish(self) -> Result<Issues, E> {
        match self.fatal {
            Some(e) => Err(e),
            None => Ok(self.issues),
        }
    }

    pub const fn issues(&self) -> &Issues {
        &self.issues
    }
}

impl<V, E> VisitorCore for VisitorAdapter<V, E>
where
    V: Visitor<E>,
{
    fn push(&mut self, seg: PathSegment) {
        if !matches!(seg, PathSegment::Empty) {
            self.path.push(seg);
        }
    }

    fn pop(&mut self) {
        self.path.pop();
    }

    fn enter(&mut self, node: &Record) {
        if self.fatal.is_none() {
            let mut ctx = AdapterContext {
                path: &self.path,
                issues: &mut self.issues,
            };

            if let Err(e) = self.visitor.enter(node, &mut ctx) {
                self.fatal = Some(e);
            }
        }
    }

    fn exit(&mut self, node: &Record) {
        if self.fatal.is_none()
            && let Err(e) = self.visitor.exit(node)
        {
            self.fatal = Some(e);
        }
    }
}

// ============================================================================
// Traversal
// ============================================================================

/// Visit a record and every record held by its loaded associations.
///
/// Unloaded associations are skipped: their rows were never touched in
/// this unit of work.
pub fn perform_visit<S: Into<PathSegment>>(visitor: &mut dyn VisitorCore, node: &Record, seg: S) {
    let seg = seg.into();
    let should_push = !matches!(seg, PathSegment::Empty);

    if should_push {
        visitor.push(seg);
    }

    visitor.enter(node);
    for assoc in node.associations().filter(|a| a.is_loaded()) {
        visitor.push(PathSegment::Field(assoc.name().to_string()));
        for (index, child) in assoc.records().iter().enumerate() {
            perform_visit(visitor, child, index);
        }
        visitor.pop();
    }
    visitor.exit(node);

    if should_push {
        visitor.pop();
    }
}
