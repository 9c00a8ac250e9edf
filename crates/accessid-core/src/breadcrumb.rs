//! Breadcrumb stack.
//!
//! The stack holds the names of the decorated subtrees that are currently
//! open during a depth-first traversal. It never holds two consecutive equal
//! names: re-entering the subtree that is already on top (the same naming
//! decoration applied twice to one node) is absorbed into the top frame and
//! only counted, so the matching pop stays balanced.

use std::fmt;
use std::sync::Arc;

/// Separator placed between breadcrumb segments.
pub const BREADCRUMB_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    name: String,
    /// Pushes absorbed into this frame on top of the first one.
    repeats: usize,
}

/// Ordered push/pop stack of subtree names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreadcrumbStack {
    frames: Vec<Frame>,
}

impl BreadcrumbStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a scope named `name`.
    ///
    /// Returns `true` if a new segment was appended, `false` if the push was
    /// absorbed because `name` is already on top.
    pub fn push(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        match self.frames.last_mut() {
            Some(top) if top.name == name => {
                top.repeats += 1;
                false
            }
            _ => {
                self.frames.push(Frame { name, repeats: 0 });
                true
            }
        }
    }

    /// Close the most recently opened scope.
    ///
    /// Returns the name of the closed scope, or `None` if the stack is empty.
    pub fn pop(&mut self) -> Option<String> {
        let top = self.frames.last_mut()?;
        if top.repeats > 0 {
            top.repeats -= 1;
            return Some(top.name.clone());
        }
        self.frames.pop().map(|frame| frame.name)
    }

    /// Name of the innermost open scope.
    pub fn top(&self) -> Option<&str> {
        self.frames.last().map(|frame| frame.name.as_str())
    }

    /// Number of open scopes, absorbed pushes included.
    pub fn depth(&self) -> usize {
        self.frames.iter().map(|frame| frame.repeats + 1).sum()
    }

    /// Number of visible segments.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop every open scope.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Immutable view of the visible segments, outermost first.
    pub fn snapshot(&self) -> Breadcrumb {
        let mut segments: Vec<String> = Vec::with_capacity(self.frames.len());
        for frame in &self.frames {
            if segments.last() != Some(&frame.name) {
                segments.push(frame.name.clone());
            }
        }
        Breadcrumb(segments.into())
    }
}

/// An immutable, cheaply clonable breadcrumb path.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Breadcrumb(Arc<[String]>);

impl Breadcrumb {
    /// The empty path.
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Build a path from segments, collapsing consecutive duplicates.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut stack = BreadcrumbStack::new();
        for segment in segments {
            stack.push(segment);
        }
        stack.snapshot()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Innermost segment.
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl Default for Breadcrumb {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Breadcrumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for Breadcrumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{BREADCRUMB_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}
