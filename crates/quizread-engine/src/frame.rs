//! Variable-binding environments.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{EngineError, Result};

/// One binding environment. A variable, once bound, is immutable for the
/// frame's lifetime; attempting to rebind it to a different value is a
/// join failure and drops the frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame(BTreeMap<String, Value>);

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| EngineError::MissingBinding(name.to_string()))
    }

    /// Unconditional bind, for `where` stages introducing fresh variables.
    pub fn bind(mut self, name: &str, value: Value) -> Self {
        self.0.insert(name.to_string(), value);
        self
    }

    /// Join-semantics bind: extends a copy of this frame, or returns `None`
    /// when `name` is already bound to a different value.
    pub fn try_bind(&self, name: &str, value: &Value) -> Option<Frame> {
        match self.0.get(name) {
            Some(existing) if existing != value => None,
            Some(_) => Some(self.clone()),
            None => Some(self.clone().bind(name, value.clone())),
        }
    }
}

/// Ordered set of frames flowing through one sync evaluation. Order is
/// preserved (it determines response shape for fan-out syncs); exact
/// duplicates are collapsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frames(Vec<Frame>);

impl Frames {
    pub fn new() -> Self {
        Self::default()
    }

    /// The initial frame set: one empty frame.
    pub fn seed() -> Self {
        Self(vec![Frame::new()])
    }

    pub fn push(&mut self, frame: Frame) {
        if !self.0.contains(&frame) {
            self.0.push(frame);
        }
    }

    pub fn extend(&mut self, other: Frames) {
        for frame in other.0 {
            self.push(frame);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Frames {
    type Item = Frame;
    type IntoIter = std::vec::IntoIter<Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Frame> for Frames {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        let mut frames = Frames::new();
        for frame in iter {
            frames.push(frame);
        }
        frames
    }
}
