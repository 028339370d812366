// Hierarchical event trees for structured composition.
//
// A tree is an arena of `Node`s linked by index: each node has at most one
// first child (`child`), a doubly linked chain of siblings (`prev`/`next`), and
// a `parent` back-reference used for lookup only. A node's children are the
// first child plus that child's `next` chain. Node values are complex
// sequences (a single event is a sequence of length one).
//
// The two recoding walks turn a tree of independent values into a tree where
// each value is modulated by its ancestors, and back:
//
// - `gen_relative`: magnitudes multiply (pitch ratios stack up the tree) and
//   phases multiply (a phase-modulation, not an offset). A node's first child
//   is modulated by the node's freshly computed value; its `next` sibling is
//   modulated by the same accumulator the node itself received, so siblings
//   never inherit each other's modulation.
// - `gen_absolute`: divides both out again. A child is demodulated by its
//   parent's value as coded, i.e. the value the forward walk handed it.
//
// Both walks are pre-order (node, then first child's subtree, then `next`'s)
// and use an explicit stack, so long sibling chains cannot overflow the call
// stack. Each walk validates the whole reachable region first and only then
// mutates, so an error leaves the tree untouched.
//
// All storage is a `Vec` indexed by `NodeId` for O(1) lookup and
// deterministic iteration order.

use crate::codec::{ComplexEvent, ComplexSequence, event, phase_of, ratio_of};
use crate::error::{MetarithmsError, Result};
use serde::{Deserialize, Serialize};

/// Compact identifier for a node in an `EventTree`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// One element of an event tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Free-form label (section name, voice, motif id).
    pub label: String,
    pub value: ComplexSequence,
    /// `None` for roots and for siblings of roots.
    pub parent: Option<NodeId>,
    /// First child.
    pub child: Option<NodeId>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    /// True once `value` has been recoded relative to the ancestors.
    pub relative: bool,
}

/// Per-element `(ratio, phase)` modulators used by the recoding walks.
///
/// A single-element accumulator applies to every event of a node; otherwise
/// its length must match the node's value.
#[derive(Clone, Debug, PartialEq)]
pub struct Accumulator {
    ratios: Vec<f64>,
    phases: Vec<f64>,
}

impl Accumulator {
    /// The neutral modulator: ratio 1, phase one full turn.
    pub fn identity() -> Self {
        Accumulator {
            ratios: vec![1.0],
            phases: vec![1.0],
        }
    }

    /// Modulators read from the ratio and phase of each event.
    pub fn from_events(events: &[ComplexEvent]) -> Self {
        Accumulator {
            ratios: events.iter().copied().map(ratio_of).collect(),
            phases: events.iter().copied().map(phase_of).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }

    fn at(&self, index: usize) -> (f64, f64) {
        let i = if self.len() == 1 { 0 } else { index };
        (self.ratios[i], self.phases[i])
    }

    fn check_shape(&self, len: usize) -> Result<()> {
        if self.len() == 1 || self.len() == len {
            Ok(())
        } else {
            Err(MetarithmsError::ShapeMismatch {
                expected: len,
                found: self.len(),
            })
        }
    }

    fn check_invertible(&self) -> Result<()> {
        match self
            .ratios
            .iter()
            .zip(&self.phases)
            .find(|&(&ratio, &phase)| !(ratio > 0.0 && phase > 0.0))
        {
            Some((&ratio, &phase)) => Err(MetarithmsError::DegenerateModulator { ratio, phase }),
            None => Ok(()),
        }
    }

    fn modulate(&self, value: &[ComplexEvent]) -> ComplexSequence {
        value
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let (ratio, phase) = self.at(i);
                event(ratio_of(x) * ratio, phase * phase_of(x))
            })
            .collect()
    }

    fn demodulate(&self, value: &[ComplexEvent]) -> ComplexSequence {
        value
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let (ratio, phase) = self.at(i);
                event(ratio_of(x) / ratio, phase_of(x) / phase)
            })
            .collect()
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Accumulator::identity()
    }
}

impl From<ComplexEvent> for Accumulator {
    fn from(event: ComplexEvent) -> Self {
        Accumulator::from_events(&[event])
    }
}

/// Which recoding walk a validation pass is checking for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Walk {
    Relative,
    Absolute,
}

/// Arena of linked event nodes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventTree {
    nodes: Vec<Node>,
}

impl EventTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// # Panics
    ///
    /// If `id` was not issued by this tree. Use `get` to check first.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    fn push(
        &mut self,
        label: String,
        value: ComplexSequence,
        parent: Option<NodeId>,
        prev: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            label,
            value,
            parent,
            child: None,
            prev,
            next: None,
            relative: false,
        });
        id
    }

    /// Start a new tree (or an unattached fragment). Returns its ID.
    pub fn add_root(&mut self, label: impl Into<String>, value: ComplexSequence) -> NodeId {
        self.push(label.into(), value, None, None)
    }

    /// Append a node at the tail of `node`'s sibling chain. Returns its ID.
    ///
    /// Walks the whole chain to find the tail; callers appending many
    /// siblings in a row should hold on to the returned ID and append to it.
    ///
    /// # Panics
    ///
    /// If `node` was not issued by this tree.
    pub fn add_sibling(
        &mut self,
        node: NodeId,
        label: impl Into<String>,
        value: ComplexSequence,
    ) -> NodeId {
        let tail = self.last_sibling(node);
        let parent = self.node(tail).parent;
        let id = self.push(label.into(), value, parent, Some(tail));
        self.node_mut(tail).next = Some(id);
        id
    }

    /// Attach a node below the deepest first-child descendant of `node`.
    /// Returns its ID.
    ///
    /// This follows `child` links all the way down before attaching, so
    /// repeated calls on the same node build a single nested chain rather
    /// than a list of direct children. Use `add_sibling` on an existing child
    /// to widen a level.
    ///
    /// # Panics
    ///
    /// If `node` was not issued by this tree.
    pub fn add_child(
        &mut self,
        node: NodeId,
        label: impl Into<String>,
        value: ComplexSequence,
    ) -> NodeId {
        let deepest = self.deepest_child(node);
        let id = self.push(label.into(), value, Some(deepest), None);
        self.node_mut(deepest).child = Some(id);
        id
    }

    /// The last node along `node`'s `next` chain (possibly `node` itself).
    ///
    /// # Panics
    ///
    /// If `node` was not issued by this tree.
    pub fn last_sibling(&self, node: NodeId) -> NodeId {
        let mut tail = node;
        while let Some(next) = self.node(tail).next {
            tail = next;
        }
        tail
    }

    /// The last node along `node`'s first-child chain (possibly `node` itself).
    ///
    /// # Panics
    ///
    /// If `node` was not issued by this tree.
    pub fn deepest_child(&self, node: NodeId) -> NodeId {
        let mut deepest = node;
        while let Some(child) = self.node(deepest).child {
            deepest = child;
        }
        deepest
    }

    /// Values along the sibling chain, starting with `node` itself. A foreign
    /// `node` panics on the first `next()`.
    pub fn siblings(&self, node: NodeId) -> Chain<'_> {
        Chain {
            tree: self,
            cursor: Some(node),
            link: |n| n.next,
        }
    }

    /// Values along the first-child chain, starting below `node`.
    ///
    /// # Panics
    ///
    /// If `node` was not issued by this tree.
    pub fn children(&self, node: NodeId) -> Chain<'_> {
        Chain {
            tree: self,
            cursor: self.node(node).child,
            link: |n| n.child,
        }
    }

    /// Recode `node`, its descendants, and its later siblings relative to
    /// `accum`. A `node` from another tree is `UnknownNode`.
    pub fn gen_relative(&mut self, node: NodeId, accum: &Accumulator) -> Result<()> {
        self.validate(node, accum, Walk::Relative)?;
        let mut stack = vec![(node, accum.clone())];
        while let Some((id, acc)) = stack.pop() {
            let n = self.node_mut(id);
            n.relative = true;
            n.value = acc.modulate(&n.value);
            tracing::trace!(node = id.0, label = %n.label, "relative recode");
            let child_acc = Accumulator::from_events(&n.value);
            let (child, next) = (n.child, n.next);
            if let Some(next) = next {
                stack.push((next, acc));
            }
            if let Some(child) = child {
                stack.push((child, child_acc));
            }
        }
        Ok(())
    }

    /// Undo `gen_relative` for the same region, given the same `accum`.
    pub fn gen_absolute(&mut self, node: NodeId, accum: &Accumulator) -> Result<()> {
        self.validate(node, accum, Walk::Absolute)?;
        let mut stack = vec![(node, accum.clone())];
        while let Some((id, acc)) = stack.pop() {
            let n = self.node_mut(id);
            let coded = Accumulator::from_events(&n.value);
            n.relative = false;
            n.value = acc.demodulate(&n.value);
            tracing::trace!(node = id.0, label = %n.label, "absolute recode");
            let (child, next) = (n.child, n.next);
            if let Some(next) = next {
                stack.push((next, acc));
            }
            if let Some(child) = child {
                stack.push((child, coded));
            }
        }
        Ok(())
    }

    /// Dry run of a recoding walk: check every accumulator against the value
    /// it will be applied to, without touching the tree.
    fn validate(&self, node: NodeId, accum: &Accumulator, walk: Walk) -> Result<()> {
        // Links are only ever set to IDs this tree issued, so checking the
        // start node covers the whole walk.
        if self.get(node).is_none() {
            return Err(MetarithmsError::UnknownNode {
                id: node.0,
                len: self.len(),
            });
        }
        let mut stack = vec![(node, accum.clone())];
        let mut visited = 0usize;
        while let Some((id, acc)) = stack.pop() {
            let n = self.node(id);
            acc.check_shape(n.value.len())?;
            if walk == Walk::Absolute {
                acc.check_invertible()?;
            }
            visited += 1;
            if let Some(next) = n.next {
                stack.push((next, acc));
            }
            if let Some(child) = n.child {
                // Only the length matters for the forward walk; the backward
                // walk divides by exactly these values.
                stack.push((child, Accumulator::from_events(&n.value)));
            }
        }
        tracing::debug!(node = node.0, visited, ?walk, "recode validated");
        Ok(())
    }
}

/// Lazy walk over node values along one kind of link.
///
/// Borrows the tree, so the tree cannot be mutated while a walk is live.
pub struct Chain<'a> {
    tree: &'a EventTree,
    cursor: Option<NodeId>,
    link: fn(&Node) -> Option<NodeId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a [ComplexEvent];

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.node(self.cursor?);
        self.cursor = (self.link)(node);
        Some(node.value.as_slice())
    }
}
