//! The homogeneous parse tree.
//!
//! Downstream pretty-printers and xref emitters consume a uniform tree of
//! atoms (tokens) and lists, with optional [`Encoding`] annotations on
//! nodes the parser recognized as names or types. Nodes live in an arena;
//! a failed tentative attempt truncates the arena back to its snapshot
//! length, so speculation never leaks nodes.

use sable_ir::{Encoding, Token};
use std::fmt;

/// Index into a [`PTree`] arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct PNodeId(u32);

impl PNodeId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        PNodeId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for PNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PNodeId({})", self.0)
    }
}

/// One parse-tree node.
#[derive(Clone, Debug)]
pub enum PNode {
    /// A leaf holding one token.
    Atom { token: Token },
    /// An interior node holding its children in source order, annotated
    /// with the encoding of the name or type it spells, when one was
    /// built.
    List {
        children: Vec<PNodeId>,
        encoding: Option<Encoding>,
    },
}

/// Arena of parse-tree nodes for one translation unit.
#[derive(Default)]
pub struct PTree {
    nodes: Vec<PNode>,
}

impl PTree {
    pub fn new() -> Self {
        PTree { nodes: Vec::new() }
    }

    pub fn atom(&mut self, token: Token) -> PNodeId {
        self.push(PNode::Atom { token })
    }

    pub fn list(&mut self, children: Vec<PNodeId>) -> PNodeId {
        self.push(PNode::List {
            children,
            encoding: None,
        })
    }

    pub fn list_with(&mut self, children: Vec<PNodeId>, encoding: Encoding) -> PNodeId {
        self.push(PNode::List {
            children,
            encoding: Some(encoding),
        })
    }

    fn push(&mut self, node: PNode) -> PNodeId {
        debug_assert!(self.nodes.len() < u32::MAX as usize);
        let id = PNodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    #[inline]
    pub fn get(&self, id: PNodeId) -> &PNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Roll the arena back to a snapshot length. Nodes allocated by a
    /// failed speculative attempt disappear.
    pub fn truncate(&mut self, len: usize) {
        debug_assert!(len <= self.nodes.len());
        self.nodes.truncate(len);
    }
}
