//! Conversion between the flat, parent-linked comment list and the
//! nested reply tree.
//!
//! A comment whose parent is unknown (or that is part of a parent cycle)
//! is adopted as a root instead of being dropped, so
//! `flatten(build_tree(list))` always yields the same set of comments.

use std::collections::HashMap;

use tsync_entities::{comment::Comment, id::Id};

pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Anything that takes part in a reply hierarchy.
pub trait Threaded {
    fn id(&self) -> &Id;
    fn parent_id(&self) -> Option<&Id>;
}

impl Threaded for Comment {
    fn id(&self) -> &Id {
        &self.id
    }
    fn parent_id(&self) -> Option<&Id> {
        self.parent_id.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentTreeNode<T = Comment> {
    pub comment: T,
    pub children: Vec<CommentTreeNode<T>>,
    pub depth: usize,
}

struct Assembly<T> {
    items: Vec<Option<T>>,
    children: HashMap<usize, Vec<usize>>,
    visited: Vec<bool>,
    max_depth: usize,
}

impl<T> Assembly<T> {
    fn take(&mut self, idx: usize) -> Option<(T, Vec<usize>)> {
        if self.visited[idx] {
            return None;
        }
        self.visited[idx] = true;
        let item = self.items[idx].take()?;
        let children = self.children.remove(&idx).unwrap_or_default();
        Some((item, children))
    }

    fn build_level(
        &mut self,
        indices: Vec<usize>,
        depth: usize,
        out: &mut Vec<CommentTreeNode<T>>,
    ) {
        for idx in indices {
            let Some((comment, kids)) = self.take(idx) else {
                continue;
            };
            if depth < self.max_depth {
                let mut children = Vec::with_capacity(kids.len());
                self.build_level(kids, depth + 1, &mut children);
                out.push(CommentTreeNode {
                    comment,
                    children,
                    depth,
                });
            } else {
                out.push(CommentTreeNode {
                    comment,
                    children: vec![],
                    depth,
                });
                // Too deep: the whole subtree follows as siblings.
                let mut stack: Vec<usize> = kids.into_iter().rev().collect();
                while let Some(idx) = stack.pop() {
                    let Some((comment, kids)) = self.take(idx) else {
                        continue;
                    };
                    stack.extend(kids.into_iter().rev());
                    out.push(CommentTreeNode {
                        comment,
                        children: vec![],
                        depth,
                    });
                }
            }
        }
    }
}

/// Groups the flat list by parent.
///
/// Roots keep their relative input order, as do the children of each node.
/// Nodes never get deeper than `max_depth`; deeper replies are attached at
/// `max_depth` right behind their capped ancestor.
pub fn build_tree<T: Threaded>(flat: Vec<T>, max_depth: usize) -> Vec<CommentTreeNode<T>> {
    let mut index: HashMap<Id, usize> = HashMap::with_capacity(flat.len());
    for (idx, item) in flat.iter().enumerate() {
        index.entry(item.id().clone()).or_insert(idx);
    }
    let mut roots = vec![];
    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    for (idx, item) in flat.iter().enumerate() {
        match item.parent_id().and_then(|p| index.get(p)) {
            Some(&parent) if parent != idx => children.entry(parent).or_default().push(idx),
            _ => roots.push(idx),
        }
    }
    let len = flat.len();
    let mut assembly = Assembly {
        items: flat.into_iter().map(Some).collect(),
        children,
        visited: vec![false; len],
        max_depth,
    };
    let mut tree = Vec::with_capacity(roots.len());
    assembly.build_level(roots, 0, &mut tree);

    // Whatever is left over hangs on a parent cycle.
    for idx in 0..len {
        if !assembly.visited[idx] {
            log::debug!("Adopting comment on a parent cycle as root");
            assembly.build_level(vec![idx], 0, &mut tree);
        }
    }
    tree
}

/// Pre-order traversal: every parent precedes its children.
pub fn flatten<T>(tree: Vec<CommentTreeNode<T>>) -> Vec<T> {
    let mut flat = vec![];
    let mut stack: Vec<_> = tree.into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        let CommentTreeNode {
            comment, children, ..
        } = node;
        flat.push(comment);
        stack.extend(children.into_iter().rev());
    }
    flat
}

pub fn count_nodes<T>(tree: &[CommentTreeNode<T>]) -> usize {
    let mut count = 0;
    let mut stack: Vec<&CommentTreeNode<T>> = tree.iter().collect();
    while let Some(node) = stack.pop() {
        count += 1;
        stack.extend(node.children.iter());
    }
    count
}

pub fn find_node<'a, T: Threaded>(
    tree: &'a [CommentTreeNode<T>],
    id: &Id,
) -> Option<&'a CommentTreeNode<T>> {
    let mut stack: Vec<&CommentTreeNode<T>> = tree.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.comment.id() == id {
            return Some(node);
        }
        stack.extend(node.children.iter().rev());
    }
    None
}
