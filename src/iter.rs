//! Lazy traversals over the keys of a [`Tree`](crate::Tree).
//!
//! Every traversal keeps its own explicit stack so a degenerate tree (for example one built from
//! sorted keys) can be walked without recursing once per level.

use std::iter::FusedIterator;

use crate::tree::Node;

/// The order a traversal visits nodes in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    /// Left subtree, node, right subtree. Yields keys in sorted order.
    In,
    /// Node, left subtree, right subtree.
    Pre,
    /// Left subtree, right subtree, node.
    Post,
}

#[derive(Clone, Copy, Debug)]
enum Visit<'a> {
    /// The subtree rooted here hasn't been looked at yet.
    Expand(&'a Node),
    /// The children have been scheduled; yield this node's key when popped.
    Emit(&'a Node),
}

/// An iterator over the keys of a tree. Created by [`Tree::traverse`](crate::Tree::traverse)
/// and friends.
#[derive(Clone, Debug)]
pub struct Keys<'a> {
    order: Order,
    stack: Vec<Visit<'a>>,
}

impl<'a> Keys<'a> {
    pub(crate) fn new(root: Option<&'a Node>, order: Order) -> Self {
        let mut keys = Self {
            order,
            stack: Vec::new(),
        };
        keys.schedule(root);

        keys
    }

    /// The order this traversal visits nodes in.
    pub fn order(&self) -> Order {
        self.order
    }

    fn schedule(&mut self, node: Option<&'a Node>) {
        if let Some(node) = node {
            self.stack.push(Visit::Expand(node));
        }
    }
}

impl<'a> Iterator for Keys<'a> {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(visit) = self.stack.pop() {
            let node = match visit {
                Visit::Emit(node) => return Some(node.key()),
                Visit::Expand(node) => node,
            };

            // Pushed in reverse so the left subtree is popped first.
            match self.order {
                Order::In => {
                    self.schedule(node.right());
                    self.stack.push(Visit::Emit(node));
                    self.schedule(node.left());
                }
                Order::Pre => {
                    self.schedule(node.right());
                    self.schedule(node.left());
                    return Some(node.key());
                }
                Order::Post => {
                    self.stack.push(Visit::Emit(node));
                    self.schedule(node.right());
                    self.schedule(node.left());
                }
            }
        }

        None
    }
}

impl FusedIterator for Keys<'_> {}
