//! This crate exposes an unbalanced Binary Search Tree (BST) over `i32` keys whose nodes know
//! their parent.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to insert, find, and delete
//! stored keys. BSTs are typically defined recursively using the notion of a `Node`. A `Node`
//! stores a key and will sometimes have child `Node`s. The most important invariants of a BST
//! are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a key less than or
//!    equal to its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a key greater than its
//!    own key.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for keys in the tree takes `O(height)` (where `height` is defined as the longest
//! path from the root `Node` to a leaf `Node`). This tree does no balancing, so inserting keys in
//! sorted order builds a tree whose height is the number of keys. BSTs also naturally support
//! sorted iteration by visiting the left subtree, then the subtree root, then the right subtree.
//!
//! ## Parent links
//!
//! Besides its two children, every [`Node`] links back to its parent. The link doesn't own the
//! parent, it is only used to walk upwards - for example to find a key's successor with
//! [`Tree::get_next`] or a node's [`depth`](Node::depth).

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod iter;
pub mod tree;


pub use iter::{Keys, Order};
pub use tree::{depth, height, is_leaf, is_root, num_children, num_descendants, Node, Tree};
