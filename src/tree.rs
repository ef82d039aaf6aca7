//! An unbalanced BST over `i32` keys. Every node keeps a non-owning link to its parent so
//! successor queries and depth calculations can walk upwards without a stack.
//!
//! # Examples
//!
//! ```
//! use bst::Tree;
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert!(tree.find(1).is_none());
//!
//! // The first node inserted becomes the root.
//! let root = tree.insert(5);
//! assert!(root.is_root());
//!
//! tree.insert(3);
//! tree.insert(8);
//!
//! // `find` returns the closest node when the key is missing.
//! assert_eq!(tree.find(4).map(|n| n.key()), Some(3));
//! assert_eq!(tree.get_next(5).map(|n| n.key()), Some(8));
//!
//! // Deleting a node with two children pulls its successor's key up.
//! let root = tree.delete(5);
//! assert_eq!(root.map(|n| n.key()), Some(8));
//! assert_eq!(tree.in_order().collect::<Vec<_>>(), [3, 8]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::io;
use std::marker::PhantomData;
use std::ptr::NonNull;

use log::{debug, trace};

use crate::iter::{Keys, Order};

/// An unbalanced Binary Search Tree. This can be used for inserting, finding, and deleting keys
/// as well as asking structural questions about the nodes it holds.
///
/// Equal keys always go to the left, so a key inserted twice ends up in the left subtree of the
/// first node holding it.
pub struct Tree {
    // This is a `Link` instead of an `Option<Node>` so that it can be moved around with the `Tree`
    // without the children's parent pointers breaking.
    root: Link,
    len: usize,
    marker: PhantomData<Box<Node>>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        if let Some(root) = self.root.take().0 {
            stack.push((root, false));
        }

        // Children are released before their parent. `Node` has no `Drop` of its own so
        // releasing a node never touches its children.
        while let Some((ptr, expanded)) = stack.pop() {
            if expanded {
                // SAFETY: The tree owns every node exactly once and each node is pushed with
                // `expanded == true` exactly once, so this is the only `Box` ever rebuilt for it.
                // Nodes are allocated with `Box::new` in `Node::new_boxed`.
                unsafe { drop(Box::from_raw(ptr.as_ptr())) };
                continue;
            }

            stack.push((ptr, true));
            // SAFETY: `ptr` hasn't been released yet; only its descendants are released before it.
            let node = unsafe { ptr.as_ref() };
            stack.extend(node.right.0.map(|right| (right, false)));
            stack.extend(node.left.0.map(|left| (left, false)));
        }
        self.len = 0;
    }
}

impl Clone for Tree {
    /// Copies the tree node by node, so the clone has exactly the same shape.
    fn clone(&self) -> Self {
        let mut tree = Self::new();
        let Some(root) = self.root() else {
            return tree;
        };

        let new_root = NonNull::from(Box::leak(Node::new_boxed(root.key)));
        tree.root = Link(Some(new_root));
        tree.len = self.len;

        let mut stack = vec![(root, new_root)];
        while let Some((node, mut copy)) = stack.pop() {
            // SAFETY: `copy` was allocated by this clone and only `tree` references it. No other
            // borrow of it is alive.
            let copy_mut = unsafe { copy.as_mut() };
            if let Some(left) = node.left() {
                let new_left = Node::new_child(left.key, copy);
                copy_mut.left = Link(Some(new_left));
                stack.push((left, new_left));
            }
            if let Some(right) = node.right() {
                let new_right = Node::new_child(right.key, copy);
                copy_mut.right = Link(Some(new_right));
                stack.push((right, new_right));
            }
        }

        tree
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("len", &self.len)
            .field("nodes", &DebugNodes(self))
            .finish()
    }
}

/// Lists the nodes of a tree in pre-order without recursing.
struct DebugNodes<'a>(&'a Tree);

impl fmt::Debug for DebugNodes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.nodes()).finish()
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = i32;
    type IntoIter = Keys<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.in_order()
    }
}

impl Tree {
    /// Generate a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            root: Link(None),
            len: 0,
            marker: PhantomData,
        }
    }

    /// The root of the tree, or `None` when the tree is empty.
    pub fn root(&self) -> Option<&Node> {
        self.root.node()
    }

    /// How many nodes are in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.root.0.is_none()
    }

    /// Descends from the root looking for `key`. If a node holds `key` it is returned. Otherwise
    /// the last node visited is returned - the node that would become the parent of `key` if it
    /// were inserted. Only an empty tree returns `None`.
    ///
    /// Compare the returned node's key with `key` (or use [`Tree::contains`]) to test membership.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst::Tree;
    ///
    /// let mut tree = Tree::new();
    /// assert!(tree.find(7).is_none());
    ///
    /// tree.insert(5);
    /// tree.insert(8);
    ///
    /// assert_eq!(tree.find(8).map(|n| n.key()), Some(8));
    /// // A miss gives back the would-be parent.
    /// assert_eq!(tree.find(7).map(|n| n.key()), Some(8));
    /// ```
    pub fn find(&self, key: i32) -> Option<&Node> {
        self.root.probe(key).map(|ptr| self.node(ptr))
    }

    /// Whether some node holds exactly `key`.
    pub fn contains(&self, key: i32) -> bool {
        self.find(key).map_or(false, |node| node.key == key)
    }

    /// Inserts `key` and returns the newly created node (which is only the root when the tree
    /// was empty). Inserting a key that is already present adds another node for it.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst::Tree;
    ///
    /// let mut tree = Tree::new();
    /// assert!(tree.insert(5).is_root());
    ///
    /// let three = tree.insert(3);
    /// assert_eq!(three.parent().map(|n| n.key()), Some(5));
    /// assert_eq!(three.depth(), 1);
    /// ```
    pub fn insert(&mut self, key: i32) -> &Node {
        let parent = self.insertion_point(key);

        let mut new_node = Node::new_boxed(key);
        new_node.parent = Link(parent);
        let new_node = NonNull::from(Box::leak(new_node));

        match parent {
            None => {
                trace!("inserting {} as the root", key);
                self.root = Link(Some(new_node));
            }
            Some(mut parent) => {
                // SAFETY: `parent` is owned by this tree and we hold `&mut self` so nothing else
                // references it.
                let parent = unsafe { parent.as_mut() };
                if key <= parent.key {
                    trace!("inserting {} left of {}", key, parent.key);
                    debug_assert!(parent.left.0.is_none(), "Insertion point has a left child");
                    parent.left = Link(Some(new_node));
                } else {
                    trace!("inserting {} right of {}", key, parent.key);
                    debug_assert!(parent.right.0.is_none(), "Insertion point has a right child");
                    parent.right = Link(Some(new_node));
                }
                parent.assert_ordered();
            }
        }
        self.len += 1;

        self.node(new_node)
    }

    /// Finds the node holding the next key in sorted order after `key`. Returns `None` when `key`
    /// isn't in the tree or when it is the largest key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst::Tree;
    ///
    /// let mut tree = Tree::new();
    /// for key in [5, 3, 8, 4] {
    ///     tree.insert(key);
    /// }
    ///
    /// assert_eq!(tree.get_next(3).map(|n| n.key()), Some(4));
    /// assert_eq!(tree.get_next(4).map(|n| n.key()), Some(5));
    /// assert!(tree.get_next(8).is_none());
    /// assert!(tree.get_next(6).is_none());
    /// ```
    pub fn get_next(&self, key: i32) -> Option<&Node> {
        let node = self.find(key).filter(|node| node.key == key)?;
        match node.right() {
            Some(right) => Some(right.leftmost()),
            None => node.right_ancestor(),
        }
    }

    /// Deletes the first node found holding `key` and returns the root of the tree afterwards.
    /// If no node holds `key` nothing happens and the current root is returned.
    ///
    /// A node with two children isn't freed. Instead its in-order successor is removed from the
    /// right subtree and the successor's key is written into the node.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(5);
    /// tree.insert(3);
    ///
    /// // Deleting the root splices its only child in.
    /// let root = tree.delete(5);
    /// assert_eq!(root.map(|n| n.key()), Some(3));
    ///
    /// // Deleting a missing key changes nothing.
    /// assert_eq!(tree.delete(42).map(|n| n.key()), Some(3));
    ///
    /// assert!(tree.delete(3).is_none());
    /// ```
    pub fn delete(&mut self, key: i32) -> Option<&Node> {
        let Some(target) = self.root.probe(key).filter(|ptr| self.node(*ptr).key == key) else {
            debug!("{} is not in the tree, nothing to delete", key);
            return self.root();
        };

        self.remove(target);
        self.len -= 1;

        self.root()
    }

    /// The height of the whole tree. See [`Node::height`].
    pub fn height(&self) -> usize {
        height(self.root())
    }

    /// How many nodes hang below the root. See [`Node::num_descendants`].
    pub fn num_descendants(&self) -> usize {
        num_descendants(self.root())
    }

    /// A lazy traversal of the keys in the given order.
    pub fn traverse(&self, order: Order) -> Keys<'_> {
        Keys::new(self.root(), order)
    }

    /// The keys in sorted (left, node, right) order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst::Tree;
    ///
    /// let mut tree = Tree::new();
    /// for key in [5, 3, 8, 1, 4, 7, 9] {
    ///     tree.insert(key);
    /// }
    ///
    /// assert_eq!(tree.in_order().collect::<Vec<_>>(), [1, 3, 4, 5, 7, 8, 9]);
    /// assert_eq!(tree.pre_order().collect::<Vec<_>>(), [5, 3, 1, 4, 8, 7, 9]);
    /// assert_eq!(tree.post_order().collect::<Vec<_>>(), [1, 4, 3, 7, 9, 8, 5]);
    /// ```
    pub fn in_order(&self) -> Keys<'_> {
        self.traverse(Order::In)
    }

    /// The keys in (node, left, right) order.
    pub fn pre_order(&self) -> Keys<'_> {
        self.traverse(Order::Pre)
    }

    /// The keys in (left, right, node) order.
    pub fn post_order(&self) -> Keys<'_> {
        self.traverse(Order::Post)
    }

    /// Writes the keys in the given order to `writer`, one decimal key per line.
    pub fn write_keys<W: io::Write>(&self, order: Order, mut writer: W) -> io::Result<()> {
        for key in self.traverse(order) {
            writeln!(writer, "{}", key)?;
        }

        Ok(())
    }

    /// Prints the keys in the given order to stdout, one per line. This is a debugging aid and
    /// the output format isn't stable.
    pub fn print(&self, order: Order) {
        let stdout = io::stdout();
        if let Err(e) = self.write_keys(order, stdout.lock()) {
            debug!("failed to print {:?} traversal: {}", order, e);
        }
    }

    /// Prints the keys in sorted order. See [`Tree::print`].
    pub fn print_in_order(&self) {
        self.print(Order::In);
    }

    /// Prints the keys in pre-order. See [`Tree::print`].
    pub fn print_pre_order(&self) {
        self.print(Order::Pre);
    }

    /// Prints the keys in post-order. See [`Tree::print`].
    pub fn print_post_order(&self) {
        self.print(Order::Post);
    }

    /// Where a new node for `key` gets attached. This is the `find` probe, except that on an
    /// exact match the probe keeps descending into the left subtree so equal keys never
    /// overwrite an existing child.
    fn insertion_point(&self, key: i32) -> Option<NonNull<Node>> {
        let mut parent = self.root.probe(key)?;
        loop {
            let node = self.node(parent);
            match node.left.0 {
                Some(left) if node.key == key => {
                    parent = Link(Some(left)).probe(key).expect("Probing a node finds a node");
                }
                _ => return Some(parent),
            }
        }
    }

    /// Removes `target` from the tree. A node with two children keeps its place and takes its
    /// successor's key; the first node holding that key in its right subtree is removed the same
    /// way, so this descends until it reaches a node it can unlink.
    fn remove(&mut self, mut target: NonNull<Node>) {
        let mut promoted = Vec::new();
        loop {
            let node = self.node(target);
            match (node.left.0, node.right.0) {
                (Some(_), Some(right)) => {
                    let right = Link(Some(right));
                    let successor = right.leftmost().expect("Right child implies a leftmost node");
                    let successor_key = self.node(successor).key;
                    trace!("deleting {} by pulling up successor {}", node.key, successor_key);

                    promoted.push((target, successor_key));
                    target = right
                        .probe(successor_key)
                        .expect("Probing a node finds a node");
                    debug_assert_eq!(self.node(target).key, successor_key);
                }
                (None, None) => {
                    trace!("deleting leaf {}", node.key);
                    self.unlink(target);
                    break;
                }
                _ => {
                    trace!("deleting {} by splicing in its only child", node.key);
                    self.unlink(target);
                    break;
                }
            }
        }

        // Keys are written after the unlink, innermost first.
        for (node, key) in promoted.into_iter().rev() {
            // SAFETY: Only the last `target` was freed and it never appears in `promoted`. We
            // hold `&mut self` so nothing else references these nodes.
            unsafe { (*node.as_ptr()).key = key };
        }
    }

    /// Every node in pre-order, walked with an explicit stack.
    fn nodes(&self) -> impl Iterator<Item = &Node> {
        let mut stack: Vec<&Node> = self.root().into_iter().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.right());
            stack.extend(node.left());
            Some(node)
        })
    }

    /// Splices `target`, which must have at most one child, out of the tree and frees it. Its
    /// child (if any) takes its place under its parent, or becomes the root.
    fn unlink(&mut self, target: NonNull<Node>) {
        // SAFETY: `target` is owned by this tree and was allocated with `Box::new` in
        // `Node::new_boxed`. Every link to it is overwritten below and we hold `&mut self` so
        // nothing can reach it after this.
        let node = unsafe { Box::from_raw(target.as_ptr()) };
        assert!(
            node.left.0.is_none() || node.right.0.is_none(),
            "Only nodes with at most one child can be unlinked"
        );
        let child = if node.left.0.is_some() { node.left } else { node.right };

        if let Some(mut child) = child.0 {
            // SAFETY: The child is owned by this tree and is not `target`.
            unsafe { child.as_mut().parent = node.parent };
        }

        match node.parent.0 {
            None => {
                trace!("{} was the root", node.key);
                self.root = child;
            }
            Some(mut parent) => {
                // SAFETY: The parent is owned by this tree and is not `target`.
                let parent = unsafe { parent.as_mut() };
                if parent.left.0 == Some(target) {
                    parent.left = child;
                } else {
                    parent.right = child;
                }
                parent.assert_ordered();
            }
        }
    }

    /// Borrows a node owned by this tree for as long as the tree is borrowed.
    fn node(&self, ptr: NonNull<Node>) -> &Node {
        // SAFETY: Only pointers to nodes owned by this tree are passed in. Nodes are only freed
        // through `&mut self` so the node outlives the returned reference.
        unsafe { ptr.as_ref() }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct Link(Option<NonNull<Node>>);

impl Link {
    fn node(&self) -> Option<&Node> {
        // SAFETY: If the link is not `None` then it points at a live `Node` owned by the same
        // tree as the owner of this link. Nodes are only freed through `&mut Tree` so no shared
        // borrow of the tree (and therefore of this link) can see a freed node.
        unsafe { self.0.as_ref().map(|ptr| ptr.as_ref()) }
    }

    fn take(&mut self) -> Self {
        Link(self.0.take())
    }

    /// Descends from this link towards `key`, returning the matching node or the last node
    /// visited. `None` only when the link itself is empty.
    fn probe(self, key: i32) -> Option<NonNull<Node>> {
        let mut current = self.0?;
        loop {
            // SAFETY: See `Link::node`.
            let node = unsafe { current.as_ref() };
            let next = match key.cmp(&node.key) {
                Ordering::Equal => return Some(current),
                Ordering::Less => node.left.0,
                Ordering::Greater => node.right.0,
            };
            match next {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    /// The node reached by following left links from this link.
    fn leftmost(self) -> Option<NonNull<Node>> {
        let mut current = self.0?;
        // SAFETY: See `Link::node`.
        while let Some(left) = unsafe { current.as_ref() }.left.0 {
            current = left;
        }

        Some(current)
    }
}

/// A single key in a [`Tree`]. Nodes are only ever handed out as borrows of their tree.
pub struct Node {
    key: i32,
    // Non-owning. Only used to walk upwards, never to free.
    parent: Link,
    left: Link,
    right: Link,
}

impl fmt::Debug for Node {
    // Neighbours are shown by key so formatting never walks the tree.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("parent", &self.parent().map(Node::key))
            .field("left", &self.left().map(Node::key))
            .field("right", &self.right().map(Node::key))
            .finish()
    }
}

impl Node {
    fn new_boxed(key: i32) -> Box<Self> {
        Box::new(Node {
            key,
            parent: Link(None),
            left: Link(None),
            right: Link(None),
        })
    }

    /// Allocates a node hanging from `parent`. The caller links it into `parent`.
    fn new_child(key: i32, parent: NonNull<Node>) -> NonNull<Node> {
        let mut node = Self::new_boxed(key);
        node.parent = Link(Some(parent));
        NonNull::from(Box::leak(node))
    }

    /// The key stored in this node.
    pub fn key(&self) -> i32 {
        self.key
    }

    /// The node this node hangs from. `None` for the root.
    pub fn parent(&self) -> Option<&Node> {
        self.parent.node()
    }

    /// The left child.
    pub fn left(&self) -> Option<&Node> {
        self.left.node()
    }

    /// The right child.
    pub fn right(&self) -> Option<&Node> {
        self.right.node()
    }

    /// How many children (0, 1, or 2) this node has.
    pub fn num_children(&self) -> usize {
        usize::from(self.left.0.is_some()) + usize::from(self.right.0.is_some())
    }

    /// How many nodes are in the subtree below this node, not counting the node itself.
    pub fn num_descendants(&self) -> usize {
        Keys::new(Some(self), Order::Pre).count() - 1
    }

    /// Whether this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.0.is_none()
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.num_children() == 0
    }

    /// The number of edges on the longest path from this node down to a leaf. A leaf has a
    /// height of 0.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = vec![(self, 0)];
        while let Some((node, level)) = stack.pop() {
            height = height.max(level);
            stack.extend(node.left().map(|left| (left, level + 1)));
            stack.extend(node.right().map(|right| (right, level + 1)));
        }

        height
    }

    /// The number of edges between this node and the root. The root has a depth of 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Some(parent) = current.parent() {
            depth += 1;
            current = parent;
        }

        depth
    }

    /// The smallest node in this subtree.
    fn leftmost(&self) -> &Node {
        let mut current = self;
        while let Some(left) = current.left() {
            current = left;
        }

        current
    }

    /// The closest ancestor holding a key greater than the key of the node below it on the
    /// path. This is the successor of a node without a right subtree.
    fn right_ancestor(&self) -> Option<&Node> {
        let mut current = self;
        loop {
            let parent = current.parent()?;
            if current.key < parent.key {
                return Some(parent);
            }
            current = parent;
        }
    }

    /// Checks this node against its children in debug builds.
    fn assert_ordered(&self) {
        if cfg!(debug_assertions) {
            if let Some(left) = self.left() {
                assert!(left.key <= self.key);
                assert_eq!(left.parent.0, Some(NonNull::from(self)));
            }
            if let Some(right) = self.right() {
                assert!(right.key >= self.key);
                assert_eq!(right.parent.0, Some(NonNull::from(self)));
            }
        }
    }
}

/// How many children `node` has. `None` has no children.
pub fn num_children(node: Option<&Node>) -> usize {
    node.map_or(0, Node::num_children)
}

/// How many nodes are below `node`. `None` has no descendants.
pub fn num_descendants(node: Option<&Node>) -> usize {
    node.map_or(0, Node::num_descendants)
}

/// Whether `node` exists and has no parent.
pub fn is_root(node: Option<&Node>) -> bool {
    node.map_or(false, Node::is_root)
}

/// Whether `node` has no children. `None` counts as a leaf.
pub fn is_leaf(node: Option<&Node>) -> bool {
    num_children(node) == 0
}

/// The height of `node`. `None` has a height of 0.
pub fn height(node: Option<&Node>) -> usize {
    node.map_or(0, Node::height)
}

/// The depth of `node`. `None` has a depth of 0.
pub fn depth(node: Option<&Node>) -> usize {
    node.map_or(0, Node::depth)
}
