use bst::{Node, Tree};
use quickcheck_macros::quickcheck;

use std::collections::BTreeMap;

use crate::Op;

/// Applies a set of operations to a tree and a multiset of keys.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same keys, duplicates included.
fn do_ops(ops: &[Op<i8>], mut bst: Tree, counts: &mut BTreeMap<i32, usize>) -> Tree {
    for op in ops {
        match op {
            Op::Insert(k) => {
                let k = i32::from(*k);
                bst.insert(k);
                *counts.entry(k).or_default() += 1;
            }
            Op::Remove(k) => {
                let k = i32::from(*k);
                bst.delete(k);
                if let Some(count) = counts.get_mut(&k) {
                    *count -= 1;
                    if *count == 0 {
                        counts.remove(&k);
                    }
                }
            }
        }
    }

    bst
}

fn tree_from(xs: &[i8]) -> Tree {
    let mut tree = Tree::new();
    for x in xs {
        tree.insert(i32::from(*x));
    }

    tree
}

/// Every node in the tree, root first.
fn nodes(tree: &Tree) -> Vec<&Node> {
    let mut nodes = Vec::new();
    let mut stack: Vec<&Node> = tree.root().into_iter().collect();
    while let Some(node) = stack.pop() {
        nodes.push(node);
        stack.extend(node.right());
        stack.extend(node.left());
    }

    nodes
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut counts = BTreeMap::new();

    let tree = do_ops(&ops, Tree::new(), &mut counts);
    let expected = counts
        .iter()
        .flat_map(|(key, count)| std::iter::repeat(*key).take(*count));

    tree.in_order().eq(expected)
        && counts.keys().all(|key| tree.contains(*key))
        && tree.len() == counts.values().sum::<usize>()
}

#[quickcheck]
fn in_order_is_sorted(xs: Vec<i8>) -> bool {
    let tree = tree_from(&xs);

    let mut sorted = xs.iter().map(|x| i32::from(*x)).collect::<Vec<_>>();
    sorted.sort_unstable();

    tree.in_order().eq(sorted)
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree = tree_from(&xs);

    nots.iter()
        .filter(|x| !xs.contains(*x))
        .all(|x| !tree.contains(i32::from(*x)))
}

#[quickcheck]
fn delete_removes_exactly_one_node(xs: Vec<i8>, delete: i8) -> bool {
    let mut tree = tree_from(&xs);
    // Make sure the key is there at least once, and only once.
    let key = i32::from(delete);
    if !tree.contains(key) {
        tree.insert(key);
    }
    while tree.in_order().filter(|k| *k == key).count() > 1 {
        tree.delete(key);
    }

    let len = tree.len();
    let descendants = tree.num_descendants();
    tree.delete(key);

    let descendants_dropped = if len > 1 {
        tree.num_descendants() == descendants - 1
    } else {
        tree.root().is_none()
    };
    !tree.contains(key) && tree.len() == len - 1 && descendants_dropped
}

#[quickcheck]
fn deleting_a_missing_key_changes_nothing(xs: Vec<i8>, missing: i8) -> bool {
    if xs.contains(&missing) {
        return true;
    }
    let mut tree = tree_from(&xs);
    let before = tree.pre_order().collect::<Vec<_>>();

    let root = tree.delete(i32::from(missing)).map(Node::key);

    root == before.first().copied() && tree.pre_order().eq(before)
}

#[quickcheck]
fn height_bounds_depth(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree = tree_from(&xs);
    for delete in &deletes {
        tree.delete(i32::from(*delete));
    }

    let height = tree.height();
    nodes(&tree).iter().all(|node| node.depth() <= height)
        && nodes(&tree).iter().any(|node| node.depth() == height) == !tree.is_empty()
}

#[quickcheck]
fn leaf_means_no_children(xs: Vec<i8>) -> bool {
    let tree = tree_from(&xs);

    nodes(&tree)
        .iter()
        .all(|node| node.is_leaf() == (node.num_children() == 0))
}

#[quickcheck]
fn only_the_root_is_a_root(xs: Vec<i8>) -> bool {
    let tree = tree_from(&xs);

    nodes(&tree)
        .iter()
        .enumerate()
        .all(|(i, node)| node.is_root() == (i == 0))
}

#[quickcheck]
fn get_next_matches_sorted_order(xs: Vec<i8>) -> bool {
    let tree = tree_from(&xs);

    let mut unique = xs.iter().map(|x| i32::from(*x)).collect::<Vec<_>>();
    unique.sort_unstable();
    unique.dedup();

    unique.iter().enumerate().all(|(i, key)| {
        tree.get_next(*key).map(Node::key) == unique.get(i + 1).copied()
    })
}

#[quickcheck]
fn clone_keeps_shape(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree = tree_from(&xs);
    for delete in &deletes {
        tree.delete(i32::from(*delete));
    }
    let clone = tree.clone();

    clone.len() == tree.len()
        && clone.pre_order().eq(tree.pre_order())
        && clone.post_order().eq(tree.post_order())
}

#[quickcheck]
fn children_stay_ordered(ops: Vec<Op<i8>>) -> bool {
    let tree = do_ops(&ops, Tree::new(), &mut BTreeMap::new());

    let sorted = tree.in_order().zip(tree.in_order().skip(1)).all(|(a, b)| a <= b);
    sorted
        && nodes(&tree).iter().all(|node| {
            node.left().map_or(true, |left| {
                left.key() <= node.key() && left.parent().map(Node::key) == Some(node.key())
            }) && node.right().map_or(true, |right| {
                right.key() >= node.key() && right.parent().map(Node::key) == Some(node.key())
            })
        })
}

#[quickcheck]
fn right_children_are_greater_without_deletes(xs: Vec<i8>) -> bool {
    let tree = tree_from(&xs);

    nodes(&tree)
        .iter()
        .all(|node| node.right().map_or(true, |right| right.key() > node.key()))
}

#[test]
fn round_trip_in_order() {
    let tree = tree_from(&[5, 3, 8, 1, 4, 7, 9]);

    assert_eq!(tree.in_order().collect::<Vec<_>>(), [1, 3, 4, 5, 7, 8, 9]);
}

#[test]
fn deleting_two_child_root_pulls_up_successor() {
    let mut tree = tree_from(&[5, 3, 8]);

    assert_eq!(tree.delete(5).map(Node::key), Some(8));
    assert_eq!(tree.in_order().collect::<Vec<_>>(), [3, 8]);
}

#[test]
fn get_next_of_maximum_is_none() {
    let tree = tree_from(&[5, 3, 8, 1, 4, 7, 9]);

    assert!(tree.get_next(9).is_none());
}
