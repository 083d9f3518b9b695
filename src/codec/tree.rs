//! Level-order array encoding for binary trees, arena-backed.
//!
//! Classic breadth-first placement: the first slot is the root, then each
//! queued (non-null) node consumes the next two slots as its left and right
//! children. Null slots consume no further slots. The canonical encoding
//! strips the trailing null run.

use std::collections::VecDeque;

/// One node; children are indices into the owning arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub val: i64,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

/// Index-linked tree storage. An empty arena is the empty tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeArena {
    pub nodes: Vec<Node>,
    pub root: Option<usize>,
}

/// Build a tree from its level-order encoding (`None` marks an absent child).
pub fn decode(levels: &[Option<i64>]) -> TreeArena {
    let mut arena = TreeArena::default();
    let Some(Some(root_val)) = levels.first() else {
        return arena;
    };
    arena.nodes.push(Node {
        val: *root_val,
        left: None,
        right: None,
    });
    arena.root = Some(0);

    let mut queue: VecDeque<usize> = VecDeque::from([0]);
    let mut cursor = 1;
    while let Some(parent) = queue.pop_front() {
        for side in 0..2 {
            if cursor >= levels.len() {
                return arena;
            }
            let slot = levels[cursor];
            cursor += 1;
            if let Some(val) = slot {
                let idx = arena.nodes.len();
                arena.nodes.push(Node {
                    val,
                    left: None,
                    right: None,
                });
                if side == 0 {
                    arena.nodes[parent].left = Some(idx);
                } else {
                    arena.nodes[parent].right = Some(idx);
                }
                queue.push_back(idx);
            }
        }
    }
    arena
}

/// Emit the level-order encoding with the trailing null run stripped;
/// exact inverse of [`decode`] on stripped inputs.
pub fn encode(arena: &TreeArena) -> Vec<Option<i64>> {
    let mut out = Vec::new();
    let Some(root) = arena.root else {
        return out;
    };
    let mut queue: VecDeque<Option<usize>> = VecDeque::from([Some(root)]);
    while let Some(slot) = queue.pop_front() {
        match slot {
            Some(idx) => {
                let node = &arena.nodes[idx];
                out.push(Some(node.val));
                queue.push_back(node.left);
                queue.push_back(node.right);
            }
            None => out.push(None),
        }
    }
    while out.last().is_some_and(Option::is_none) {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn empty_and_null_root_decode_to_empty() {
        assert_eq!(decode(&[]).root, None);
        assert_eq!(decode(&[None]).root, None);
    }

    #[test]
    fn placement_skips_null_slots() {
        // [3,9,20,null,null,15,7]: 9 is a leaf, 20 has two children.
        let levels = [Some(3), Some(9), Some(20), None, None, Some(15), Some(7)];
        let arena = decode(&levels);
        let root = &arena.nodes[arena.root.unwrap()];
        assert_eq!(root.val, 3);
        let left = &arena.nodes[root.left.unwrap()];
        let right = &arena.nodes[root.right.unwrap()];
        assert_eq!((left.val, left.left, left.right), (9, None, None));
        assert_eq!(right.val, 20);
        assert_eq!(encode(&arena), levels);
    }

    #[test]
    fn interior_null_survives_round_trip() {
        let levels = [Some(1), None, Some(2), Some(3)];
        assert_eq!(encode(&decode(&levels)), levels);
    }

    fn stripped_levels() -> impl Strategy<Value = Vec<Option<i64>>> {
        // Level-order arrays as produced by the encoder: a non-null root,
        // child slots only for nodes actually placed, no trailing nulls.
        proptest::collection::vec(any::<i64>(), 0..48).prop_map(|vals| {
            let mut levels: Vec<Option<i64>> = Vec::new();
            let mut open_slots = 1usize;
            for (i, v) in vals.into_iter().enumerate() {
                if open_slots == 0 {
                    break;
                }
                // Drop roughly a third of the slots to exercise null markers.
                if i % 3 == 2 {
                    levels.push(None);
                    open_slots -= 1;
                } else {
                    levels.push(Some(v));
                    open_slots += 1;
                }
            }
            while levels.last().is_some_and(Option::is_none) {
                levels.pop();
            }
            levels
        })
    }

    proptest! {
        #[test]
        fn encode_inverts_decode(levels in stripped_levels()) {
            prop_assert_eq!(encode(&decode(&levels)), levels);
        }
    }
}
