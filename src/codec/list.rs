//! Flat array encoding for singly-linked lists, arena-backed.

/// One node; `next` is an index into the owning arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub val: i64,
    pub next: Option<usize>,
}

/// Index-linked list storage. An empty arena is the empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArena {
    pub nodes: Vec<Node>,
    pub head: Option<usize>,
}

/// Build a list from its flat array encoding (node values in link order).
pub fn decode(values: &[i64]) -> ListArena {
    let nodes: Vec<Node> = values
        .iter()
        .enumerate()
        .map(|(i, &val)| Node {
            val,
            next: (i + 1 < values.len()).then_some(i + 1),
        })
        .collect();
    ListArena {
        head: (!nodes.is_empty()).then_some(0),
        nodes,
    }
}

/// Walk the links and emit values in order; exact inverse of [`decode`].
pub fn encode(arena: &ListArena) -> Vec<i64> {
    let mut out = Vec::with_capacity(arena.nodes.len());
    let mut cursor = arena.head;
    while let Some(idx) = cursor {
        let node = &arena.nodes[idx];
        out.push(node.val);
        cursor = node.next;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn empty_round_trips() {
        let arena = decode(&[]);
        assert_eq!(arena.head, None);
        assert_eq!(encode(&arena), Vec::<i64>::new());
    }

    #[test]
    fn links_follow_value_order() {
        let arena = decode(&[5, -1, 9]);
        assert_eq!(arena.head, Some(0));
        assert_eq!(arena.nodes[0].next, Some(1));
        assert_eq!(arena.nodes[2].next, None);
        assert_eq!(encode(&arena), vec![5, -1, 9]);
    }

    proptest! {
        #[test]
        fn encode_inverts_decode(values in proptest::collection::vec(any::<i64>(), 0..64)) {
            prop_assert_eq!(encode(&decode(&values)), values);
        }
    }
}
