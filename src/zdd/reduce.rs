//! Canonicalization (C5): a memoized post-order DFS that re-hashes every
//! node under its final `(level, lo, hi)` triple, merging duplicates and
//! re-applying zero-suppression. Required even though the builder already
//! zero-suppresses once: a node whose children were distinct during
//! construction can still end up with `hi == REJECT` after its own
//! children are reduced.

use std::collections::HashMap;

use crate::zdd::{Node, NodeId, Zdd, ACCEPT, REJECT};

struct Reducer<'z> {
  source: &'z Zdd,
  visited: HashMap<NodeId, NodeId>,
  dedup: HashMap<(usize, NodeId, NodeId), NodeId>,
  nodes: Vec<Node>,
}

impl<'z> Reducer<'z> {
  fn visit(&mut self, old: NodeId) -> NodeId {
    if old == REJECT || old == ACCEPT {
      return old;
    }
    if let Some(&new) = self.visited.get(&old) {
      return new;
    }
    let node = *self.source.node(old).expect("dangling node id in source ZDD");
    let lo = self.visit(node.lo);
    let hi = self.visit(node.hi);
    let new_id = if hi == REJECT {
      lo
    } else {
      let key = (node.level, lo, hi);
      *self.dedup.entry(key).or_insert_with(|| {
        let id = (self.nodes.len() as NodeId) + 2;
        self.nodes.push(Node { level: node.level, lo, hi });
        id
      })
    };
    self.visited.insert(old, new_id);
    new_id
  }
}

pub fn reduce(zdd: &Zdd) -> Zdd {
  let mut r = Reducer { source: zdd, visited: HashMap::new(), dedup: HashMap::new(), nodes: Vec::new() };
  let root = r.visit(zdd.root);
  Zdd { nodes: r.nodes, root }
}
