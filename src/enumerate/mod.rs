//! Weighted Enumerator (C7): yields placements from a reduced ZDD in
//! nondecreasing cost order, one subset per `next()` call, via Knuth TAOCP
//! 7.1.4 Algorithm B adapted for zero-suppression. Each call finds the
//! current minimum-cost path, then destructively subtracts it (symbolic
//! ZDD difference) from a private owned copy so the next call sees the
//! remaining family.

use std::collections::HashMap;

use crate::encode::Encoder;
use crate::eval::Placement;
use crate::params::ParameterStore;
use crate::zdd::{Node, NodeId, Zdd, ACCEPT, REJECT};

pub struct WeightedEnumerator<'p> {
  zdd: Zdd,
  weights: Vec<f64>,
  encoder: &'p Encoder<'p>,
  params: &'p ParameterStore,
}

impl<'p> WeightedEnumerator<'p> {
  /// Takes ownership of a reduced ZDD; the original the caller built is
  /// left untouched (callers pass a clone if they still need it).
  pub fn new(zdd: Zdd, encoder: &'p Encoder<'p>, params: &'p ParameterStore) -> Self {
    let weights = encoder.cost_vector().iter().map(|c| -c).collect();
    WeightedEnumerator { zdd, weights, encoder, params }
  }
}

fn resolve_best(id: NodeId, best: &[f64]) -> f64 {
  match id {
    REJECT => f64::NEG_INFINITY,
    ACCEPT => 0.0,
    _ => best[(id - 2) as usize],
  }
}

impl<'p> Iterator for WeightedEnumerator<'p> {
  type Item = (f64, Placement);

  fn next(&mut self) -> Option<Self::Item> {
    if self.zdd.is_empty() {
      return None;
    }
    if self.zdd.root == ACCEPT {
      self.zdd = Zdd::empty();
      return Some((0.0, Placement::default()));
    }

    // sort_zdd + Algorithm B: nodes are already stored in bottom-up
    // topological order (see crate::zdd::builder), so one forward pass
    // over `self.zdd.nodes` visits every child before its parent.
    let mut best = vec![0.0f64; self.zdd.num_nodes()];
    let mut choose = vec![false; self.zdd.num_nodes()];
    for (i, node) in self.zdd.nodes.iter().enumerate() {
      let best_lo = resolve_best(node.lo, &best);
      let best_hi = resolve_best(node.hi, &best) + self.weights[node.level - 1];
      if best_lo >= best_hi {
        best[i] = best_lo;
        choose[i] = false;
      } else {
        best[i] = best_hi;
        choose[i] = true;
      }
    }

    let mut placement = Placement::default();
    let mut chosen: HashMap<NodeId, bool> = HashMap::new();
    let mut current = self.zdd.root;
    while current >= 2 {
      let idx = (current - 2) as usize;
      let take_hi = choose[idx];
      chosen.insert(current, take_hi);
      let node = self.zdd.nodes[idx];
      if take_hi {
        placement.record(self.encoder.level_kind(node.level), self.params);
      }
      current = if take_hi { node.hi } else { node.lo };
    }
    let total_cost = -resolve_best(self.zdd.root, &best);

    let mut subtractor = Subtractor {
      source: &self.zdd,
      chosen,
      copy_memo: HashMap::new(),
      dedup: HashMap::new(),
      nodes: Vec::new(),
    };
    let new_root = subtractor.subtract_path(self.zdd.root);
    let new_nodes = subtractor.nodes;
    self.zdd = Zdd { nodes: new_nodes, root: new_root };

    Some((total_cost, placement))
  }
}

/// Rebuilds the private ZDD with exactly one combination (the path picked
/// out by `chosen`) removed. Off-path subtrees are copied verbatim
/// (re-hashed and re-deduplicated under their new ids, mirroring
/// [`crate::zdd::reduce`]); on-path nodes have their followed child
/// replaced by the result of recursing further down the path, and the
/// final step, reaching `ACCEPT`, becomes `REJECT`, since that terminal
/// represented exactly the one combination being removed.
struct Subtractor<'z> {
  source: &'z Zdd,
  chosen: HashMap<NodeId, bool>,
  copy_memo: HashMap<NodeId, NodeId>,
  dedup: HashMap<(usize, NodeId, NodeId), NodeId>,
  nodes: Vec<Node>,
}

impl<'z> Subtractor<'z> {
  fn make(&mut self, level: usize, lo: NodeId, hi: NodeId) -> NodeId {
    if hi == REJECT {
      return lo;
    }
    let key = (level, lo, hi);
    if let Some(&id) = self.dedup.get(&key) {
      return id;
    }
    let id = (self.nodes.len() as NodeId) + 2;
    self.nodes.push(Node { level, lo, hi });
    self.dedup.insert(key, id);
    id
  }

  fn copy(&mut self, old: NodeId) -> NodeId {
    if old < 2 {
      return old;
    }
    if let Some(&id) = self.copy_memo.get(&old) {
      return id;
    }
    let node = *self.source.node(old).expect("dangling node id while copying");
    let lo = self.copy(node.lo);
    let hi = self.copy(node.hi);
    let id = self.make(node.level, lo, hi);
    self.copy_memo.insert(old, id);
    id
  }

  fn subtract_path(&mut self, old: NodeId) -> NodeId {
    if old == ACCEPT || old == REJECT {
      return REJECT;
    }
    let node = *self.source.node(old).expect("dangling node id on chosen path");
    let take_hi = self.chosen[&old];
    let (lo, hi) = if take_hi {
      (self.copy(node.lo), self.subtract_path(node.hi))
    } else {
      (self.subtract_path(node.lo), self.copy(node.hi))
    };
    self.make(node.level, lo, hi)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::params::{ParameterStoreBuilder, SlaMode};
  use crate::spec::PlacementSpec;
  use crate::zdd::{builder::ZddBuilder, reduce};
  use num_bigint::BigUint;

  fn two_tier_single_dc() -> crate::params::ParameterStore {
    let mut b = ParameterStoreBuilder::new();
    b.add_storage_tier("DC1", "ST1_1").unwrap();
    b.add_storage_tier("DC1", "ST1_2").unwrap();
    b.set_size("DC1", 1.0).unwrap();
    b.set_get_request("DC1", 0.0).unwrap();
    b.set_put_request("DC1", 0.0).unwrap();
    for tier in ["ST1_1", "ST1_2"] {
      b.set_storage_cost("DC1", tier, if tier == "ST1_1" { 0.1 } else { 0.5 }).unwrap();
      b.set_get_cost("DC1", tier, 0.0).unwrap();
      b.set_put_cost("DC1", tier, 0.0).unwrap();
      b.set_retrieve_cost("DC1", tier, 0.0).unwrap();
      b.set_write_cost("DC1", tier, 0.0).unwrap();
      b.set_get_latency("DC1", tier, 0.0).unwrap();
      b.set_put_latency("DC1", tier, 0.0).unwrap();
    }
    b.set_network_cost("DC1", "DC1", 0.0).unwrap();
    b.set_network_latency("DC1", "DC1", 0.0).unwrap();
    b.set_center("DC1").unwrap();
    b.set_sla_get(10.0).unwrap();
    b.set_sla_put(10.0).unwrap();
    b.set_lc(1).unwrap();
    b.set_f(0).unwrap();
    b.build().unwrap()
  }

  #[test]
  fn enumerator_yields_costs_in_nondecreasing_order_and_then_exhausts() {
    let store = two_tier_single_dc();
    let enc = Encoder::new(&store);
    let spec = PlacementSpec::new(&store, &enc, SlaMode::Eventual);
    let reduced = reduce(&ZddBuilder::new(&spec).build());
    let expected_count = crate::eval::cardinality(&reduced);

    let mut enumerator = WeightedEnumerator::new(reduced, &enc, &store);
    let mut last = f64::NEG_INFINITY;
    let mut seen = BigUint::from(0u32);
    while let Some((cost, _placement)) = enumerator.next() {
      assert!(cost + 1e-9 >= last, "costs must be nondecreasing: {} then {}", last, cost);
      last = cost;
      seen += BigUint::from(1u32);
    }
    assert_eq!(seen, expected_count, "enumerator must exhaust exactly the cardinality's worth of solutions");
    assert!(enumerator.next().is_none(), "exhausted enumerator must keep returning None");
  }
}
