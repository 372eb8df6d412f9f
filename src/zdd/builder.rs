//! Top-down frontier construction driven by a [`DdSpec`]. The builder owns
//! a transient `(level, mate) -> NodeId` unique table for the duration of
//! `build`/`build_parallel`; it is dropped once the [`Zdd`] is returned.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::spec::{DdSpec, Transition};
use crate::zdd::{Node, NodeId, Zdd, ACCEPT, REJECT};

/// Below this many remaining levels, parallel construction stops forking
/// new `rayon::join` tasks and falls back to the serial recursion; forking
/// down to single-variable subtrees would spend more on synchronization
/// than the work it parallelizes.
const PARALLEL_FANOUT_FLOOR: usize = 4;

pub struct ZddBuilder<'s, S: DdSpec> {
  spec: &'s S,
  memo: HashMap<(usize, S::Mate), NodeId>,
  nodes: Vec<Node>,
}

impl<'s, S: DdSpec> ZddBuilder<'s, S> {
  pub fn new(spec: &'s S) -> Self {
    ZddBuilder { spec, memo: HashMap::new(), nodes: Vec::new() }
  }

  /// Serial top-down construction.
  pub fn build(mut self) -> Zdd {
    let (level, mate) = self.spec.root();
    let root = self.expand(level, mate);
    Zdd { nodes: self.nodes, root }
  }

  fn expand(&mut self, level: usize, mate: S::Mate) -> NodeId {
    let key = (level, mate.clone());
    if let Some(&id) = self.memo.get(&key) {
      return id;
    }
    let (lo_t, lo_mate) = self.spec.child(&mate, level, false);
    let lo_id = self.resolve(lo_t, lo_mate);
    let (hi_t, hi_mate) = self.spec.child(&mate, level, true);
    let hi_id = self.resolve(hi_t, hi_mate);
    let id = self.finish_node(level, lo_id, hi_id);
    self.memo.insert(key, id);
    id
  }

  fn resolve(&mut self, transition: Transition, mate: S::Mate) -> NodeId {
    match transition {
      Transition::Accept => ACCEPT,
      Transition::Reject => REJECT,
      Transition::Level(next) => self.expand(next, mate),
    }
  }

  fn finish_node(&mut self, level: usize, lo: NodeId, hi: NodeId) -> NodeId {
    if hi == REJECT {
      // Zero-suppression: a node whose `hi` arc rejects contributes nothing
      // that `lo` doesn't already provide.
      return lo;
    }
    let id = (self.nodes.len() as NodeId) + 2;
    self.nodes.push(Node { level, lo, hi });
    id
  }
}

impl<'s, S> ZddBuilder<'s, S>
where
  S: DdSpec + Sync,
  S::Mate: Send,
{
  /// Parallel construction: `lo`/`hi` subtrees fork via `rayon::join` while
  /// enough levels remain to be worth the synchronization, sharing one
  /// `Mutex`-guarded unique table. The *reduced* result does not depend on
  /// which thread wins a given memo cell (see [`crate::zdd::reduce`]), so
  /// this only needs to guarantee each distinct `(level, mate)` gets
  /// exactly one node id, not that ids are assigned in any particular order.
  pub fn build_parallel(spec: &'s S) -> Zdd {
    let state = Mutex::new(ParallelState { memo: HashMap::new(), nodes: Vec::new() });
    let (level, mate) = spec.root();
    let root = expand_parallel(spec, &state, level, mate, spec.num_variables());
    let ParallelState { nodes, .. } = state.into_inner().expect("builder mutex poisoned");
    Zdd { nodes, root }
  }
}

struct ParallelState<M> {
  memo: HashMap<(usize, M), NodeId>,
  nodes: Vec<Node>,
}

fn expand_parallel<S>(spec: &S, state: &Mutex<ParallelState<S::Mate>>, level: usize, mate: S::Mate, levels_left: usize) -> NodeId
where
  S: DdSpec + Sync,
  S::Mate: Send,
{
  {
    let guard = state.lock().expect("builder mutex poisoned");
    if let Some(&id) = guard.memo.get(&(level, mate.clone())) {
      return id;
    }
  }

  let (lo_t, lo_mate) = spec.child(&mate, level, false);
  let (hi_t, hi_mate) = spec.child(&mate, level, true);

  let (lo_id, hi_id) = if levels_left > PARALLEL_FANOUT_FLOOR {
    rayon::join(
      || resolve_parallel(spec, state, lo_t, lo_mate, levels_left - 1),
      || resolve_parallel(spec, state, hi_t, hi_mate, levels_left - 1),
    )
  } else {
    (
      resolve_parallel(spec, state, lo_t, lo_mate, levels_left.saturating_sub(1)),
      resolve_parallel(spec, state, hi_t, hi_mate, levels_left.saturating_sub(1)),
    )
  };

  let mut guard = state.lock().expect("builder mutex poisoned");
  let key = (level, mate);
  if let Some(&id) = guard.memo.get(&key) {
    return id;
  }
  let id = if hi_id == REJECT {
    lo_id
  } else {
    let id = (guard.nodes.len() as NodeId) + 2;
    guard.nodes.push(Node { level, lo: lo_id, hi: hi_id });
    id
  };
  guard.memo.insert(key, id);
  id
}

fn resolve_parallel<S>(spec: &S, state: &Mutex<ParallelState<S::Mate>>, transition: Transition, mate: S::Mate, levels_left: usize) -> NodeId
where
  S: DdSpec + Sync,
  S::Mate: Send,
{
  match transition {
    Transition::Accept => ACCEPT,
    Transition::Reject => REJECT,
    Transition::Level(next) => expand_parallel(spec, state, next, mate, levels_left),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::encode::Encoder;
  use crate::params::{ParameterStoreBuilder, SlaMode};
  use crate::spec::PlacementSpec;

  fn one_dc_one_tier() -> crate::params::ParameterStore {
    let mut b = ParameterStoreBuilder::new();
    b.add_storage_tier("DC1", "ST1_1").unwrap();
    b.set_size("DC1", 1.0).unwrap();
    b.set_get_request("DC1", 1.0).unwrap();
    b.set_put_request("DC1", 1.0).unwrap();
    b.set_storage_cost("DC1", "ST1_1", 0.1).unwrap();
    b.set_get_cost("DC1", "ST1_1", 0.1).unwrap();
    b.set_put_cost("DC1", "ST1_1", 0.1).unwrap();
    b.set_retrieve_cost("DC1", "ST1_1", 0.1).unwrap();
    b.set_write_cost("DC1", "ST1_1", 0.1).unwrap();
    b.set_get_latency("DC1", "ST1_1", 0.1).unwrap();
    b.set_put_latency("DC1", "ST1_1", 0.1).unwrap();
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
  fn build_produces_a_nonempty_zdd_with_a_solution() {
    let store = one_dc_one_tier();
    let enc = Encoder::new(&store);
    let spec = PlacementSpec::new(&store, &enc, SlaMode::Eventual);
    let zdd = ZddBuilder::new(&spec).build();
    assert_ne!(zdd.root, REJECT, "a single DC with LC=1 has at least one feasible placement");
  }

  #[test]
  fn serial_and_parallel_builds_agree_on_root_emptiness() {
    let store = one_dc_one_tier();
    let enc = Encoder::new(&store);
    let spec = PlacementSpec::new(&store, &enc, SlaMode::Eventual);
    let serial = ZddBuilder::new(&spec).build();
    let parallel = ZddBuilder::build_parallel(&spec);
    assert_eq!(serial.is_empty(), parallel.is_empty());
  }
}
