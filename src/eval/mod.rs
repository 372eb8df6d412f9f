//! Evaluators (C6): bottom-up folds over a reduced ZDD, computing cardinality,
//! the minimum-cost placement and its witness ("GetConfig"), and the
//! per-level cost vector the weighted enumerator uses as its weights.

use std::collections::BTreeMap;

use num_bigint::BigUint;

use crate::encode::{Encoder, VarKind};
use crate::params::ParameterStore;
use crate::zdd::{NodeId, Zdd, ACCEPT, REJECT};

/// A candidate solution: the set of placed tiers and, per data center, its
/// target locale list. Mirrors the original's `map<string, vector<string>>`
/// "TLL", split into a dedicated field for the distinguished
/// `"storageTiers"` key so callers don't need to special-case it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
  pub storage_tiers: Vec<String>,
  pub locales: BTreeMap<String, Vec<String>>,
}

impl Placement {
  pub(crate) fn record(&mut self, kind: VarKind, params: &ParameterStore) {
    match kind {
      VarKind::P { t } => {
        let k = params.dc_of(t);
        self.storage_tiers.push(entry_label(params, k, t));
      }
      VarKind::T { t, j } => {
        let k = params.dc_of(t);
        self.locales.entry(params.dc_name(j).to_string()).or_default().push(entry_label(params, k, t));
      }
      VarKind::B { .. } => {}
    }
  }
}

fn entry_label(params: &ParameterStore, dc: crate::params::DcIdx, tier: crate::params::TierIdx) -> String {
  format!("{{{}, {}}}", params.dc_name(dc), params.tier_name(tier))
}

/// `ZddCardinality`: terminal `ACCEPT -> 1`, `REJECT -> 0`, internal
/// `v = v(lo) + v(hi)`. Returned as an arbitrary-precision integer since
/// the number of feasible placements can exceed 64 bits.
pub fn cardinality(zdd: &Zdd) -> BigUint {
  let mut values: Vec<BigUint> = Vec::with_capacity(zdd.nodes.len());
  for node in &zdd.nodes {
    let lo = resolve_card(node.lo, &values);
    let hi = resolve_card(node.hi, &values);
    values.push(lo + hi);
  }
  resolve_card(zdd.root, &values)
}

fn resolve_card(id: NodeId, values: &[BigUint]) -> BigUint {
  match id {
    REJECT => BigUint::from(0u32),
    ACCEPT => BigUint::from(1u32),
    _ => values[(id - 2) as usize].clone(),
  }
}

/// `GetConfig`: the minimum-cost placement and its cost, via the same
/// `<=`-biases-to-lo tie-break the original's `evalNode` uses.
pub fn optimal_placement(zdd: &Zdd, encoder: &Encoder, params: &ParameterStore) -> (f64, Placement) {
  let mut values: Vec<(f64, Placement)> = Vec::with_capacity(zdd.nodes.len());
  for node in &zdd.nodes {
    let (lo_cost, lo_place) = resolve_cost(node.lo, &values);
    let (hi_cost, hi_place) = resolve_cost(node.hi, &values);
    let c = encoder.cost_of(node.level);
    let value = if lo_cost <= hi_cost + c {
      (lo_cost, lo_place)
    } else {
      let mut place = hi_place;
      place.record(encoder.level_kind(node.level), params);
      (hi_cost + c, place)
    };
    values.push(value);
  }
  resolve_cost(zdd.root, &values)
}

fn resolve_cost(id: NodeId, values: &[(f64, Placement)]) -> (f64, Placement) {
  match id {
    REJECT => (f64::INFINITY, Placement::default()),
    ACCEPT => (0.0, Placement::default()),
    _ => values[(id - 2) as usize].clone(),
  }
}

/// `costList[level]` for the weighted enumerator.
pub fn cost_vector(encoder: &Encoder) -> Vec<f64> {
  encoder.cost_vector()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::encode::Encoder;
  use crate::params::{ParameterStoreBuilder, SlaMode};
  use crate::spec::PlacementSpec;
  use crate::zdd::{builder::ZddBuilder, reduce};

  fn one_dc_one_tier() -> crate::params::ParameterStore {
    let mut b = ParameterStoreBuilder::new();
    b.add_storage_tier("DC1", "ST1_1").unwrap();
    b.set_size("DC1", 2.0).unwrap();
    b.set_get_request("DC1", 0.0).unwrap();
    b.set_put_request("DC1", 0.0).unwrap();
    b.set_storage_cost("DC1", "ST1_1", 0.5).unwrap();
    b.set_get_cost("DC1", "ST1_1", 0.0).unwrap();
    b.set_put_cost("DC1", "ST1_1", 0.0).unwrap();
    b.set_retrieve_cost("DC1", "ST1_1", 0.0).unwrap();
    b.set_write_cost("DC1", "ST1_1", 0.0).unwrap();
    b.set_get_latency("DC1", "ST1_1", 0.0).unwrap();
    b.set_put_latency("DC1", "ST1_1", 0.0).unwrap();
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
  fn cardinality_is_positive_for_a_feasible_instance() {
    let store = one_dc_one_tier();
    let enc = Encoder::new(&store);
    let spec = PlacementSpec::new(&store, &enc, SlaMode::Eventual);
    let reduced = reduce(&ZddBuilder::new(&spec).build());
    assert!(cardinality(&reduced) > BigUint::from(0u32));
  }

  #[test]
  fn optimal_placement_places_the_only_tier() {
    let store = one_dc_one_tier();
    let enc = Encoder::new(&store);
    let spec = PlacementSpec::new(&store, &enc, SlaMode::Eventual);
    let reduced = reduce(&ZddBuilder::new(&spec).build());
    let (cost, placement) = optimal_placement(&reduced, &enc, &store);
    assert!(cost >= 0.0);
    assert_eq!(placement.storage_tiers, vec!["{DC1, ST1_1}".to_string()]);
  }

  #[test]
  fn cost_vector_has_one_entry_per_variable() {
    let store = one_dc_one_tier();
    let enc = Encoder::new(&store);
    assert_eq!(cost_vector(&enc).len(), enc.num_variables());
  }
}
