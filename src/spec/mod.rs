//! Constraint Spec (C3): the frontier `Mate` state and the `DdSpec` trait
//! the ZDD Builder drives top-down. `PlacementSpec` is the sole
//! implementor: it carries the Locale-Count, fault-tolerance and SLA
//! constraints through `root()`/`child()`.

use crate::encode::{Encoder, VarKind, POW3};
use crate::params::{ParameterStore, SlaMode};

/// How many base-3 digits (`hash[j,k]` trits) are packed into one `u16`
/// cell. `3^10 = 59049 < 2^16`.
const CELL_TRITS: usize = 10;

/// Frontier state carried along one construction path: a packed
/// `hash[j,k] in {0,1,2}` table (undecided/forbidden/required) and a
/// remaining-faults counter. Equality/hash are plain derived value
/// equality, standing in for the byte-compare unique table the ZDD
/// Builder needs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Mate {
  num_dc: usize,
  hash: Vec<u16>,
  faults_remaining: i32,
}

impl Mate {
  pub fn new(num_dc: usize, f: i64) -> Self {
    let cells = (num_dc * num_dc + CELL_TRITS - 1) / CELL_TRITS;
    Mate { num_dc, hash: vec![0; cells], faults_remaining: (f + 1) as i32 }
  }

  fn get_hash(&self, j: usize, k: usize) -> u8 {
    let idx = j * self.num_dc + k;
    let cell = idx / CELL_TRITS;
    let digit = idx % CELL_TRITS;
    ((self.hash[cell] as u32 / POW3[digit]) % 3) as u8
  }

  fn write_hash(&mut self, j: usize, k: usize, v: u8) {
    let idx = j * self.num_dc + k;
    let cell = idx / CELL_TRITS;
    let digit = idx % CELL_TRITS;
    let old = self.get_hash(j, k) as i64;
    let delta = (v as i64 - old) * POW3[digit] as i64;
    self.hash[cell] = (self.hash[cell] as i64 + delta) as u16;
  }

  /// `countLocales(mate, j) = |{k : hash[j,k] = 2}|`.
  pub fn count_locales(&self, j: usize) -> usize {
    (0..self.num_dc).filter(|&k| self.get_hash(j, k) == 2).count()
  }

  /// `setHash(mate, j, k, v)`: returns `false` (reject) on conflict, or
  /// when setting `v = 2` would exceed `LC` locales already claimed for `j`.
  pub fn set_hash(&mut self, j: usize, k: usize, v: u8, lc: usize) -> bool {
    let current = self.get_hash(j, k);
    if current == 0 {
      if v == 2 && self.count_locales(j) >= lc {
        return false;
      }
      self.write_hash(j, k, v);
      true
    } else {
      current == v
    }
  }

  /// `lookahead(mate, k)`: rejects if some DC `j` can no longer reach `LC`
  /// locales with `D - k` DCs left to decide, or if there are not enough
  /// remaining `P` opportunities to burn down `faultsRemaining`.
  pub fn lookahead(&self, k: usize, lc: usize) -> bool {
    let remaining_dcs = (self.num_dc - k) as i64;
    for j in 0..self.num_dc {
      if self.count_locales(j) as i64 + remaining_dcs < lc as i64 {
        return false;
      }
    }
    self.faults_remaining as i64 <= remaining_dcs
  }

  fn take_fault(&mut self) {
    if self.faults_remaining > 0 {
      self.faults_remaining -= 1;
    }
  }

  /// `constraintsCheck(mate)`, run at the terminal: every DC reached `LC`
  /// locales, and enough distinct-DC placements were taken to cover `F`
  /// tolerable faults.
  pub fn constraints_check(&self, lc: usize) -> bool {
    self.faults_remaining <= 0 && (0..self.num_dc).all(|j| self.count_locales(j) >= lc)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  Level(usize),
  Accept,
  Reject,
}

/// `root()`/`child()` over a per-path frontier, driving the ZDD Builder.
pub trait DdSpec {
  type Mate: Clone + Eq + std::hash::Hash;
  fn root(&self) -> (usize, Self::Mate);
  fn child(&self, mate: &Self::Mate, level: usize, branch: bool) -> (Transition, Self::Mate);
  fn num_variables(&self) -> usize;
}

pub struct PlacementSpec<'p> {
  params: &'p ParameterStore,
  encoder: &'p Encoder<'p>,
  sla_mode: SlaMode,
}

impl<'p> PlacementSpec<'p> {
  pub fn new(params: &'p ParameterStore, encoder: &'p Encoder<'p>, sla_mode: SlaMode) -> Self {
    PlacementSpec { params, encoder, sla_mode }
  }

  fn sla_ok(&self, j: usize, k: usize, t: usize) -> bool {
    let p = self.params;
    match self.sla_mode {
      SlaMode::Eventual => {
        p.network_latency(j, k) + p.get_latency(t) <= p.sla_get()
          && p.network_latency(j, k) + p.put_latency(t) <= p.sla_put()
      }
      SlaMode::Strong => {
        let center = p.center();
        p.network_latency(j, k) + p.get_latency(t) + 2.0 * p.network_latency(k, center) <= p.sla_get()
          && p.network_latency(j, k) + p.put_latency(t) + 2.0 * p.network_latency(k, center)
            + p.max_network_latency_from(k)
            <= p.sla_put()
      }
    }
  }

  /// Unifies every "proceed"/"skip" transition case into one arithmetic
  /// rule: advance `invLevel` by `delta`, and resolve to `Accept`/`Reject`
  /// once the terminal is reached.
  fn advance(&self, level: usize, delta: usize, mate: Mate) -> (Transition, Mate) {
    let n = self.encoder.num_variables();
    let inv_level = n - level;
    let new_inv_level = inv_level + delta;
    if new_inv_level == n {
      let lc = self.params.lc();
      let t = if mate.constraints_check(lc) { Transition::Accept } else { Transition::Reject };
      (t, mate)
    } else {
      (Transition::Level(n - new_inv_level), mate)
    }
  }
}

impl<'p> DdSpec for PlacementSpec<'p> {
  type Mate = Mate;

  fn root(&self) -> (usize, Mate) {
    (self.encoder.num_variables(), Mate::new(self.params.num_dc(), self.params.f()))
  }

  fn num_variables(&self) -> usize {
    self.encoder.num_variables()
  }

  fn child(&self, mate: &Mate, level: usize, branch: bool) -> (Transition, Mate) {
    let lc = self.params.lc();
    let mut m = mate.clone();
    match self.encoder.level_kind(level) {
      VarKind::P { t } => {
        let k = self.params.dc_of(t);
        if !m.lookahead(k, lc) {
          return (Transition::Reject, m);
        }
        if !branch {
          if self.encoder.tiers_remaining_in_dc(t) == 0 {
            for j in 0..self.params.num_dc() {
              if !m.set_hash(j, k, 1, lc) {
                return (Transition::Reject, m);
              }
            }
          }
          self.advance(level, self.encoder.p_width(), m)
        } else {
          m.take_fault();
          self.advance(level, 1, m)
        }
      }
      VarKind::T { t, j } => {
        let k = self.params.dc_of(t);
        if !branch {
          if !m.set_hash(j, k, 1, lc) {
            return (Transition::Reject, m);
          }
          self.advance(level, 1, m)
        } else {
          if !self.sla_ok(j, k, t) {
            return (Transition::Reject, m);
          }
          if !m.set_hash(j, k, 2, lc) {
            return (Transition::Reject, m);
          }
          self.advance(level, 1, m)
        }
      }
      VarKind::B { t, j, i } => {
        let k = self.params.dc_of(t);
        let end_of_block = i == self.params.num_dc() - 1 && j == self.params.num_dc() - 1;
        let delta = if end_of_block { self.encoder.tiers_remaining_in_dc(t) * self.encoder.p_width() + 1 } else { 1 };
        if !branch {
          if j != k && !m.set_hash(i, j, 1, lc) {
            return (Transition::Reject, m);
          }
          self.advance(level, delta, m)
        } else {
          if j == k {
            return (Transition::Reject, m);
          }
          if !m.set_hash(i, j, 2, lc) {
            return (Transition::Reject, m);
          }
          self.advance(level, delta, m)
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::params::ParameterStoreBuilder;

  fn one_dc_one_tier() -> ParameterStore {
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
  fn mate_set_hash_rejects_conflicting_value() {
    let mut m = Mate::new(2, 0);
    assert!(m.set_hash(0, 1, 1, 2));
    assert!(!m.set_hash(0, 1, 2, 2));
  }

  #[test]
  fn mate_set_hash_is_idempotent() {
    let mut m = Mate::new(2, 0);
    assert!(m.set_hash(0, 1, 2, 2));
    assert!(m.set_hash(0, 1, 2, 2));
    assert_eq!(m.count_locales(0), 1);
  }

  #[test]
  fn mate_set_hash_enforces_lc_upper_bound() {
    let mut m = Mate::new(3, 0);
    assert!(m.set_hash(0, 1, 2, 1));
    assert!(!m.set_hash(0, 2, 2, 1));
  }

  #[test]
  fn root_starts_at_top_level_with_fresh_mate() {
    let store = one_dc_one_tier();
    let enc = Encoder::new(&store);
    let spec = PlacementSpec::new(&store, &enc, SlaMode::Eventual);
    let (level, mate) = spec.root();
    assert_eq!(level, enc.num_variables());
    assert_eq!(mate.count_locales(0), 0);
  }

  #[test]
  fn taking_p_and_t_and_skipping_self_replicating_b_reaches_accept() {
    // With a single DC, every B variable has j == k, so the take branch is
    // always invalid; skipping it is a no-op and still satisfies LC=1.
    let store = one_dc_one_tier();
    let enc = Encoder::new(&store);
    let spec = PlacementSpec::new(&store, &enc, SlaMode::Eventual);
    let (mut level, mut mate) = spec.root();
    loop {
      let (t, m) = spec.child(&mate, level, true);
      let (transition, next_mate) = match t {
        Transition::Reject => spec.child(&mate, level, false),
        _ => (t, m),
      };
      mate = next_mate;
      match transition {
        Transition::Accept => break,
        Transition::Reject => panic!("expected acceptance along this path"),
        Transition::Level(next) => level = next,
      }
    }
  }
}
