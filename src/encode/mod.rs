//! Problem Encoder (C2): maps a ZDD variable level to `(kind, t, j, i)` and
//! back, and computes the monetary cost contributed by taking that variable.
//!
//! For each global tier `t` there are `Pwidth = 1 + D + D^2` variables: one
//! `P_{k,t}`, `D` variables `T_{j,k,t}`, and `D^2` variables `B_{i,j,k,t}`.
//! Levels run from `n` (root) down to `1` (closest to the terminals);
//! `invLevel = n - level` is what actually decomposes cleanly by
//! `Pwidth`/`Twidth`.

use crate::params::{DcIdx, ParameterStore, TierIdx};

/// Precomputed powers of three, replacing a recursive `pow(3, k)` helper:
/// `3^10 = 59049` still fits in a `u16`, which bounds how many base-3
/// `hash[j,k]` trits fit in one storage cell (see `crate::spec::mate`).
pub const POW3: [u32; 11] = [1, 3, 9, 27, 81, 243, 729, 2187, 6561, 19683, 59049];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
  P { t: TierIdx },
  T { t: TierIdx, j: DcIdx },
  B { t: TierIdx, j: DcIdx, i: DcIdx },
}

pub struct Encoder<'p> {
  params: &'p ParameterStore,
  p_width: usize,
  t_width: usize,
  n: usize,
}

impl<'p> Encoder<'p> {
  pub fn new(params: &'p ParameterStore) -> Self {
    let d = params.num_dc();
    let p_width = 1 + d + d * d;
    let t_width = 1 + d;
    let n = params.num_tier() * p_width;
    Encoder { params, p_width, t_width, n }
  }

  pub fn params(&self) -> &'p ParameterStore {
    self.params
  }

  pub fn num_variables(&self) -> usize {
    self.n
  }

  pub fn p_width(&self) -> usize {
    self.p_width
  }

  pub fn t_width(&self) -> usize {
    self.t_width
  }

  /// Tiers remaining (after `t`) that belong to `t`'s own data center.
  pub fn tiers_remaining_in_dc(&self, t: TierIdx) -> usize {
    let d = self.params.dc_of(t);
    let local = self.params.local_tier_index(t);
    self.params.local_tier_count(d) - local - 1
  }

  /// Decodes a level into its variable kind and indices.
  pub fn level_kind(&self, level: usize) -> VarKind {
    let inv_level = self.n - level;
    let t = inv_level / self.p_width;
    let rem = inv_level % self.p_width;
    if rem == 0 {
      return VarKind::P { t };
    }
    let r2 = rem - 1;
    let j = r2 / self.t_width;
    if r2 % self.t_width == 0 {
      VarKind::T { t, j }
    } else {
      let i = r2 % self.t_width - 1;
      VarKind::B { t, j, i }
    }
  }

  /// Monetary contribution of taking the variable at `level` into the
  /// placement, per the cost table.
  pub fn cost_of(&self, level: usize) -> f64 {
    match self.level_kind(level) {
      VarKind::P { t } => {
        let k = self.params.dc_of(t);
        self.params.size(k) * self.params.storage_cost(t)
      }
      VarKind::T { t, j } => {
        let k = self.params.dc_of(t);
        let p = self.params;
        p.get_request(j) * (p.size(j) * (p.network_cost(k, j) + p.retrieve_cost(t)) + p.get_cost(t))
          + p.put_request(j) * (p.size(j) * (p.network_cost(j, k) + p.write_cost(t)) + p.put_cost(t))
      }
      VarKind::B { t, j, i } => {
        let k = self.params.dc_of(t);
        let p = self.params;
        p.put_request(i) * (p.size(i) * (p.network_cost(j, k) + p.write_cost(t)) + p.put_cost(t))
      }
    }
  }

  /// `costList[level]` for `level in 1..=n`, used by the weighted enumerator.
  pub fn cost_vector(&self) -> Vec<f64> {
    (1..=self.n).map(|level| self.cost_of(level)).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::params::ParameterStoreBuilder;

  fn sample_store() -> ParameterStore {
    let mut b = ParameterStoreBuilder::new();
    b.add_storage_tier("DC1", "ST1_1").unwrap();
    b.add_storage_tier("DC2", "ST2_1").unwrap();
    for dc in ["DC1", "DC2"] {
      b.set_size(dc, 2.0).unwrap();
      b.set_get_request(dc, 1.0).unwrap();
      b.set_put_request(dc, 1.0).unwrap();
    }
    for (dc, tier) in [("DC1", "ST1_1"), ("DC2", "ST2_1")] {
      b.set_storage_cost(dc, tier, 1.0).unwrap();
      b.set_get_cost(dc, tier, 1.0).unwrap();
      b.set_put_cost(dc, tier, 1.0).unwrap();
      b.set_retrieve_cost(dc, tier, 1.0).unwrap();
      b.set_write_cost(dc, tier, 1.0).unwrap();
      b.set_get_latency(dc, tier, 1.0).unwrap();
      b.set_put_latency(dc, tier, 1.0).unwrap();
    }
    for dc1 in ["DC1", "DC2"] {
      for dc2 in ["DC1", "DC2"] {
        b.set_network_cost(dc1, dc2, 1.0).unwrap();
        b.set_network_latency(dc1, dc2, 1.0).unwrap();
      }
    }
    b.set_center("DC1").unwrap();
    b.set_sla_get(10.0).unwrap();
    b.set_sla_put(10.0).unwrap();
    b.set_lc(1).unwrap();
    b.set_f(0).unwrap();
    b.build().unwrap()
  }

  #[test]
  fn widths_match_two_dc_formula() {
    let store = sample_store();
    let enc = Encoder::new(&store);
    // D=2: Pwidth = 1+2+4=7, Twidth=1+2=3, T=2 tiers, n=14
    assert_eq!(enc.p_width(), 7);
    assert_eq!(enc.t_width(), 3);
    assert_eq!(enc.num_variables(), 14);
  }

  #[test]
  fn level_kind_round_trips_root_as_p_of_last_tier() {
    let store = sample_store();
    let enc = Encoder::new(&store);
    // invLevel=0 at level=n is always P of tier 0
    assert_eq!(enc.level_kind(enc.num_variables()), VarKind::P { t: 0 });
  }

  #[test]
  fn p_cost_is_size_times_storage_cost() {
    let store = sample_store();
    let enc = Encoder::new(&store);
    let level = enc.num_variables(); // P, t=0
    assert_eq!(enc.cost_of(level), 2.0 * 1.0);
  }
}
