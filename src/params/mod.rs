//! Parameter Store (C1): an immutable, indexed view of data centers, their
//! storage tiers, and the scalars the rest of the solver reads. A
//! [`ParameterStoreBuilder`] accumulates the scalars one at a time, exactly
//! mirroring the setter/getter boilerplate of the system this was distilled
//! from, then [`ParameterStoreBuilder::build`] freezes it into a
//! [`ParameterStore`] after `check_all` has verified every required field.

pub mod instance;
pub mod json;

use std::collections::HashMap;

use crate::common::error::{GResult, ParameterDuplicate, ParameterMissing, UnknownDc, UnknownTier};

pub type DcIdx = usize;

/// Global tier index, stable and bijective with `(dc, local tier index)`.
pub type TierIdx = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaMode {
  Eventual,
  Strong,
}

#[derive(Default)]
pub struct ParameterStoreBuilder {
  dc_order: Vec<String>,
  dc_index: HashMap<String, DcIdx>,
  tiers_by_dc: Vec<Vec<String>>,
  tier_index_by_dc: Vec<HashMap<String, usize>>,

  size: HashMap<DcIdx, f64>,
  get_req: HashMap<DcIdx, f64>,
  put_req: HashMap<DcIdx, f64>,

  stor_cost: HashMap<(DcIdx, usize), f64>,
  get_cost: HashMap<(DcIdx, usize), f64>,
  put_cost: HashMap<(DcIdx, usize), f64>,
  retr_cost: HashMap<(DcIdx, usize), f64>,
  write_cost: HashMap<(DcIdx, usize), f64>,
  get_lat: HashMap<(DcIdx, usize), f64>,
  put_lat: HashMap<(DcIdx, usize), f64>,

  net_cost: HashMap<(DcIdx, DcIdx), f64>,
  net_lat: HashMap<(DcIdx, DcIdx), f64>,

  center: Option<DcIdx>,
  sla_get: Option<f64>,
  sla_put: Option<f64>,
  lc: Option<usize>,
  f: Option<i64>,
}

impl ParameterStoreBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  fn ensure_dc(&mut self, dc: &str) -> DcIdx {
    if let Some(&idx) = self.dc_index.get(dc) {
      return idx;
    }
    let idx = self.dc_order.len();
    self.dc_order.push(dc.to_string());
    self.dc_index.insert(dc.to_string(), idx);
    self.tiers_by_dc.push(Vec::new());
    self.tier_index_by_dc.push(HashMap::new());
    idx
  }

  fn dc_idx(&self, dc: &str) -> GResult<DcIdx> {
    self.dc_index.get(dc).copied().ok_or_else(|| UnknownDc::boxed(dc))
  }

  fn tier_idx(&self, dc: &str, tier: &str) -> GResult<(DcIdx, usize)> {
    let d = self.dc_idx(dc)?;
    let t = self.tier_index_by_dc[d]
      .get(tier)
      .copied()
      .ok_or_else(|| UnknownTier::boxed(dc, tier))?;
    Ok((d, t))
  }

  /// Adds `tier` to `dc`, creating `dc` if this is the first time it is seen.
  pub fn add_storage_tier(&mut self, dc: &str, tier: &str) -> GResult<()> {
    let d = self.ensure_dc(dc);
    if self.tier_index_by_dc[d].contains_key(tier) {
      return Err(ParameterDuplicate::boxed(dc, format!("storage tier {}", tier)));
    }
    let local = self.tiers_by_dc[d].len();
    self.tier_index_by_dc[d].insert(tier.to_string(), local);
    self.tiers_by_dc[d].push(tier.to_string());
    Ok(())
  }

  fn set_dc_scalar(map: &mut HashMap<DcIdx, f64>, d: DcIdx, dc: &str, field: &str, v: f64) -> GResult<()> {
    if map.contains_key(&d) {
      return Err(ParameterDuplicate::boxed(dc, field));
    }
    map.insert(d, v);
    Ok(())
  }

  fn set_tier_scalar(
    map: &mut HashMap<(DcIdx, usize), f64>,
    d: DcIdx,
    t: usize,
    dc: &str,
    tier: &str,
    field: &str,
    v: f64,
  ) -> GResult<()> {
    if map.contains_key(&(d, t)) {
      return Err(ParameterDuplicate::boxed(format!("{}/{}", dc, tier), field));
    }
    map.insert((d, t), v);
    Ok(())
  }

  fn set_pair_scalar(
    map: &mut HashMap<(DcIdx, DcIdx), f64>,
    d1: DcIdx,
    d2: DcIdx,
    dc1: &str,
    dc2: &str,
    field: &str,
    v: f64,
  ) -> GResult<()> {
    if map.contains_key(&(d1, d2)) {
      return Err(ParameterDuplicate::boxed(format!("{}->{}", dc1, dc2), field));
    }
    map.insert((d1, d2), v);
    Ok(())
  }

  pub fn set_size(&mut self, dc: &str, v: f64) -> GResult<()> {
    let d = self.dc_idx(dc)?;
    Self::set_dc_scalar(&mut self.size, d, dc, "size", v)
  }
  pub fn set_get_request(&mut self, dc: &str, v: f64) -> GResult<()> {
    let d = self.dc_idx(dc)?;
    Self::set_dc_scalar(&mut self.get_req, d, dc, "getRequest", v)
  }
  pub fn set_put_request(&mut self, dc: &str, v: f64) -> GResult<()> {
    let d = self.dc_idx(dc)?;
    Self::set_dc_scalar(&mut self.put_req, d, dc, "putRequest", v)
  }

  pub fn set_storage_cost(&mut self, dc: &str, tier: &str, v: f64) -> GResult<()> {
    let (d, t) = self.tier_idx(dc, tier)?;
    Self::set_tier_scalar(&mut self.stor_cost, d, t, dc, tier, "storageCost", v)
  }
  pub fn set_get_cost(&mut self, dc: &str, tier: &str, v: f64) -> GResult<()> {
    let (d, t) = self.tier_idx(dc, tier)?;
    Self::set_tier_scalar(&mut self.get_cost, d, t, dc, tier, "getCost", v)
  }
  pub fn set_put_cost(&mut self, dc: &str, tier: &str, v: f64) -> GResult<()> {
    let (d, t) = self.tier_idx(dc, tier)?;
    Self::set_tier_scalar(&mut self.put_cost, d, t, dc, tier, "putCost", v)
  }
  pub fn set_retrieve_cost(&mut self, dc: &str, tier: &str, v: f64) -> GResult<()> {
    let (d, t) = self.tier_idx(dc, tier)?;
    Self::set_tier_scalar(&mut self.retr_cost, d, t, dc, tier, "retrieveCost", v)
  }
  pub fn set_write_cost(&mut self, dc: &str, tier: &str, v: f64) -> GResult<()> {
    let (d, t) = self.tier_idx(dc, tier)?;
    Self::set_tier_scalar(&mut self.write_cost, d, t, dc, tier, "writeCost", v)
  }
  pub fn set_get_latency(&mut self, dc: &str, tier: &str, v: f64) -> GResult<()> {
    let (d, t) = self.tier_idx(dc, tier)?;
    Self::set_tier_scalar(&mut self.get_lat, d, t, dc, tier, "getLatency", v)
  }
  pub fn set_put_latency(&mut self, dc: &str, tier: &str, v: f64) -> GResult<()> {
    let (d, t) = self.tier_idx(dc, tier)?;
    Self::set_tier_scalar(&mut self.put_lat, d, t, dc, tier, "putLatency", v)
  }

  pub fn set_network_cost(&mut self, dc1: &str, dc2: &str, v: f64) -> GResult<()> {
    let d1 = self.dc_idx(dc1)?;
    let d2 = self.dc_idx(dc2)?;
    Self::set_pair_scalar(&mut self.net_cost, d1, d2, dc1, dc2, "networkCost", v)
  }
  pub fn set_network_latency(&mut self, dc1: &str, dc2: &str, v: f64) -> GResult<()> {
    let d1 = self.dc_idx(dc1)?;
    let d2 = self.dc_idx(dc2)?;
    Self::set_pair_scalar(&mut self.net_lat, d1, d2, dc1, dc2, "networkLatency", v)
  }

  pub fn set_center(&mut self, dc: &str) -> GResult<()> {
    let d = self.dc_idx(dc)?;
    if self.center.is_some() {
      return Err(ParameterDuplicate::boxed("goals", "center"));
    }
    self.center = Some(d);
    Ok(())
  }
  pub fn set_sla_get(&mut self, v: f64) -> GResult<()> {
    if self.sla_get.is_some() {
      return Err(ParameterDuplicate::boxed("goals", "slaGet"));
    }
    self.sla_get = Some(v);
    Ok(())
  }
  pub fn set_sla_put(&mut self, v: f64) -> GResult<()> {
    if self.sla_put.is_some() {
      return Err(ParameterDuplicate::boxed("goals", "slaPut"));
    }
    self.sla_put = Some(v);
    Ok(())
  }
  pub fn set_lc(&mut self, v: usize) -> GResult<()> {
    if self.lc.is_some() {
      return Err(ParameterDuplicate::boxed("goals", "LC"));
    }
    self.lc = Some(v);
    Ok(())
  }
  pub fn set_f(&mut self, v: i64) -> GResult<()> {
    if self.f.is_some() {
      return Err(ParameterDuplicate::boxed("goals", "F"));
    }
    self.f = Some(v);
    Ok(())
  }

  /// Verifies every scalar `checkAll` requires is present, in the same
  /// DC-major, tier-then-pair order as the system this store replaces.
  fn check_all(&self) -> GResult<()> {
    for (d, dc) in self.dc_order.iter().enumerate() {
      if !self.size.contains_key(&d) {
        return Err(ParameterMissing::boxed(dc.as_str(), "size"));
      }
      if !self.get_req.contains_key(&d) {
        return Err(ParameterMissing::boxed(dc.as_str(), "getRequest"));
      }
      if !self.put_req.contains_key(&d) {
        return Err(ParameterMissing::boxed(dc.as_str(), "putRequest"));
      }
      for (t, tier) in self.tiers_by_dc[d].iter().enumerate() {
        let label = format!("{}/{}", dc, tier);
        if !self.stor_cost.contains_key(&(d, t)) {
          return Err(ParameterMissing::boxed(label, "storageCost"));
        }
        if !self.get_cost.contains_key(&(d, t)) {
          return Err(ParameterMissing::boxed(label, "getCost"));
        }
        if !self.put_cost.contains_key(&(d, t)) {
          return Err(ParameterMissing::boxed(label, "putCost"));
        }
        if !self.retr_cost.contains_key(&(d, t)) {
          return Err(ParameterMissing::boxed(label, "retrieveCost"));
        }
        if !self.write_cost.contains_key(&(d, t)) {
          return Err(ParameterMissing::boxed(label, "writeCost"));
        }
        if !self.get_lat.contains_key(&(d, t)) {
          return Err(ParameterMissing::boxed(label, "getLatency"));
        }
        if !self.put_lat.contains_key(&(d, t)) {
          return Err(ParameterMissing::boxed(label, "putLatency"));
        }
      }
      for (d2, dc2) in self.dc_order.iter().enumerate() {
        if !self.net_cost.contains_key(&(d, d2)) {
          return Err(ParameterMissing::boxed(format!("{}->{}", dc, dc2), "networkCost"));
        }
        if !self.net_lat.contains_key(&(d, d2)) {
          return Err(ParameterMissing::boxed(format!("{}->{}", dc, dc2), "networkLatency"));
        }
      }
    }
    if self.center.is_none() {
      return Err(ParameterMissing::boxed("goals", "center"));
    }
    if self.sla_get.is_none() {
      return Err(ParameterMissing::boxed("goals", "slaGet"));
    }
    if self.sla_put.is_none() {
      return Err(ParameterMissing::boxed("goals", "slaPut"));
    }
    if self.lc.is_none() {
      return Err(ParameterMissing::boxed("goals", "LC"));
    }
    if self.f.is_none() {
      return Err(ParameterMissing::boxed("goals", "F"));
    }
    Ok(())
  }

  /// Freezes the builder into a [`ParameterStore`], running `check_all` first.
  pub fn build(self) -> GResult<ParameterStore> {
    self.check_all()?;

    let num_dc = self.dc_order.len();
    let mut dc_of_tier = Vec::new();
    let mut local_of_tier = Vec::new();
    let mut tier_names = Vec::new();
    let mut tier_offset = vec![0usize; num_dc];
    let mut running = 0usize;
    for d in 0..num_dc {
      tier_offset[d] = running;
      for (t, name) in self.tiers_by_dc[d].iter().enumerate() {
        dc_of_tier.push(d);
        local_of_tier.push(t);
        tier_names.push(name.clone());
      }
      running += self.tiers_by_dc[d].len();
    }
    let num_tier = running;

    let get = |m: &HashMap<(DcIdx, usize), f64>| -> Vec<f64> {
      (0..num_tier).map(|gt| m[&(dc_of_tier[gt], local_of_tier[gt])]).collect()
    };
    let pair = |m: &HashMap<(DcIdx, DcIdx), f64>| -> Vec<Vec<f64>> {
      (0..num_dc).map(|d1| (0..num_dc).map(|d2| m[&(d1, d2)]).collect()).collect()
    };

    Ok(ParameterStore {
      dc_names: self.dc_order,
      tier_names,
      tier_offset,
      dc_of_tier,
      size: (0..num_dc).map(|d| self.size[&d]).collect(),
      get_req: (0..num_dc).map(|d| self.get_req[&d]).collect(),
      put_req: (0..num_dc).map(|d| self.put_req[&d]).collect(),
      stor_cost: get(&self.stor_cost),
      get_cost: get(&self.get_cost),
      put_cost: get(&self.put_cost),
      retr_cost: get(&self.retr_cost),
      write_cost: get(&self.write_cost),
      get_lat: get(&self.get_lat),
      put_lat: get(&self.put_lat),
      net_cost: pair(&self.net_cost),
      net_lat: pair(&self.net_lat),
      center: self.center.unwrap(),
      sla_get: self.sla_get.unwrap(),
      sla_put: self.sla_put.unwrap(),
      lc: self.lc.unwrap(),
      f: self.f.unwrap(),
      num_dc,
      num_tier,
    })
  }
}

/// Immutable, indexed view of the problem instance. There is no setter on
/// this type by design: the only way to mutate a parameter is to build a
/// new store from a [`ParameterStoreBuilder`].
pub struct ParameterStore {
  dc_names: Vec<String>,
  tier_names: Vec<String>,
  tier_offset: Vec<usize>,
  dc_of_tier: Vec<DcIdx>,

  size: Vec<f64>,
  get_req: Vec<f64>,
  put_req: Vec<f64>,

  stor_cost: Vec<f64>,
  get_cost: Vec<f64>,
  put_cost: Vec<f64>,
  retr_cost: Vec<f64>,
  write_cost: Vec<f64>,
  get_lat: Vec<f64>,
  put_lat: Vec<f64>,

  net_cost: Vec<Vec<f64>>,
  net_lat: Vec<Vec<f64>>,

  center: DcIdx,
  sla_get: f64,
  sla_put: f64,
  lc: usize,
  f: i64,

  num_dc: usize,
  num_tier: usize,
}

impl ParameterStore {
  pub fn num_dc(&self) -> usize {
    self.num_dc
  }
  pub fn num_tier(&self) -> usize {
    self.num_tier
  }
  pub fn dc_name(&self, d: DcIdx) -> &str {
    &self.dc_names[d]
  }
  pub fn tier_name(&self, t: TierIdx) -> &str {
    &self.tier_names[t]
  }
  pub fn dc_of(&self, t: TierIdx) -> DcIdx {
    self.dc_of_tier[t]
  }
  /// Number of tiers owned by `d`.
  pub fn local_tier_count(&self, d: DcIdx) -> usize {
    let start = self.tier_offset[d];
    let end = if d + 1 < self.num_dc { self.tier_offset[d + 1] } else { self.num_tier };
    end - start
  }
  pub fn local_tier_index(&self, t: TierIdx) -> usize {
    t - self.tier_offset[self.dc_of_tier[t]]
  }

  pub fn size(&self, d: DcIdx) -> f64 {
    self.size[d]
  }
  pub fn get_request(&self, d: DcIdx) -> f64 {
    self.get_req[d]
  }
  pub fn put_request(&self, d: DcIdx) -> f64 {
    self.put_req[d]
  }

  pub fn storage_cost(&self, t: TierIdx) -> f64 {
    self.stor_cost[t]
  }
  pub fn get_cost(&self, t: TierIdx) -> f64 {
    self.get_cost[t]
  }
  pub fn put_cost(&self, t: TierIdx) -> f64 {
    self.put_cost[t]
  }
  pub fn retrieve_cost(&self, t: TierIdx) -> f64 {
    self.retr_cost[t]
  }
  pub fn write_cost(&self, t: TierIdx) -> f64 {
    self.write_cost[t]
  }
  pub fn get_latency(&self, t: TierIdx) -> f64 {
    self.get_lat[t]
  }
  pub fn put_latency(&self, t: TierIdx) -> f64 {
    self.put_lat[t]
  }

  pub fn network_cost(&self, d1: DcIdx, d2: DcIdx) -> f64 {
    self.net_cost[d1][d2]
  }
  pub fn network_latency(&self, d1: DcIdx, d2: DcIdx) -> f64 {
    self.net_lat[d1][d2]
  }

  pub fn center(&self) -> DcIdx {
    self.center
  }
  pub fn sla_get(&self) -> f64 {
    self.sla_get
  }
  pub fn sla_put(&self) -> f64 {
    self.sla_put
  }
  pub fn lc(&self) -> usize {
    self.lc
  }
  pub fn f(&self) -> i64 {
    self.f
  }

  /// Max network latency from `d` to any other DC, used by the strong-SLA
  /// put-latency bound.
  pub fn max_network_latency_from(&self, d: DcIdx) -> f64 {
    (0..self.num_dc)
      .map(|x| self.net_lat[d][x])
      .fold(f64::NEG_INFINITY, f64::max)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn two_dc_one_tier_each() -> ParameterStoreBuilder {
    let mut b = ParameterStoreBuilder::new();
    b.add_storage_tier("DC1", "ST1_1").unwrap();
    b.add_storage_tier("DC2", "ST2_1").unwrap();
    for dc in ["DC1", "DC2"] {
      b.set_size(dc, 1.0).unwrap();
      b.set_get_request(dc, 1.0).unwrap();
      b.set_put_request(dc, 1.0).unwrap();
    }
    for (dc, tier) in [("DC1", "ST1_1"), ("DC2", "ST2_1")] {
      b.set_storage_cost(dc, tier, 0.1).unwrap();
      b.set_get_cost(dc, tier, 0.1).unwrap();
      b.set_put_cost(dc, tier, 0.1).unwrap();
      b.set_retrieve_cost(dc, tier, 0.1).unwrap();
      b.set_write_cost(dc, tier, 0.1).unwrap();
      b.set_get_latency(dc, tier, 0.1).unwrap();
      b.set_put_latency(dc, tier, 0.1).unwrap();
    }
    for dc1 in ["DC1", "DC2"] {
      for dc2 in ["DC1", "DC2"] {
        b.set_network_cost(dc1, dc2, 0.5).unwrap();
        b.set_network_latency(dc1, dc2, 0.5).unwrap();
      }
    }
    b.set_center("DC1").unwrap();
    b.set_sla_get(10.0).unwrap();
    b.set_sla_put(10.0).unwrap();
    b.set_lc(1).unwrap();
    b.set_f(0).unwrap();
    b
  }

  #[test]
  fn build_succeeds_when_complete() {
    let store = two_dc_one_tier_each().build().unwrap();
    assert_eq!(store.num_dc(), 2);
    assert_eq!(store.num_tier(), 2);
    assert_eq!(store.dc_of(0), 0);
    assert_eq!(store.dc_of(1), 1);
  }

  #[test]
  fn build_fails_on_missing_scalar() {
    let mut b = ParameterStoreBuilder::new();
    b.add_storage_tier("DC1", "ST1_1").unwrap();
    assert!(b.build().is_err());
  }

  #[test]
  fn duplicate_set_is_rejected() {
    let mut b = two_dc_one_tier_each();
    assert!(b.set_center("DC2").is_err());
  }

  #[test]
  fn unknown_dc_is_rejected() {
    let mut b = ParameterStoreBuilder::new();
    assert!(b.set_size("DC1", 1.0).is_err());
  }

  #[test]
  fn global_tier_indices_are_dc_major() {
    let mut b = ParameterStoreBuilder::new();
    b.add_storage_tier("DC1", "a").unwrap();
    b.add_storage_tier("DC1", "b").unwrap();
    b.add_storage_tier("DC2", "c").unwrap();
    assert_eq!(b.tier_idx("DC1", "a").unwrap(), (0, 0));
    assert_eq!(b.tier_idx("DC1", "b").unwrap(), (0, 1));
    assert_eq!(b.tier_idx("DC2", "c").unwrap(), (1, 0));
  }
}
