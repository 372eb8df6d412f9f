//! Loader for the four-document JSON configuration schema: `cost_info`,
//! `monitoring_info`, `query`, and `goals`. Field names and load order
//! mirror `readJSON` of the system this store replaces.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::common::error::{GResult, JsonParseError};
use crate::params::{ParameterStore, ParameterStoreBuilder};

#[derive(Deserialize)]
struct StorageCostEntry {
  storage_cost: f64,
  get_request_cost: f64,
  put_request_cost: f64,
  data_retrieval: f64,
  data_write: f64,
}

#[derive(Deserialize)]
struct CostRegion {
  #[serde(default)]
  storage_cost: BTreeMap<String, StorageCostEntry>,
  #[serde(default)]
  network_cost: BTreeMap<String, f64>,
}

type CostInfo = BTreeMap<String, CostRegion>;

#[derive(Deserialize)]
struct StorageLatencyEntry {
  put_latency: f64,
  get_latency: f64,
}

#[derive(Deserialize)]
struct MonitoringRegion {
  #[serde(default)]
  network_latency: BTreeMap<String, f64>,
  #[serde(default)]
  storage_latency: BTreeMap<String, StorageLatencyEntry>,
}

type MonitoringInfo = BTreeMap<String, MonitoringRegion>;

#[derive(Deserialize)]
struct AccessInfoEntry {
  get_access_cnt: f64,
  put_access_cnt: f64,
}

#[derive(Deserialize)]
struct Query {
  object_size: f64,
  access_info: BTreeMap<String, AccessInfoEntry>,
}

#[derive(Deserialize)]
struct Goals {
  center: String,
  get_sla: f64,
  put_sla: f64,
  lc: usize,
  degree_of_fault: i64,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> GResult<T> {
  let text = std::fs::read_to_string(path)?;
  serde_json::from_str(&text).map_err(|e| JsonParseError::boxed(path.display().to_string(), e))
}

/// Loads a [`ParameterStore`] from the four JSON documents, in the same
/// cost/network/latency/query/goals order `readJSON` reads them.
pub fn from_json(
  cost_info_path: &Path,
  monitoring_info_path: &Path,
  query_path: &Path,
  goals_path: &Path,
) -> GResult<ParameterStore> {
  let cost_info: CostInfo = read_json(cost_info_path)?;
  let monitoring_info: MonitoringInfo = read_json(monitoring_info_path)?;
  let query: Query = read_json(query_path)?;
  let goals: Goals = read_json(goals_path)?;

  let mut b = ParameterStoreBuilder::new();

  for (dc, region) in &cost_info {
    for (tier, entry) in &region.storage_cost {
      b.add_storage_tier(dc, tier)?;
      b.set_storage_cost(dc, tier, entry.storage_cost)?;
      b.set_get_cost(dc, tier, entry.get_request_cost)?;
      b.set_put_cost(dc, tier, entry.put_request_cost)?;
      b.set_retrieve_cost(dc, tier, entry.data_retrieval)?;
      b.set_write_cost(dc, tier, entry.data_write)?;
    }
  }
  for (dc, region) in &cost_info {
    for (dc2, cost) in &region.network_cost {
      b.set_network_cost(dc, dc2, *cost)?;
    }
  }

  for (dc, region) in &monitoring_info {
    for (dc2, lat) in &region.network_latency {
      b.set_network_latency(dc, dc2, *lat)?;
    }
    for (tier, entry) in &region.storage_latency {
      b.set_put_latency(dc, tier, entry.put_latency)?;
      b.set_get_latency(dc, tier, entry.get_latency)?;
    }
  }

  for dc in cost_info.keys() {
    b.set_size(dc, query.object_size)?;
  }
  for (dc, entry) in &query.access_info {
    b.set_get_request(dc, entry.get_access_cnt)?;
    b.set_put_request(dc, entry.put_access_cnt)?;
  }

  b.set_center(&goals.center)?;
  b.set_sla_get(goals.get_sla)?;
  b.set_sla_put(goals.put_sla)?;
  b.set_lc(goals.lc)?;
  b.set_f(goals.degree_of_fault)?;

  b.build()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;
  use tempfile::NamedTempFile;

  fn write_json(content: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f
  }

  #[test]
  fn loads_a_minimal_four_file_instance() {
    let cost_info = write_json(
      r#"{
        "DC1": {
          "storage_cost": { "ST1_1": { "storage_cost": 0.1, "get_request_cost": 0.1, "put_request_cost": 0.1, "data_retrieval": 0.1, "data_write": 0.1 } },
          "network_cost": { "DC1": 0.0 }
        }
      }"#,
    );
    let monitoring_info = write_json(
      r#"{
        "DC1": {
          "network_latency": { "DC1": 0.0 },
          "storage_latency": { "ST1_1": { "put_latency": 0.1, "get_latency": 0.1 } }
        }
      }"#,
    );
    let query = write_json(
      r#"{
        "object_size": 1.0,
        "access_info": { "DC1": { "get_access_cnt": 1.0, "put_access_cnt": 1.0 } }
      }"#,
    );
    let goals = write_json(
      r#"{ "center": "DC1", "get_sla": 10.0, "put_sla": 10.0, "lc": 0, "degree_of_fault": 0 }"#,
    );

    let store = from_json(cost_info.path(), monitoring_info.path(), query.path(), goals.path()).unwrap();
    assert_eq!(store.num_dc(), 1);
    assert_eq!(store.num_tier(), 1);
    assert_eq!(store.lc(), 0);
    assert_eq!(store.f(), 0);
  }

  #[test]
  fn malformed_json_is_reported() {
    let cost_info = write_json("{ not json");
    let monitoring_info = write_json("{}");
    let query = write_json(r#"{ "object_size": 1.0, "access_info": {} }"#);
    let goals = write_json(r#"{ "center": "DC1", "get_sla": 1.0, "put_sla": 1.0, "lc": 0, "degree_of_fault": 0 }"#);
    assert!(from_json(cost_info.path(), monitoring_info.path(), query.path(), goals.path()).is_err());
  }
}
