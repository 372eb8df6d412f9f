//! DOT export for human inspection and a native line-based export/import
//! pair (this crate's analogue of "Sapporo" serialization) used by the
//! `-export` CLI flag and the round-trip test.

use crate::common::error::{BuilderInvariantViolation, GResult};
use crate::zdd::{Node, NodeId, Zdd, ACCEPT, REJECT};

pub fn to_dot(zdd: &Zdd) -> String {
  let mut out = String::from("digraph zdd {\n");
  out.push_str("  0 [shape=box,label=\"0\"];\n");
  out.push_str("  1 [shape=box,label=\"1\"];\n");
  for (i, node) in zdd.nodes.iter().enumerate() {
    let id = (i as NodeId) + 2;
    out.push_str(&format!("  {} [label=\"{}\"];\n", id, node.level));
    out.push_str(&format!("  {} -> {} [style=dashed];\n", id, node.lo));
    out.push_str(&format!("  {} -> {};\n", id, node.hi));
  }
  out.push_str(&format!("  root -> {};\n", zdd.root));
  out.push_str("}\n");
  out
}

/// One line per node, `{id} {level} {lo} {hi}`, followed by `root {id}` and
/// a terminating `.`.
pub fn to_export(zdd: &Zdd) -> String {
  let mut out = String::new();
  for (i, node) in zdd.nodes.iter().enumerate() {
    let id = (i as NodeId) + 2;
    out.push_str(&format!("{} {} {} {}\n", id, node.level, node.lo, node.hi));
  }
  out.push_str(&format!("root {}\n", zdd.root));
  out.push_str(".\n");
  out
}

/// Parses the format `to_export` produces. Kept for the round-trip
/// property rather than as a general-purpose ingestion path.
pub fn from_export(text: &str) -> GResult<Zdd> {
  let mut nodes = Vec::new();
  let mut root = None;
  for line in text.lines() {
    let line = line.trim();
    if line.is_empty() {
      continue;
    }
    if line == "." {
      break;
    }
    if let Some(rest) = line.strip_prefix("root ") {
      root = Some(rest.parse::<NodeId>().map_err(|e| {
        BuilderInvariantViolation::boxed(format!("malformed root line {:?}: {}", line, e))
      })?);
      continue;
    }
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 4 {
      return Err(BuilderInvariantViolation::boxed(format!("malformed export line {:?}", line)));
    }
    let parse = |s: &str| -> GResult<NodeId> {
      s.parse::<NodeId>().map_err(|e| BuilderInvariantViolation::boxed(format!("bad id {:?}: {}", s, e)))
    };
    let id = parse(fields[0])?;
    let level = parse(fields[1])? as usize;
    let lo = parse(fields[2])?;
    let hi = parse(fields[3])?;
    let expected_id = (nodes.len() as NodeId) + 2;
    if id != expected_id {
      return Err(BuilderInvariantViolation::boxed(format!(
        "export lines must be in id order: expected {}, got {}",
        expected_id, id
      )));
    }
    nodes.push(Node { level, lo, hi });
  }
  let root = root.ok_or_else(|| BuilderInvariantViolation::boxed("export text has no root line".to_string()))?;
  if root != REJECT && root != ACCEPT && (root as usize) >= nodes.len() + 2 {
    return Err(BuilderInvariantViolation::boxed(format!("root {} out of range", root)));
  }
  Ok(Zdd { nodes, root })
}
