//! CSV loaders for graph and flow snapshots.
//!
//! # CSV formats
//!
//! Column names follow the store's table layout.
//!
//! ```csv
//! node_id,latitude,longitude
//! 1,39.9042,116.4074
//! ```
//!
//! ```csv
//! id,node_id1,node_id2,distance
//! 1,1,2,1.25
//! 2,2,3,
//! ```
//!
//! ```csv
//! day_num,time_stamp,node_id,flow
//! 1,8,3,150
//! ```
//!
//! **`distance`** field:
//!
//! | Value        | Loaded as                                            |
//! |--------------|------------------------------------------------------|
//! | blank        | `None`; the planner substitutes its default          |
//! | number       | `Some(d)` (negative values are kept for rejection)   |
//! | other text   | `Some(NaN)`; rejected by the planner as malformed    |
//!
//! Coordinates are kept as text; malformed values surface when the planner
//! parses them.

use std::io::Read;
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;

use tn_core::{EdgeId, NodeId};

use crate::memory::MemoryStore;
use crate::model::{Edge, FlowSample, Node};
use crate::StoreError;

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    node_id:   u32,
    latitude:  String,
    longitude: String,
}

#[derive(Deserialize)]
struct EdgeRecord {
    id:       u32,
    node_id1: u32,
    node_id2: u32,
    distance: String,
}

#[derive(Deserialize)]
struct FlowRecord {
    day_num:    u32,
    time_stamp: u8,
    node_id:    u32,
    flow:       u32,
}

// ── Public API ────────────────────────────────────────────────────────────────

pub fn load_nodes_reader<R: Read>(reader: R) -> Result<Vec<Node>, StoreError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<NodeRecord>()
        .map(|row| {
            let row = row.map_err(|e| StoreError::Parse(e.to_string()))?;
            Ok(Node::new(NodeId(row.node_id), row.latitude, row.longitude))
        })
        .collect()
}

pub fn load_edges_reader<R: Read>(reader: R) -> Result<Vec<Edge>, StoreError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<EdgeRecord>()
        .map(|row| {
            let row = row.map_err(|e| StoreError::Parse(e.to_string()))?;
            let distance_km = parse_distance(row.id, &row.distance);
            Ok(Edge::new(EdgeId(row.id), NodeId(row.node_id1), NodeId(row.node_id2), distance_km))
        })
        .collect()
}

pub fn load_flows_reader<R: Read>(reader: R) -> Result<Vec<FlowSample>, StoreError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<FlowRecord>()
        .map(|row| {
            let row = row.map_err(|e| StoreError::Parse(e.to_string()))?;
            if row.time_stamp >= tn_core::time::SLOTS_PER_DAY {
                return Err(StoreError::Parse(format!(
                    "flow sample for node {} has time_stamp {} outside 0..24",
                    row.node_id, row.time_stamp
                )));
            }
            Ok(FlowSample {
                day:       row.day_num,
                time_slot: row.time_stamp,
                node_id:   NodeId(row.node_id),
                flow:      row.flow,
            })
        })
        .collect()
}

/// Load `nodes.csv`, `edges.csv` and (if present) `flows.csv` from `dir`.
pub fn load_store_dir(dir: &Path) -> Result<MemoryStore, StoreError> {
    let nodes = load_nodes_reader(std::fs::File::open(dir.join("nodes.csv"))?)?;
    let edges = load_edges_reader(std::fs::File::open(dir.join("edges.csv"))?)?;

    let flows_path = dir.join("flows.csv");
    let flows = if flows_path.exists() {
        load_flows_reader(std::fs::File::open(flows_path)?)?
    } else {
        Vec::new()
    };

    info!(
        "loaded store from {}: {} nodes, {} edges, {} flow samples",
        dir.display(),
        nodes.len(),
        edges.len(),
        flows.len()
    );
    MemoryStore::new(nodes, edges, flows)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_distance(edge_id: u32, s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    match s.parse::<f64>() {
        Ok(d) => Some(d),
        Err(_) => {
            debug!("edge {edge_id}: unparseable distance {s:?}");
            Some(f64::NAN)
        }
    }
}
