#![forbid(unsafe_code)]

//! Horizontal packing of markers that share an outcome value.
//!
//! Markers with the same outcome would overlap at one pixel. Each group of
//! equal outcomes is laid out as a row centred on an anchor pixel, one marker
//! diameter apart, in the records' original order.

use crate::data::{Arm, Record};
use crate::stats::PerArm;

/// Pixel x position for each outcome, packed around `anchor`.
///
/// Outcomes are grouped by exact equality; groups are processed in
/// ascending outcome order and rank within a group follows input order.
/// A group of `n` spans `n · diameter` and is symmetric around `anchor`.
/// Each NaN forms its own group.
pub fn assign_positions(outcomes: &[f64], anchor: f64, diameter: f64) -> Vec<f64> {
    let mut order: Vec<usize> = (0..outcomes.len()).collect();
    // Stable, so equal outcomes keep input order. Zero is normalised so that
    // -0.0 and 0.0 share a group.
    order.sort_by(|&a, &b| group_key(outcomes[a]).total_cmp(&group_key(outcomes[b])));

    let mut positions = vec![anchor; outcomes.len()];
    for group in order.chunk_by(|&a, &b| outcomes[a] == outcomes[b]) {
        let left = anchor - diameter * group.len() as f64 / 2.0;
        for (rank, &index) in group.iter().enumerate() {
            positions[index] = left + (rank as f64 + 0.5) * diameter;
        }
    }
    positions
}

fn group_key(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

/// Pack every record around one anchor.
pub fn pack_pooled(records: &[Record], anchor: f64, diameter: f64) -> Vec<f64> {
    let outcomes: Vec<f64> = records.iter().map(|r| r.dlqi).collect();
    assign_positions(&outcomes, anchor, diameter)
}

/// Pack each arm around its own anchor. Output is in record order.
pub fn pack_by_arm(records: &[Record], anchors: PerArm<f64>, diameter: f64) -> Vec<f64> {
    let mut positions = vec![0.0; records.len()];
    for arm in Arm::ALL {
        let members: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.treatment == arm)
            .map(|(i, _)| i)
            .collect();
        let outcomes: Vec<f64> = members.iter().map(|&i| records[i].dlqi).collect();
        let packed = assign_positions(&outcomes, anchors.get(arm), diameter);
        for (&i, x) in members.iter().zip(packed) {
            positions[i] = x;
        }
    }
    positions
}
