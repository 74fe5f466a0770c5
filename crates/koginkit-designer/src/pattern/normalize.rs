//! Cleanup of stitches sharing holes on the same row.
//!
//! Two stitches on one row conflict when their spans touch or overlap.
//! A stitch lying within another one (or identical to it) is deleted; a run
//! of overlapping or touching stitches becomes one stitch starting at the
//! leftmost hole. Colors are not compared; a joined stitch keeps the color
//! of its leftmost member.

use super::{ItemSpec, Pattern};
use crate::tree::{NodeId, PlacedStitch};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Label of the undo entry recorded by [`Pattern::normalize`].
pub const NORMALIZE_LABEL: &str = "Normalize";

/// What [`Pattern::normalize`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Normalization {
    /// Stitches deleted because another stitch covers them.
    pub removed: usize,
    /// Runs of overlapping stitches joined into one stitch each.
    pub joined: usize,
}

impl Normalization {
    pub fn is_empty(&self) -> bool {
        self.removed == 0 && self.joined == 0
    }
}

/// Overlapping stitches of one row, leftmost first.
#[derive(Debug)]
struct Run {
    head: PlacedStitch,
    end: i32,
    tail: Vec<NodeId>,
}

fn stitch_end(stitch: &PlacedStitch) -> i32 {
    stitch.position.x.saturating_add_unsigned(stitch.key.length)
}

/// Sorts `row` by start and returns the stitches covered by an earlier one.
/// Among identical stitches the first in paint order survives.
fn covered_stitches(row: &mut [PlacedStitch]) -> Vec<NodeId> {
    row.sort_by_key(|s| (s.position.x, Reverse(s.key.length)));
    let mut reach = i32::MIN;
    let mut covered = Vec::new();
    for stitch in row.iter() {
        let end = stitch_end(stitch);
        if end <= reach {
            covered.push(stitch.node);
        } else {
            reach = end;
        }
    }
    covered
}

/// Runs of more than one stitch in a sorted row without covered stitches.
fn joined_runs(row: &[PlacedStitch]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for stitch in row {
        let end = stitch_end(stitch);
        match runs.last_mut() {
            Some(run) if stitch.position.x <= run.end => {
                run.end = run.end.max(end);
                run.tail.push(stitch.node);
            }
            _ => runs.push(Run {
                head: *stitch,
                end,
                tail: Vec::new(),
            }),
        }
    }
    runs.retain(|run| !run.tail.is_empty());
    runs
}

impl Pattern {
    /// Deletes covered stitches and joins overlapping ones, row by row, in
    /// a single undo step.
    pub fn normalize(&mut self) -> Normalization {
        let mut rows: BTreeMap<i32, Vec<PlacedStitch>> = BTreeMap::new();
        for stitch in self.tree.placed_stitches() {
            rows.entry(stitch.position.y).or_default().push(stitch);
        }

        let mut doomed: Vec<NodeId> = Vec::new();
        for row in rows.values_mut() {
            let covered = covered_stitches(row);
            row.retain(|s| !covered.contains(&s.node));
            doomed.extend(covered);
        }
        let removed = doomed.len();

        let runs: Vec<Run> = rows.values().flat_map(|row| joined_runs(row)).collect();
        doomed.extend(runs.iter().flat_map(|run| run.tail.iter().copied()));
        let replacements: Vec<(NodeId, ItemSpec)> = runs
            .iter()
            .map(|run| {
                let spec = ItemSpec::Stitch {
                    position: run.head.position,
                    length: (run.end - run.head.position.x).unsigned_abs(),
                    color: run.head.key.color,
                };
                (run.head.node, spec)
            })
            .collect();

        let mut entries = 0;
        if self.delete_items(&doomed) {
            entries += 1;
        }
        if !self.replace_items(&replacements).is_empty() {
            entries += 1;
        }
        if entries > 0 {
            self.merge_undo(entries, NORMALIZE_LABEL);
        }

        let summary = Normalization {
            removed,
            joined: runs.len(),
        };
        if !summary.is_empty() {
            tracing::info!(
                "Normalized pattern: {} covered stitches removed, {} runs joined",
                summary.removed,
                summary.joined
            );
        }
        summary
    }
}
