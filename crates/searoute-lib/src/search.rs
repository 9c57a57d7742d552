//! Weather-weighted A* search over the 8-connected sea grid.
//!
//! Edge cost from `a` to `b` is `haversine(a, b) × multiplier(b) / speed`;
//! land nodes have no incoming edges. The default heuristic is the haversine
//! distance to the goal without the speed division. Edge costs are divided by
//! speeds of 10 or more, so that estimate can exceed the remaining cost and
//! returned paths are not guaranteed minimal. [`Heuristic::Zero`] trades
//! expansion count for exactness.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::haversine_km;
use crate::grid::{Grid, Node};
use crate::land::LandMask;
use crate::weather::CostField;

/// Remaining-cost estimate used to order the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Great-circle distance to the goal in kilometres.
    #[default]
    GreatCircle,
    /// No estimate; the search degenerates to Dijkstra and is exact.
    Zero,
}

/// Inputs shared by every search over one grid.
#[derive(Debug, Clone, Copy)]
pub struct SearchSpace<'a> {
    pub grid: &'a Grid,
    pub land: &'a LandMask,
    pub weather: &'a CostField,
}

impl<'a> SearchSpace<'a> {
    pub fn new(grid: &'a Grid, land: &'a LandMask, weather: &'a CostField) -> Self {
        Self {
            grid,
            land,
            weather,
        }
    }

    /// Cost of moving from `from` to the adjacent node `to`.
    pub fn edge_cost(&self, from: Node, to: Node, speed: f64) -> f64 {
        let a = self.grid.position(from);
        let b = self.grid.position(to);
        haversine_km(a.lon, a.lat, b.lon, b.lat) * self.weather.traversal_multiplier(to) / speed
    }

    fn estimate(&self, heuristic: Heuristic, node: Node, goal: Node) -> f64 {
        match heuristic {
            Heuristic::Zero => 0.0,
            Heuristic::GreatCircle => {
                let a = self.grid.position(node);
                let b = self.grid.position(goal);
                haversine_km(a.lon, a.lat, b.lon, b.lat)
            }
        }
    }
}

/// Successful search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    /// Nodes from start to goal inclusive.
    pub path: Vec<Node>,
    /// Accumulated `g` at the goal.
    pub cost: f64,
    /// Number of frontier entries expanded (stale entries excluded).
    pub expanded: usize,
}

/// Per-invocation search bookkeeping, stored densely by grid index.
struct SearchState {
    g_score: Vec<f64>,
    parents: Vec<Option<Node>>,
    queue: BinaryHeap<AStarEntry>,
}

impl SearchState {
    fn new(size: usize) -> Self {
        Self {
            g_score: vec![f64::INFINITY; size],
            parents: vec![None; size],
            queue: BinaryHeap::new(),
        }
    }
}

/// Run A* from `start` to `goal` for a vessel travelling at `speed`.
///
/// Returns `None` when the frontier empties without reaching `goal`, which
/// includes a land-masked start or goal.
pub fn find_route_a_star(
    space: &SearchSpace<'_>,
    start: Node,
    goal: Node,
    speed: f64,
    heuristic: Heuristic,
) -> Option<SearchOutcome> {
    let grid = space.grid;
    if space.land.is_land(start) || space.land.is_land(goal) {
        debug!("start or goal is land-masked; no search performed");
        return None;
    }

    if start == goal {
        return Some(SearchOutcome {
            path: vec![start],
            cost: 0.0,
            expanded: 0,
        });
    }

    let mut state = SearchState::new(grid.len());
    state.g_score[grid.index(start)] = 0.0;
    let start_estimate = space.estimate(heuristic, start, goal);
    state.queue.push(AStarEntry::new(start, 0.0, start_estimate));

    let mut expanded = 0usize;

    while let Some(entry) = state.queue.pop() {
        let current_score = state.g_score[grid.index(entry.node)];
        // Lazy deletion: a cheaper path to this node was queued after this entry.
        if current_score < entry.cost.0 {
            continue;
        }

        if entry.node == goal {
            debug!(
                expanded,
                cost = current_score,
                queued = state.queue.len(),
                "goal reached"
            );
            return Some(SearchOutcome {
                path: reconstruct_path(grid, &state.parents, start, goal),
                cost: current_score,
                expanded,
            });
        }

        expanded += 1;

        for next in grid.neighbours(entry.node) {
            if space.land.is_land(next) {
                continue;
            }

            let tentative_g = current_score + space.edge_cost(entry.node, next, speed);
            let next_index = grid.index(next);
            if tentative_g < state.g_score[next_index] {
                state.g_score[next_index] = tentative_g;
                state.parents[next_index] = Some(entry.node);
                let estimate = space.estimate(heuristic, next, goal);
                state.queue.push(AStarEntry::new(next, tentative_g, estimate));
            }
        }
    }

    debug!(expanded, "frontier exhausted without reaching goal");
    None
}

fn reconstruct_path(
    grid: &Grid,
    parents: &[Option<Node>],
    start: Node,
    goal: Node,
) -> Vec<Node> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents[grid.index(node)];
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct AStarEntry {
    node: Node,
    cost: FloatOrd,
    estimate: FloatOrd,
}

impl AStarEntry {
    fn new(node: Node, cost: f64, heuristic: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
        }
    }
}

impl Ord for AStarEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by estimate.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
