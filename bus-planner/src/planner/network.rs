//! Per-request snapshot of lines and their ordered stops.

use std::ops::Range;
use std::sync::Arc;

use crate::domain::{Category, Coord, Line, LineCode, Stop, Topology};

/// A line together with its usable stops, in sequence order.
///
/// Only stops with a valid coordinate are kept. Stops are grouped by
/// direction tag and ordered within each group; every group is its own
/// sequence with its own index space. The sort is stable, so stops sharing
/// an order keep their repository order.
#[derive(Debug, Clone)]
pub struct Route {
    line: Arc<Line>,
    stops: Vec<Stop>,
    coords: Vec<Coord>,
    /// Contiguous ranges of `stops`, one per direction
    sequences: Vec<Range<usize>>,
}

impl Route {
    pub fn new(line: Line, stops: Vec<Stop>) -> Self {
        Self::from_shared(Arc::new(line), stops)
    }

    pub fn from_shared(line: Arc<Line>, stops: Vec<Stop>) -> Self {
        let mut stops: Vec<Stop> = stops.into_iter().filter(|s| s.coord.is_some()).collect();
        stops.sort_by_key(Stop::key);
        let coords = stops.iter().filter_map(|s| s.coord).collect();

        let mut sequences: Vec<Range<usize>> = Vec::new();
        for (i, stop) in stops.iter().enumerate() {
            match sequences.last_mut() {
                Some(seq) if stops[seq.start].direction == stop.direction => seq.end = i + 1,
                _ => sequences.push(i..i + 1),
            }
        }

        Self {
            line,
            stops,
            coords,
            sequences,
        }
    }

    pub fn line(&self) -> &Arc<Line> {
        &self.line
    }

    pub fn code(&self) -> &LineCode {
        &self.line.code
    }

    pub fn topology(&self) -> Topology {
        self.line.topology
    }

    /// Ordered stops, all with coordinates.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Coordinates parallel to [`Route::stops`].
    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    /// Direction sequences as ranges over [`Route::stops`].
    pub fn sequences(&self) -> &[Range<usize>] {
        &self.sequences
    }

    /// The sequence containing the stop at `index`.
    pub fn sequence_of(&self, index: usize) -> Option<Range<usize>> {
        self.sequences.iter().find(|seq| seq.contains(&index)).cloned()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// All routes available to one planning call, split by category.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub urban: Vec<Route>,
    pub rural: Vec<Route>,
}

impl Network {
    pub fn new(urban: Vec<Route>, rural: Vec<Route>) -> Self {
        Self { urban, rural }
    }

    pub fn routes(&self, category: Category) -> &[Route] {
        match category {
            Category::Urban => &self.urban,
            Category::Rural => &self.rural,
        }
    }

    /// Number of lines across both categories.
    pub fn line_count(&self) -> usize {
        self.urban.len() + self.rural.len()
    }
}
