//! Planner configuration.
//!
//! All tuning constants and hand-tuned business rules live here so they can
//! be overridden from a JSON file without touching the algorithm.

use serde::{Deserialize, Serialize};

use crate::domain::{AreaContext, LineCode, ScoreWeights, normalize};

/// One step of the progressive radius search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusLevel {
    /// Maximum walk from the origin to the boarding stop (metres).
    pub board_m: f64,
    /// Maximum walk from the alighting stop to the destination (metres).
    pub alight_m: f64,
}

impl RadiusLevel {
    pub const fn new(board_m: f64, alight_m: f64) -> Self {
        Self { board_m, alight_m }
    }
}

/// A geographic area where only specific urban lines serve as interchanges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialArea {
    /// Parish name (normalised on comparison).
    pub parish: String,
    /// Urban line codes allowed for transfers when the trip touches this parish.
    pub urban_lines: Vec<String>,
}

/// Eligibility rules for transfer itineraries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferRules {
    /// Areas with their own urban allow-list.
    pub special_areas: Vec<SpecialArea>,
    /// Urban lines allowed for transfers elsewhere. Empty means any line.
    pub default_urban_lines: Vec<String>,
    /// Try terminal stops before others at equal distance rank.
    pub terminals_first: bool,
}

impl Default for TransferRules {
    fn default() -> Self {
        Self {
            special_areas: Vec::new(),
            default_urban_lines: Vec::new(),
            terminals_first: true,
        }
    }
}

impl TransferRules {
    /// Urban lines eligible for a transfer leg, or `None` if unrestricted.
    ///
    /// The destination area is checked against the special areas first, then
    /// the origin area.
    pub fn urban_allow_list(
        &self,
        origin: &AreaContext,
        destination: &AreaContext,
    ) -> Option<Vec<LineCode>> {
        let special = [destination, origin].into_iter().find_map(|area| {
            let parish = area.parish.as_ref()?;
            self.special_areas
                .iter()
                .find(|s| &normalize(&s.parish) == parish)
        });

        let codes = match special {
            Some(area) => &area.urban_lines,
            None if self.default_urban_lines.is_empty() => return None,
            None => &self.default_urban_lines,
        };

        Some(
            codes
                .iter()
                .filter_map(|c| LineCode::parse(c).ok())
                .collect(),
        )
    }
}

/// Schedule engine defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Speed assumed when a line has none (km/h).
    pub default_speed_kmh: f64,
    /// Lower bound for a derived headway (minutes).
    pub min_headway_mins: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            default_speed_kmh: 20.0,
            min_headway_mins: 3,
        }
    }
}

/// Configuration parameters for journey planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Boarding candidates considered per line.
    pub k_board: usize,

    /// Alighting candidates considered per line.
    pub k_dest: usize,

    /// Per-stop weight in the final tie-break of the direct ladder (metres).
    pub penalty_per_stop_m: f64,

    /// Walking ceilings tried in order, shortest first.
    pub radius_levels: Vec<RadiusLevel>,

    /// A direct plan alighting this close to the destination is accepted
    /// without trying transfers (metres).
    pub near_destination_m: f64,

    /// Maximum walk between the two legs of a transfer (metres).
    pub transfer_ceiling_m: f64,

    /// Transfer stops considered per ordering.
    pub transfer_pool_size: usize,

    /// Transfer stops further than this from the destination are ignored (metres).
    pub transfer_pool_max_m: f64,

    /// Width of the distance buckets used to rank transfer stops (metres).
    /// Stops in the same bucket are of equal rank.
    pub transfer_rank_bucket_m: f64,

    /// Eligibility rules for transfers.
    pub transfer_rules: TransferRules,

    /// Score weights shared by direct and transfer plans.
    pub weights: ScoreWeights,

    /// Accumulated distance beyond which a circular traversal is abandoned (metres).
    pub circular_cutoff_m: f64,

    /// Lines whose stops are fetched concurrently.
    pub fetch_batch_size: usize,

    /// Schedule engine defaults.
    pub schedule: ScheduleConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            k_board: 8,
            k_dest: 8,
            penalty_per_stop_m: 30.0,
            radius_levels: vec![
                RadiusLevel::new(300.0, 300.0),
                RadiusLevel::new(500.0, 500.0),
                RadiusLevel::new(800.0, 800.0),
                RadiusLevel::new(1200.0, 1500.0),
            ],
            near_destination_m: 400.0,
            transfer_ceiling_m: 500.0,
            transfer_pool_size: 12,
            transfer_pool_max_m: 15_000.0,
            transfer_rank_bucket_m: 250.0,
            transfer_rules: TransferRules::default(),
            weights: ScoreWeights::default(),
            circular_cutoff_m: 100_000.0,
            fetch_batch_size: 8,
            schedule: ScheduleConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
