//! Training run progress
//!
//! Per-round accuracy and loss series plus the run's lifecycle flags. Rounds
//! are 1-based on the wire; a missing or zero round is ignored, and so is a
//! round far beyond anything the run has announced.

use std::collections::BTreeMap;
use tracing::{debug, warn};

/// How far past the expected or last seen round a report may land
pub const MAX_ROUND_LEAD: u32 = 1000;

/// Progress of the current (or last) training run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrainingProgress {
    accuracy: BTreeMap<u32, f64>,
    loss: BTreeMap<u32, f64>,
    rounds: u32,
    running: bool,
    complete: bool,
    model: Option<String>,
    final_accuracy: Option<f64>,
    last_round: Option<u32>,
}

impl TrainingProgress {
    /// Empty progress expecting `rounds` rounds
    pub fn new(rounds: u32) -> Self {
        Self {
            rounds,
            ..Default::default()
        }
    }

    /// Clear both series and set the expected round count
    pub fn reset(&mut self, rounds: u32) {
        *self = Self::new(rounds);
    }

    /// Change the expected round count without touching recorded points
    pub fn set_rounds(&mut self, rounds: u32) {
        self.rounds = rounds;
    }

    /// Mark a run as started by the operator
    pub fn start(&mut self, model: impl Into<String>, rounds: u32) {
        self.reset(rounds);
        self.model = Some(model.into());
        self.running = true;
        debug!("Training started: {:?}, {} rounds", self.model, rounds);
    }

    /// Server announced a round
    pub fn round_started(&mut self, round: Option<u32>, model: Option<&str>) {
        if let Some(model) = model {
            self.model = Some(model.to_string());
        }
        self.running = true;
        self.complete = false;
        if let Some(round) = self.accepted_round(round) {
            self.track_round(round);
        }
    }

    /// Highest round a report may carry right now
    pub fn round_ceiling(&self) -> u32 {
        self.rounds
            .max(self.last_round.unwrap_or(0))
            .saturating_add(MAX_ROUND_LEAD)
    }

    fn accepted_round(&self, round: Option<u32>) -> Option<u32> {
        let round = round.filter(|r| *r > 0)?;
        if round > self.round_ceiling() {
            warn!(
                "Ignoring round {} (expected at most {})",
                round,
                self.round_ceiling()
            );
            return None;
        }
        Some(round)
    }

    fn track_round(&mut self, round: u32) {
        self.rounds = self.rounds.max(round);
        self.last_round = Some(self.last_round.map_or(round, |r| r.max(round)));
    }

    /// Record accuracy for a round; a missing value counts as zero
    pub fn record_accuracy(&mut self, round: Option<u32>, accuracy: Option<f64>) -> bool {
        let Some(round) = self.accepted_round(round) else {
            return false;
        };
        self.accuracy.insert(round, accuracy.unwrap_or(0.0));
        self.track_round(round);
        true
    }

    /// Record loss for a round; a missing value leaves a gap
    pub fn record_loss(&mut self, round: Option<u32>, loss: Option<f64>) -> bool {
        let Some(round) = self.accepted_round(round) else {
            return false;
        };
        match loss {
            Some(loss) => self.loss.insert(round, loss),
            None => self.loss.remove(&round),
        };
        self.track_round(round);
        true
    }

    /// Mark the run as finished
    pub fn complete(&mut self, rounds: Option<u32>, final_accuracy: Option<f64>) {
        self.running = false;
        self.complete = true;
        if let Some(rounds) = self.accepted_round(rounds) {
            self.rounds = self.rounds.max(rounds);
        }
        self.final_accuracy = final_accuracy.or_else(|| self.latest_accuracy());
    }

    /// `[round, accuracy]` points, skipping gaps
    pub fn accuracy_points(&self) -> Vec<[f64; 2]> {
        Self::points(&self.accuracy)
    }

    /// `[round, loss]` points, skipping gaps
    pub fn loss_points(&self) -> Vec<[f64; 2]> {
        Self::points(&self.loss)
    }

    fn points(series: &BTreeMap<u32, f64>) -> Vec<[f64; 2]> {
        series.iter().map(|(r, v)| [*r as f64, *v]).collect()
    }

    /// Accuracy of the highest recorded round
    pub fn latest_accuracy(&self) -> Option<f64> {
        self.accuracy.values().next_back().copied()
    }

    pub fn latest_loss(&self) -> Option<f64> {
        self.loss.values().next_back().copied()
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn last_round(&self) -> Option<u32> {
        self.last_round
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn final_accuracy(&self) -> Option<f64> {
        self.final_accuracy
    }

    /// Fraction of expected rounds with a recorded accuracy
    pub fn fraction_done(&self) -> f32 {
        if self.rounds == 0 {
            return 0.0;
        }
        let done = self.accuracy.len();
        (done as f32 / self.rounds as f32).min(1.0)
    }
}
