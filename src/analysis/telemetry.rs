use crate::store::NodeId;
use serde::{Deserialize, Serialize};

/// What one training step looked at and what it chose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Net layer of the selected neuron (>= 1).
    pub layer: usize,
    pub neuron: NodeId,
    /// Empirical loss of each candidate, in the order the neighborhood produced them.
    pub losses: Vec<f64>,
    /// Index of the installed candidate.
    pub chosen: usize,
}

impl StepRecord {
    /// Loss of the installed candidate. `None` if `chosen` is out of range.
    pub fn chosen_loss(&self) -> Option<f64> { self.losses.get(self.chosen).copied() }

    /// Whether the step installed something other than the first candidate.
    pub fn changed(&self) -> bool { self.chosen != 0 }

    /// Whether the installed candidate beat the first candidate.
    pub fn improved(&self) -> bool {
        match (self.chosen_loss(), self.losses.first()) {
            (Some(chosen), Some(&first)) => chosen < first,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub steps: Vec<StepRecord>,
    /// Empirical loss after the last step, when requested.
    pub final_loss: Option<f64>,
}

impl TrainingReport {
    pub fn iterations(&self) -> usize { self.steps.len() }

    pub fn changed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.changed()).count()
    }

    pub fn improving_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.improved()).count()
    }

    /// The loss of the net right after each step. Malformed records are skipped.
    pub fn loss_history(&self) -> Vec<f64> {
        self.steps.iter().filter_map(StepRecord::chosen_loss).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(losses: &[f64], chosen: usize) -> StepRecord {
        StepRecord { layer: 1, neuron: NodeId(0), losses: losses.to_vec(), chosen }
    }

    #[test]
    fn test_report_counters() {
        let report = TrainingReport {
            steps: vec![step(&[0.5, 0.25, 0.5], 1), step(&[0.25, 0.25], 0), step(&[0.25, 0.25, 0.0], 2)],
            final_loss: Some(0.0),
        };
        assert_eq!(report.iterations(), 3);
        assert_eq!(report.changed_steps(), 2);
        assert_eq!(report.improving_steps(), 2);
        assert_eq!(report.loss_history(), vec![0.25, 0.25, 0.0]);
    }

    #[test]
    fn test_malformed_records_do_not_panic() {
        let record: StepRecord =
            serde_json::from_str(r#"{"layer": 1, "neuron": 0, "losses": [], "chosen": 3}"#).unwrap();
        assert_eq!(record.chosen_loss(), None);
        assert!(!record.improved());

        let report = TrainingReport { steps: vec![record, step(&[0.5, 0.0], 1)], final_loss: None };
        assert_eq!(report.loss_history(), vec![0.0]);
        assert_eq!(report.improving_steps(), 1);
    }

    #[test]
    fn test_report_serializes() {
        let report = TrainingReport { steps: vec![step(&[1.0, 0.0], 1)], final_loss: None };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["steps"][0]["neuron"], 0);
        assert_eq!(json["steps"][0]["chosen"], 1);
        assert!(json["final_loss"].is_null());
    }
}
