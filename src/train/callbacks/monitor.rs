use serde::{Serialize, Deserialize};

use crate::train::epoch_stats::EpochStats;

/// Quantity a callback watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Monitor {
    Loss,
    Accuracy,
    ValLoss,
    ValAccuracy,
}

/// Direction in which a monitored quantity improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Min,
    Max,
}

impl Monitor {
    pub fn value(self, stats: &EpochStats) -> Option<f64> {
        match self {
            Monitor::Loss => Some(stats.loss),
            Monitor::Accuracy => Some(stats.accuracy),
            Monitor::ValLoss => stats.val_loss,
            Monitor::ValAccuracy => stats.val_accuracy,
        }
    }

    pub fn mode(self) -> Mode {
        match self {
            Monitor::Loss | Monitor::ValLoss => Mode::Min,
            Monitor::Accuracy | Monitor::ValAccuracy => Mode::Max,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Monitor::Loss => "loss",
            Monitor::Accuracy => "accuracy",
            Monitor::ValLoss => "val_loss",
            Monitor::ValAccuracy => "val_accuracy",
        }
    }
}

impl Mode {
    /// Worst possible value; anything finite improves on it.
    pub fn initial(self) -> f64 {
        match self {
            Mode::Min => f64::INFINITY,
            Mode::Max => f64::NEG_INFINITY,
        }
    }

    /// True when `current` beats `best` by more than `min_delta`.
    pub fn improved(self, current: f64, best: f64, min_delta: f64) -> bool {
        match self {
            Mode::Min => current < best - min_delta,
            Mode::Max => current > best + min_delta,
        }
    }
}
