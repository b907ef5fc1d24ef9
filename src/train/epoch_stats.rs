use serde::{Serialize, Deserialize};

/// Per-epoch training statistics, recorded by `fit` after every epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Epoch budget of the run.
    pub total_epochs: usize,
    /// Mean training loss over the epoch's samples.
    pub loss: f64,
    /// Training accuracy as a fraction in [0, 1].
    pub accuracy: f64,
    /// Validation loss; `None` when no validation samples were held out.
    pub val_loss: Option<f64>,
    pub val_accuracy: Option<f64>,
    /// Learning rate in effect during this epoch.
    pub learning_rate: f64,
    /// Wall-clock duration of the epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// Everything `fit` recorded for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    pub epochs: Vec<EpochStats>,
    /// True when a callback ended the run before the epoch budget.
    pub stopped_early: bool,
}

impl History {
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn last(&self) -> Option<&EpochStats> {
        self.epochs.last()
    }

    /// Epoch with the lowest validation loss; earliest wins on ties.
    pub fn best_val_loss(&self) -> Option<&EpochStats> {
        self.epochs.iter()
            .filter(|s| s.val_loss.is_some_and(|v| !v.is_nan()))
            .fold(None, |best: Option<&EpochStats>, s| match best {
                Some(b) if b.val_loss <= s.val_loss => Some(b),
                _ => Some(s),
            })
    }
}
