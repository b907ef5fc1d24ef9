use crate::error::Result;
use crate::network::model::Model;
use crate::train::callbacks::monitor::Monitor;
use crate::train::callbacks::traits::{CallbackAction, CallbackContext, TrainerCallback};

/// Stops training when the monitored quantity has not improved for
/// `patience` consecutive epochs.
#[derive(Clone, Debug)]
pub struct EarlyStopping {
    monitor: Monitor,
    patience: usize,
    min_delta: f64,
    best: f64,
    wait: usize,
}

impl EarlyStopping {
    pub fn new(monitor: Monitor, patience: usize) -> Self {
        Self {
            monitor,
            patience,
            min_delta: 0.0,
            best: monitor.mode().initial(),
            wait: 0,
        }
    }

    pub fn with_min_delta(mut self, min_delta: f64) -> Self {
        self.min_delta = min_delta;
        self
    }

    /// Epochs since the last improvement.
    pub fn wait(&self) -> usize {
        self.wait
    }

    /// Feeds one observation; returns the resulting action.
    pub fn observe(&mut self, current: f64) -> CallbackAction {
        self.wait += 1;
        if self.monitor.mode().improved(current, self.best, self.min_delta) {
            self.best = current;
            self.wait = 0;
        }
        if self.wait >= self.patience {
            CallbackAction::Stop
        } else {
            CallbackAction::Continue
        }
    }
}

impl TrainerCallback for EarlyStopping {
    fn on_train_begin(&mut self, _model: &dyn Model) -> Result<()> {
        self.best = self.monitor.mode().initial();
        self.wait = 0;
        Ok(())
    }

    fn on_epoch_end(&mut self, ctx: &mut CallbackContext<'_>) -> Result<CallbackAction> {
        let Some(current) = self.monitor.value(ctx.stats) else {
            tracing::warn!(monitor = self.monitor.name(), "early stopping skipped: metric not available");
            return Ok(CallbackAction::Continue);
        };
        let action = self.observe(current);
        if action == CallbackAction::Stop {
            tracing::info!(
                epoch = ctx.stats.epoch,
                "early stopping: no {} improvement for {} epochs (best {:.5})",
                self.monitor.name(),
                self.patience,
                self.best
            );
        }
        Ok(action)
    }

    fn name(&self) -> &'static str {
        "EarlyStopping"
    }
}
