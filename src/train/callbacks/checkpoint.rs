use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::network::model::Model;
use crate::train::callbacks::monitor::Monitor;
use crate::train::callbacks::traits::{CallbackAction, CallbackContext, TrainerCallback};

/// Writes the model weights to `path` whenever the monitored quantity
/// reaches a new best, overwriting the previous file.
///
/// The file is also written once before training so it exists even if no
/// epoch ever improves.
pub struct ModelCheckpoint {
    path: PathBuf,
    monitor: Monitor,
    best: f64,
    best_epoch: Option<usize>,
}

impl ModelCheckpoint {
    pub fn new(path: impl Into<PathBuf>, monitor: Monitor) -> Self {
        Self {
            path: path.into(),
            monitor,
            best: monitor.mode().initial(),
            best_epoch: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Epoch whose weights are currently on disk (`None`: initial weights).
    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }
}

impl TrainerCallback for ModelCheckpoint {
    fn on_train_begin(&mut self, model: &dyn Model) -> Result<()> {
        self.best = self.monitor.mode().initial();
        self.best_epoch = None;
        model.save_weights(&self.path)
    }

    fn on_epoch_end(&mut self, ctx: &mut CallbackContext<'_>) -> Result<CallbackAction> {
        let Some(current) = self.monitor.value(ctx.stats) else {
            tracing::warn!(monitor = self.monitor.name(), "checkpoint skipped: metric not available");
            return Ok(CallbackAction::Continue);
        };
        if self.monitor.mode().improved(current, self.best, 0.0) {
            tracing::debug!(
                epoch = ctx.stats.epoch,
                "{} improved from {:.5} to {:.5}, saving {}",
                self.monitor.name(),
                self.best,
                current,
                self.path.display()
            );
            self.best = current;
            self.best_epoch = Some(ctx.stats.epoch);
            ctx.model.save_weights(&self.path)?;
        }
        Ok(CallbackAction::Continue)
    }

    fn name(&self) -> &'static str {
        "ModelCheckpoint"
    }
}
