use crate::error::Result;
use crate::network::model::Model;
use crate::train::callbacks::monitor::Monitor;
use crate::train::callbacks::traits::{CallbackAction, CallbackContext, TrainerCallback};

/// Multiplies the learning rate by `factor` once the monitored quantity has
/// not improved by more than `min_delta` for `patience` epochs, then starts
/// counting again.
#[derive(Clone, Debug)]
pub struct ReduceLrOnPlateau {
    monitor: Monitor,
    factor: f64,
    patience: usize,
    min_delta: f64,
    min_lr: f64,
    best: f64,
    wait: usize,
}

impl ReduceLrOnPlateau {
    pub fn new(monitor: Monitor, factor: f64, patience: usize) -> Self {
        Self {
            monitor,
            factor,
            patience,
            min_delta: 1e-4,
            min_lr: 0.0,
            best: monitor.mode().initial(),
            wait: 0,
        }
    }

    pub fn with_min_lr(mut self, min_lr: f64) -> Self {
        self.min_lr = min_lr;
        self
    }

    /// Feeds one observation and the current learning rate; returns the
    /// learning rate to use next.
    pub fn observe(&mut self, current: f64, lr: f64) -> f64 {
        if self.monitor.mode().improved(current, self.best, self.min_delta) {
            self.best = current;
            self.wait = 0;
            return lr;
        }
        self.wait += 1;
        if self.wait >= self.patience {
            self.wait = 0;
            if lr > self.min_lr {
                return (lr * self.factor).max(self.min_lr);
            }
        }
        lr
    }
}

impl TrainerCallback for ReduceLrOnPlateau {
    fn on_train_begin(&mut self, _model: &dyn Model) -> Result<()> {
        self.best = self.monitor.mode().initial();
        self.wait = 0;
        Ok(())
    }

    fn on_epoch_end(&mut self, ctx: &mut CallbackContext<'_>) -> Result<CallbackAction> {
        let Some(current) = self.monitor.value(ctx.stats) else {
            tracing::warn!(monitor = self.monitor.name(), "lr reduction skipped: metric not available");
            return Ok(CallbackAction::Continue);
        };
        let new_lr = self.observe(current, ctx.learning_rate);
        if new_lr != ctx.learning_rate {
            tracing::info!(
                epoch = ctx.stats.epoch,
                "reducing learning rate {:.3e} -> {:.3e}",
                ctx.learning_rate,
                new_lr
            );
            ctx.learning_rate = new_lr;
        }
        Ok(CallbackAction::Continue)
    }

    fn name(&self) -> &'static str {
        "ReduceLrOnPlateau"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduces_after_patience_and_resets() {
        let mut r = ReduceLrOnPlateau::new(Monitor::ValLoss, 0.1, 2);
        let mut lr = 0.001;
        lr = r.observe(1.0, lr);
        lr = r.observe(1.0, lr);
        assert_eq!(lr, 0.001);
        lr = r.observe(1.0, lr);
        assert!((lr - 0.0001).abs() < 1e-12);
        lr = r.observe(1.0, lr);
        assert!((lr - 0.0001).abs() < 1e-12);
        lr = r.observe(1.0, lr);
        assert!((lr - 0.00001).abs() < 1e-12);
    }

    #[test]
    fn test_tiny_improvement_does_not_count() {
        let mut r = ReduceLrOnPlateau::new(Monitor::ValLoss, 0.5, 1);
        let lr = r.observe(1.0, 1.0);
        assert_eq!(r.observe(0.99995, lr), 0.5);
    }

    #[test]
    fn test_respects_min_lr() {
        let mut r = ReduceLrOnPlateau::new(Monitor::Loss, 0.1, 1).with_min_lr(0.05);
        r.observe(1.0, 0.1);
        assert_eq!(r.observe(1.0, 0.1), 0.05);
        assert_eq!(r.observe(1.0, 0.05), 0.05);
    }
}
