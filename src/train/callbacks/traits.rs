//! Callback trait and the context handed to callbacks.

use crate::error::Result;
use crate::network::model::Model;
use crate::train::epoch_stats::EpochStats;

/// State passed to `on_epoch_end`.
///
/// `learning_rate` is writable: whatever a callback leaves here becomes the
/// optimizer's learning rate for the next epoch.
pub struct CallbackContext<'a> {
    pub stats: &'a EpochStats,
    pub model: &'a dyn Model,
    pub learning_rate: f64,
}

/// Action a callback requests after an epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    Continue,
    Stop,
}

/// Hook into `fit`. Errors abort the run.
pub trait TrainerCallback {
    /// Called once before the first epoch.
    fn on_train_begin(&mut self, _model: &dyn Model) -> Result<()> {
        Ok(())
    }

    /// Called after every epoch, once validation metrics are known.
    fn on_epoch_end(&mut self, ctx: &mut CallbackContext<'_>) -> Result<CallbackAction>;

    /// Callback name for logging.
    fn name(&self) -> &'static str;
}

/// Ordered set of callbacks, invoked in insertion order.
#[derive(Default)]
pub struct CallbackList {
    callbacks: Vec<Box<dyn TrainerCallback>>,
}

impl CallbackList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, callback: impl TrainerCallback + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn on_train_begin(&mut self, model: &dyn Model) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_train_begin(model)?;
        }
        Ok(())
    }

    /// Every callback sees the epoch; the run stops if any of them asks to.
    pub fn on_epoch_end(&mut self, ctx: &mut CallbackContext<'_>) -> Result<CallbackAction> {
        let mut action = CallbackAction::Continue;
        for cb in &mut self.callbacks {
            if cb.on_epoch_end(ctx)? == CallbackAction::Stop {
                tracing::debug!(callback = cb.name(), epoch = ctx.stats.epoch, "stop requested");
                action = CallbackAction::Stop;
            }
        }
        Ok(action)
    }
}
