use std::time::Instant;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::error::{HarnessError, Result};
use crate::math::matrix::Matrix;
use crate::network::model::Model;
use crate::train::callbacks::{CallbackAction, CallbackContext, CallbackList};
use crate::train::compile::Compiled;
use crate::train::epoch_stats::{EpochStats, History};
use crate::train::train_config::FitConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `model` with mini-batch gradient descent and returns the per-epoch
/// history.
///
/// # Arguments
/// - `model`    : trained in place
/// - `compiled` : loss, optimizer and metric; the optimizer's learning rate
///                 may be changed by callbacks
/// - `features` : one feature vector per sample; with
///                 `config.input_copies > 1` the same vector feeds every branch
/// - `labels`   : target rows, same length as `features`
/// - `config`   : epochs, batch size, shuffling, validation split
/// - `callbacks`: invoked before training and after every epoch
///
/// The last `validation_split` fraction of the samples (before shuffling) is
/// held out and only evaluated, never trained on. The loop ends after
/// `config.epochs` epochs or when a callback returns `Stop`.
pub fn fit(
    model: &mut dyn Model,
    compiled: &mut Compiled,
    features: &[Vec<f64>],
    labels: &[Vec<f64>],
    config: &FitConfig,
    callbacks: &mut CallbackList,
) -> Result<History> {
    check_fit_inputs(&*model, features, labels, config)?;

    let split_at = validation_boundary(features.len(), config.validation_split);
    let (train_x, val_x) = features.split_at(split_at);
    let (train_y, val_y) = labels.split_at(split_at);
    if train_x.is_empty() {
        return Err(HarnessError::invalid_input(format!(
            "validation split {} leaves no training samples out of {}",
            config.validation_split,
            features.len()
        )));
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    tracing::debug!(
        train = train_x.len(),
        validation = val_x.len(),
        epochs = config.epochs,
        batch_size = config.batch_size,
        "starting fit"
    );

    callbacks.on_train_begin(&*model)?;
    let mut history = History::default();

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();
        let learning_rate = compiled.optimizer.learning_rate();

        // ── One full pass over the training data ───────────────────────────
        let (loss, accuracy) = run_one_epoch(model, compiled, train_x, train_y, config, &mut rng);

        // ── Validation ────────────────────────────────────────────────────
        let (val_loss, val_accuracy) = if val_x.is_empty() {
            (None, None)
        } else {
            let (l, a) = compiled.evaluate(&*model, val_x, val_y, config.input_copies);
            (Some(l), Some(a))
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            loss,
            accuracy,
            val_loss,
            val_accuracy,
            learning_rate,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        tracing::debug!(
            epoch,
            loss,
            accuracy,
            val_loss = ?val_loss,
            val_accuracy = ?val_accuracy,
            learning_rate,
            "epoch finished"
        );

        // ── Callbacks ─────────────────────────────────────────────────────
        let mut ctx = CallbackContext { stats: &stats, model: &*model, learning_rate };
        let action = callbacks.on_epoch_end(&mut ctx)?;
        compiled.optimizer.set_learning_rate(ctx.learning_rate);

        history.epochs.push(stats);
        if action == CallbackAction::Stop {
            history.stopped_early = true;
            break;
        }
    }

    Ok(history)
}

/// Index where the validation tail starts: `floor(n · (1 - split))`.
pub fn validation_boundary(n_samples: usize, validation_split: f64) -> usize {
    if validation_split <= 0.0 {
        return n_samples;
    }
    (n_samples as f64 * (1.0 - validation_split)) as usize
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn check_fit_inputs(
    model: &dyn Model,
    features: &[Vec<f64>],
    labels: &[Vec<f64>],
    config: &FitConfig,
) -> Result<()> {
    if features.is_empty() {
        return Err(HarnessError::invalid_input("no training samples"));
    }
    if features.len() != labels.len() {
        return Err(HarnessError::shape(format!(
            "{} feature vectors but {} label rows",
            features.len(),
            labels.len()
        )));
    }
    if config.batch_size == 0 {
        return Err(HarnessError::invalid_input("batch_size must be at least 1"));
    }
    if !(0.0..1.0).contains(&config.validation_split) {
        return Err(HarnessError::invalid_input(format!(
            "validation split must be in [0, 1), got {}",
            config.validation_split
        )));
    }
    if model.branch_count() != config.input_copies {
        return Err(HarnessError::shape(format!(
            "model has {} input branches but {} input copies were requested",
            model.branch_count(),
            config.input_copies
        )));
    }
    let width = features[0].len();
    if let Some(b) = model.input_sizes().iter().position(|&w| w != width) {
        return Err(HarnessError::shape(format!(
            "branch {b} expects {} features, samples have {width}",
            model.input_sizes()[b]
        )));
    }
    if let Some(row) = features.iter().position(|f| f.len() != width) {
        return Err(HarnessError::shape(format!("sample {row} has {} features, expected {width}", features[row].len())));
    }
    let out = model.output_size();
    if let Some(row) = labels.iter().position(|y| y.len() != out) {
        return Err(HarnessError::shape(format!(
            "label row {row} has width {}, model outputs {out}",
            labels[row].len()
        )));
    }
    Ok(())
}

/// One epoch of mini-batch updates. Returns (mean loss, metric) over the
/// outputs seen during the pass.
fn run_one_epoch(
    model: &mut dyn Model,
    compiled: &mut Compiled,
    inputs: &[Vec<f64>],
    labels: &[Vec<f64>],
    config: &FitConfig,
    rng: &mut StdRng,
) -> (f64, f64) {
    let n = inputs.len();
    let mut total_loss = 0.0;
    let mut outputs = Vec::with_capacity(n);
    let mut targets = Vec::with_capacity(n);

    let mut indices: Vec<usize> = (0..n).collect();
    if config.shuffle {
        indices.shuffle(rng);
    }

    for batch in indices.chunks(config.batch_size) {
        let mut acc_grads: Vec<Matrix> = model.parameters()
            .into_iter()
            .map(Matrix::zeros_like)
            .collect();

        for &idx in batch {
            let views = vec![inputs[idx].as_slice(); config.input_copies];
            let output = model.forward(&views);

            total_loss += compiled.loss.loss(&output, &labels[idx]);
            let error = compiled.loss.derivative(&output, &labels[idx]);
            for (acc, g) in acc_grads.iter_mut().zip(model.backward(&error)) {
                acc.add_assign(&g);
            }

            outputs.push(output);
            targets.push(labels[idx].clone());
        }

        let inv_batch = 1.0 / batch.len() as f64;
        for g in &mut acc_grads {
            g.iter_mut().for_each(|x| *x *= inv_batch);
        }
        compiled.optimizer.step(&mut model.parameters_mut(), &acc_grads);
    }

    (total_loss / n as f64, compiled.score(&outputs, &targets))
}
