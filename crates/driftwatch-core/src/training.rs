//! L2-regularized logistic regression fitted with Newton's method.
//!
//! The objective matches a liblinear-style primal: the intercept is treated
//! as an extra feature with constant value 1 and is regularized with the
//! weights.
//!
//!   f(w) = ½‖w‖² + C · Σ log(1 + exp(−yᵢ · wᵀxᵢ)),   yᵢ ∈ {−1, +1}

use crate::config::{Config, TrainingConfig};
use crate::dataset::{Dataset, FEATURE_COLUMNS};
use crate::error::{PipelineError, Result};
use crate::model::{sigmoid, LogisticModel};
use crate::paths;
use crate::scoring::f1_score;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

const DIM: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub train_rows: usize,
    pub holdout_rows: usize,
    pub holdout_f1: Option<f64>,
    pub iterations: u32,
    pub converged: bool,
    pub model_path: PathBuf,
}

/// Fit a model on the consolidated dataset and write it to staging.
pub fn train(cfg: &Config) -> Result<TrainReport> {
    let dataset = Dataset::read(&paths::final_data_path(cfg))?;
    let x = dataset.features()?;
    let y = dataset.labels()?;

    let (train_idx, holdout_idx) = split_indices(x.len(), &cfg.training);
    let train_x: Vec<[f64; 3]> = train_idx.iter().map(|&i| x[i]).collect();
    let train_y: Vec<u8> = train_idx.iter().map(|&i| y[i]).collect();

    let fit = fit(&train_x, &train_y, &cfg.training)?;
    let mut model = LogisticModel {
        features: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        weights: fit.weights.to_vec(),
        intercept: fit.intercept,
        hyperparameters: cfg.training.clone(),
        holdout_f1: None,
        iterations: fit.iterations,
        trained_at: Utc::now(),
    };

    if !holdout_idx.is_empty() {
        let hx: Vec<[f64; 3]> = holdout_idx.iter().map(|&i| x[i]).collect();
        let hy: Vec<u8> = holdout_idx.iter().map(|&i| y[i]).collect();
        model.holdout_f1 = Some(f1_score(&hy, &model.predict(&hx))?);
    }

    let model_path = paths::staging_model_path(cfg);
    model.save(&model_path)?;

    info!(
        train_rows = train_idx.len(),
        holdout_rows = holdout_idx.len(),
        holdout_f1 = ?model.holdout_f1,
        iterations = fit.iterations,
        path = %model_path.display(),
        "model trained"
    );

    Ok(TrainReport {
        train_rows: train_idx.len(),
        holdout_rows: holdout_idx.len(),
        holdout_f1: model.holdout_f1,
        iterations: fit.iterations,
        converged: fit.converged,
        model_path,
    })
}

/// Seeded shuffle, then the first `ceil(n · test_size)` indices form the
/// holdout and the rest the training partition.
pub fn split_indices(n: usize, cfg: &TrainingConfig) -> (Vec<usize>, Vec<usize>) {
    let mut idx: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    idx.shuffle(&mut rng);
    let n_holdout = ((n as f64) * cfg.test_size).ceil() as usize;
    let n_holdout = n_holdout.min(n.saturating_sub(1));
    let train = idx.split_off(n_holdout);
    (train, idx)
}

#[derive(Debug, Clone)]
pub struct Fit {
    pub weights: [f64; 3],
    pub intercept: f64,
    pub iterations: u32,
    pub converged: bool,
}

pub fn fit(x: &[[f64; 3]], y: &[u8], cfg: &TrainingConfig) -> Result<Fit> {
    if x.is_empty() {
        return Err(PipelineError::DataSchema(
            "cannot train on an empty dataset".to_string(),
        ));
    }
    if x.len() != y.len() {
        return Err(PipelineError::DataSchema(format!(
            "{} feature rows but {} labels",
            x.len(),
            y.len()
        )));
    }

    let rows: Vec<([f64; DIM], f64)> = x
        .iter()
        .zip(y)
        .map(|(r, &label)| {
            let sign = if label == 1 { 1.0 } else { -1.0 };
            ([r[0], r[1], r[2], 1.0], sign)
        })
        .collect();

    let c = cfg.c;
    let mut w = [0.0; DIM];
    let mut f = objective(&rows, &w, c);
    let g0 = norm(&gradient(&rows, &w, c));
    let mut iterations = 0;
    let mut converged = g0 == 0.0;

    while !converged && iterations < cfg.max_iter {
        let g = gradient(&rows, &w, c);
        if norm(&g) <= cfg.tol * g0 {
            converged = true;
            break;
        }
        let h = hessian(&rows, &w, c);
        let neg_g = g.map(|v| -v);
        let Some(step) = solve(h, neg_g) else {
            warn!("singular Hessian, stopping early");
            break;
        };

        // Backtracking line search (Armijo).
        let slope: f64 = g.iter().zip(step.iter()).map(|(a, b)| a * b).sum();
        let mut alpha = 1.0;
        loop {
            let candidate = add_scaled(&w, &step, alpha);
            let fc = objective(&rows, &candidate, c);
            if fc <= f + 1e-4 * alpha * slope || alpha < 1e-10 {
                w = candidate;
                f = fc;
                break;
            }
            alpha *= 0.5;
        }
        iterations += 1;
        debug!(iteration = iterations, objective = f, alpha, "newton step");
    }

    if !converged && norm(&gradient(&rows, &w, c)) <= cfg.tol * g0 {
        converged = true;
    }
    if !converged {
        warn!(iterations, "logistic regression did not converge");
    }

    Ok(Fit {
        weights: [w[0], w[1], w[2]],
        intercept: w[3],
        iterations,
        converged,
    })
}

fn dot(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn norm(v: &[f64; DIM]) -> f64 {
    dot(v, v).sqrt()
}

fn add_scaled(w: &[f64; DIM], d: &[f64; DIM], alpha: f64) -> [f64; DIM] {
    let mut out = *w;
    for (o, di) in out.iter_mut().zip(d.iter()) {
        *o += alpha * di;
    }
    out
}

/// log(1 + exp(-m)) without overflow.
fn log_loss(margin: f64) -> f64 {
    if margin > 0.0 {
        (-margin).exp().ln_1p()
    } else {
        -margin + margin.exp().ln_1p()
    }
}

fn objective(rows: &[([f64; DIM], f64)], w: &[f64; DIM], c: f64) -> f64 {
    let reg = 0.5 * dot(w, w);
    let loss: f64 = rows.iter().map(|(x, y)| log_loss(y * dot(w, x))).sum();
    reg + c * loss
}

fn gradient(rows: &[([f64; DIM], f64)], w: &[f64; DIM], c: f64) -> [f64; DIM] {
    let mut g = *w;
    for (x, y) in rows {
        let coef = c * (sigmoid(y * dot(w, x)) - 1.0) * y;
        for (gi, xi) in g.iter_mut().zip(x.iter()) {
            *gi += coef * xi;
        }
    }
    g
}

fn hessian(rows: &[([f64; DIM], f64)], w: &[f64; DIM], c: f64) -> [[f64; DIM]; DIM] {
    let mut h = [[0.0; DIM]; DIM];
    for (i, row) in h.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    for (x, _) in rows {
        let p = sigmoid(dot(w, x));
        let d = c * p * (1.0 - p);
        for i in 0..DIM {
            for j in 0..DIM {
                h[i][j] += d * x[i] * x[j];
            }
        }
    }
    h
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: [[f64; DIM]; DIM], mut b: [f64; DIM]) -> Option<[f64; DIM]> {
    for col in 0..DIM {
        let pivot = (col..DIM).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-300 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..DIM {
            let factor = a[row][col] / a[col][col];
            for k in col..DIM {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = [0.0; DIM];
    for row in (0..DIM).rev() {
        let tail: f64 = (row + 1..DIM).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
