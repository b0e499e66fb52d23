use std::fmt;

use serde::{Deserialize, Serialize};

/// Activation functions a network node can apply to its net input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activation {
    /// f(x) = x
    Identity,
    /// f(x) = max(0, x)
    ReLU,
    /// f(x) = 1 / (1 + e^-x)
    Sigmoid,
    /// f(x) = tanh(x)
    Tanh,
    /// f(x) = e^(-x^2)
    Gaussian,
    /// Normalized exponentials over a whole layer. Only meaningful for the
    /// output vector, a single node cannot use it.
    Softmax,
}

impl Activation {
    /// Whether the activation can be computed from one value alone.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Activation::Softmax)
    }

    /// Applies the activation to a single value. Softmax of a single value
    /// is always 1.
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Identity => x,
            Activation::ReLU => x.max(0.0),
            Activation::Sigmoid => 1. / (1. + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Gaussian => (-x * x).exp(),
            Activation::Softmax => 1.0,
        }
    }

    /// Applies the activation across a layer.
    pub fn apply_all(&self, values: &[f64]) -> Vec<f64> {
        match self {
            Activation::Softmax => {
                if values.is_empty() {
                    return Vec::new();
                }
                // shift by the max so large inputs do not overflow
                let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let exps: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
                let sum: f64 = exps.iter().sum();
                exps.into_iter().map(|e| e / sum).collect()
            }
            scalar => values.iter().map(|&v| scalar.apply(v)).collect(),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
