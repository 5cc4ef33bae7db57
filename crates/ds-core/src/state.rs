//! Flat state and control vectors.

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Control input vector, length `System::control_dim()`.
pub type Control = Vec<f64>;

/// Ordered sequence of 64-bit floats describing a system's state.
///
/// Component layout is system-dependent (a pendulum packs `[theta, omega]`,
/// an n-body system interleaves `[x, y, vx, vy]` per particle). Cloning is
/// always deep.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Vec<f64>);

impl State {
    /// Zero-filled state of dimension `n`.
    pub fn zeros(n: usize) -> Self {
        State(vec![0.0; n])
    }

    pub fn from_vec(v: Vec<f64>) -> Self {
        State(v)
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// True when every component is finite (no NaN or infinity).
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.0.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Elementwise sum. Components past the end of `other` pass through
    /// unchanged, so a shorter operand acts as zero-padding.
    pub fn add(&self, other: &State) -> State {
        let mut out = self.0.clone();
        for (o, v) in out.iter_mut().zip(other.0.iter()) {
            *o += v;
        }
        State(out)
    }

    /// Elementwise difference with the same padding rule as [`State::add`].
    pub fn sub(&self, other: &State) -> State {
        let mut out = self.0.clone();
        for (o, v) in out.iter_mut().zip(other.0.iter()) {
            *o -= v;
        }
        State(out)
    }

    /// Every component multiplied by `factor`.
    pub fn scale(&self, factor: f64) -> State {
        State(self.0.iter().map(|v| v * factor).collect())
    }
}

impl Deref for State {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl DerefMut for State {
    fn deref_mut(&mut self) -> &mut [f64] {
        &mut self.0
    }
}

impl From<Vec<f64>> for State {
    fn from(v: Vec<f64>) -> Self {
        State(v)
    }
}

impl FromIterator<f64> for State {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        State(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_detects_nan_and_inf() {
        assert!(State::from_vec(vec![1.0, -2.0, 0.0]).is_finite());
        assert!(!State::from_vec(vec![1.0, f64::NAN]).is_finite());
        assert!(!State::from_vec(vec![f64::INFINITY, 0.0]).is_finite());
    }

    #[test]
    fn norm_is_euclidean() {
        let s = State::from_vec(vec![3.0, 4.0]);
        assert!((s.norm() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn add_tolerates_shorter_operand() {
        let a = State::from_vec(vec![1.0, 2.0, 3.0]);
        let b = State::from_vec(vec![10.0]);
        assert_eq!(a.add(&b).as_slice(), &[11.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_state_ops() {
        let e = State::zeros(0);
        assert!(e.is_finite());
        assert_eq!(e.norm(), 0.0);
        assert_eq!(e.add(&e).len(), 0);
    }

    #[test]
    fn scale_and_sub() {
        let a = State::from_vec(vec![1.0, -2.0]);
        assert_eq!(a.scale(2.0).as_slice(), &[2.0, -4.0]);
        assert_eq!(a.sub(&a).as_slice(), &[0.0, 0.0]);
    }
}
