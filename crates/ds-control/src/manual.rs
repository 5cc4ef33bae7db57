//! Manually driven controller for interactive sessions.

use ds_core::{Control, Controller, State};
use std::sync::{Arc, Mutex};

/// Shared writer handle for the UI thread.
#[derive(Debug, Clone)]
pub struct ManualHandle {
    u: Arc<Mutex<Vec<f64>>>,
}

impl ManualHandle {
    /// Replace the control vector. Writes of the wrong length are ignored.
    pub fn set_control(&self, u: &[f64]) {
        let mut guard = self.u.lock().unwrap_or_else(|e| e.into_inner());
        if u.len() == guard.len() {
            guard.copy_from_slice(u);
        }
    }
}

/// Returns whatever was last written through its [`ManualHandle`],
/// verbatim. Defaults to a zeroed 3-vector `[x, y, strength]`.
#[derive(Debug)]
pub struct Manual {
    u: Arc<Mutex<Vec<f64>>>,
}

impl Manual {
    pub fn new() -> Self {
        Self::with_dim(3)
    }

    pub fn with_dim(dim: usize) -> Self {
        Self {
            u: Arc::new(Mutex::new(vec![0.0; dim])),
        }
    }

    pub fn handle(&self) -> ManualHandle {
        ManualHandle { u: self.u.clone() }
    }
}

impl Default for Manual {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for Manual {
    fn compute(&mut self, _x: &State, _t: f64) -> Control {
        self.u.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_written_vector() {
        let mut manual = Manual::new();
        let handle = manual.handle();
        handle.set_control(&[1.0, 2.0, 3.0]);
        assert_eq!(manual.compute(&State::zeros(2), 0.0), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn wrong_length_writes_are_ignored() {
        let mut manual = Manual::new();
        let handle = manual.handle();
        handle.set_control(&[1.0]);
        assert_eq!(manual.compute(&State::zeros(2), 0.0), vec![0.0; 3]);
    }

    #[test]
    fn handle_works_across_threads() {
        let mut manual = Manual::new();
        let handle = manual.handle();
        std::thread::spawn(move || handle.set_control(&[4.0, 5.0, 6.0]))
            .join()
            .unwrap();
        assert_eq!(manual.compute(&State::zeros(2), 0.0), vec![4.0, 5.0, 6.0]);
    }
}
