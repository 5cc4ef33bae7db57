//! Linear spring-mass systems: a single mass or a wall-to-wall chain.

use ds_core::{Hamiltonian, State, System};

const DEFAULT_MASS: f64 = 1.0;
const DEFAULT_STIFFNESS: f64 = 10.0;
const DEFAULT_DAMPING: f64 = 0.5;

/// `n` masses in series between two walls. State `[x_0..x_{n-1},
/// v_0..v_{n-1}]`; control `[external force on mass 0]`. `stiffness` holds
/// `n + 1` spring constants (including the right wall spring); a single-mass
/// system omits the right wall.
#[derive(Debug, Clone)]
pub struct SpringMass {
    pub num_masses: usize,
    pub masses: Vec<f64>,
    pub stiffness: Vec<f64>,
    pub damping: Vec<f64>,
}

impl SpringMass {
    /// One mass on one spring.
    pub fn new() -> Self {
        Self {
            num_masses: 1,
            masses: vec![DEFAULT_MASS],
            stiffness: vec![DEFAULT_STIFFNESS],
            damping: vec![DEFAULT_DAMPING],
        }
    }

    /// `n` masses with springs to both walls.
    pub fn chain(n: usize) -> Self {
        Self {
            num_masses: n,
            masses: vec![DEFAULT_MASS; n],
            stiffness: vec![DEFAULT_STIFFNESS; n + 1],
            damping: vec![0.2; n],
        }
    }
}

impl Default for SpringMass {
    fn default() -> Self {
        Self::new()
    }
}

impl System for SpringMass {
    fn state_dim(&self) -> usize {
        self.num_masses * 2
    }

    fn control_dim(&self) -> usize {
        1
    }

    fn derive(&mut self, x: &State, u: &[f64], _t: f64) -> State {
        let n = self.num_masses;
        let mut dx = State::zeros(n * 2);

        for i in 0..n {
            dx[i] = x[n + i];
        }

        let ext_force = u.first().copied().unwrap_or(0.0);

        for i in 0..n {
            let (pos, vel) = (x[i], x[n + i]);

            let force_left = if i == 0 {
                -self.stiffness[0] * pos
            } else {
                -self.stiffness[i] * (pos - x[i - 1])
            };

            let force_right = if i == n - 1 {
                if self.stiffness.len() > n {
                    -self.stiffness[n] * pos
                } else {
                    0.0
                }
            } else {
                -self.stiffness[i + 1] * (pos - x[i + 1])
            };

            let mut total = force_left + force_right - self.damping[i] * vel;
            if i == 0 {
                total += ext_force;
            }
            dx[n + i] = total / self.masses[i];
        }

        dx
    }

    fn as_hamiltonian(&self) -> Option<&dyn Hamiltonian> {
        Some(self)
    }
}

impl Hamiltonian for SpringMass {
    fn energy(&self, x: &State) -> f64 {
        let n = self.num_masses;
        let mut energy = 0.0;

        for i in 0..n {
            let v = x[n + i];
            energy += 0.5 * self.masses[i] * v * v;
        }

        for i in 0..n {
            let pos = x[i];
            if i == 0 {
                energy += 0.5 * self.stiffness[0] * pos * pos;
            } else {
                let stretch = pos - x[i - 1];
                energy += 0.5 * self.stiffness[i] * stretch * stretch;
            }
        }

        if self.stiffness.len() > n {
            energy += 0.5 * self.stiffness[n] * x[n - 1] * x[n - 1];
        }

        energy
    }
}
