//! ds-systems: right-hand sides `dx/dt = f(x, u, t)` for the simulation lab.
//!
//! Every model declares its state and control dimensions and a pure
//! `derive`; several additionally expose a conserved energy, tunable
//! parameters, or a generated default state.

mod attractors;
mod cartpole;
mod coupled_pendulums;
mod double_pendulum;
mod double_well;
mod drone;
mod gyroscope;
mod hybrid;
mod magnetic_pendulum;
mod mass_chain;
mod nbody;
mod pendulum;
mod spatial_hash;
mod sph;
mod spring_mass;
mod three_body;
mod wave;

pub use attractors::{Duffing, Lorenz, Rossler, VanDerPol};
pub use cartpole::CartPole;
pub use coupled_pendulums::CoupledPendulums;
pub use double_pendulum::DoublePendulum;
pub use double_well::DoubleWell;
pub use drone::Drone;
pub use gyroscope::Gyroscope;
pub use hybrid::Hybrid;
pub use magnetic_pendulum::{Magnet, MagneticPendulum};
pub use mass_chain::MassChain;
pub use nbody::NBody;
pub use pendulum::Pendulum;
pub use spatial_hash::SpatialHash;
pub use sph::Sph;
pub use spring_mass::SpringMass;
pub use three_body::ThreeBody;
pub use wave::Wave;
