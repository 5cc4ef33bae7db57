use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ds_core::{Integrator, State, System};
use ds_integrators::{Euler, Leapfrog, Rk4, Rk45, VelocityVerlet};

/// Chain of coupled oscillators, sized to make derivative cost visible.
struct Chain {
    n: usize,
}

impl System for Chain {
    fn state_dim(&self) -> usize {
        self.n * 2
    }
    fn control_dim(&self) -> usize {
        0
    }
    fn derive(&mut self, x: &State, _u: &[f64], _t: f64) -> State {
        let n = self.n;
        let mut dx = State::zeros(n * 2);
        for i in 0..n {
            dx[i] = x[n + i];
            let left = if i > 0 { x[i - 1] } else { 0.0 };
            let right = if i < n - 1 { x[i + 1] } else { 0.0 };
            dx[n + i] = left - 2.0 * x[i] + right;
        }
        dx
    }
}

fn bench_steppers(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    let x: State = (0..64).map(|i| (i as f64 * 0.1).sin()).collect();

    group.bench_function("euler", |b| {
        let mut sys = Chain { n: 32 };
        let mut euler = Euler::new();
        b.iter(|| euler.step(&mut sys, black_box(&x), &[], 0.0, 0.01).unwrap());
    });
    group.bench_function("rk4", |b| {
        let mut sys = Chain { n: 32 };
        let mut rk4 = Rk4::new();
        b.iter(|| rk4.step(&mut sys, black_box(&x), &[], 0.0, 0.01).unwrap());
    });
    group.bench_function("rk45", |b| {
        let mut sys = Chain { n: 32 };
        let mut rk45 = Rk45::new();
        b.iter(|| rk45.step(&mut sys, black_box(&x), &[], 0.0, 0.01).unwrap());
    });
    group.bench_function("verlet", |b| {
        let mut sys = Chain { n: 32 };
        let mut verlet = VelocityVerlet::new();
        b.iter(|| verlet.step(&mut sys, black_box(&x), &[], 0.0, 0.01).unwrap());
    });
    group.bench_function("leapfrog", |b| {
        let mut sys = Chain { n: 32 };
        let mut leapfrog = Leapfrog::new();
        b.iter(|| leapfrog.step(&mut sys, black_box(&x), &[], 0.0, 0.01).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_steppers);
criterion_main!(benches);
