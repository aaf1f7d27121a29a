use contact_tracing_sim::{ModelParameters, Simulation};
use criterion::{criterion_group, criterion_main, Criterion};

static SEED: u64 = 123;
static DAYS: u32 = 100;

fn parameters(app_percent_usage: f64) -> ModelParameters {
    ModelParameters {
        population_size: 2000,
        interaction_amount: 5,
        spread_rate: 0.05,
        app_percent_usage,
        covid_percent_start: 0.05,
    }
}

fn run_simulation(app_percent_usage: f64) -> Simulation {
    let mut simulation =
        Simulation::new(&parameters(app_percent_usage), SEED).expect("valid parameters");
    simulation.run(DAYS);
    simulation
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("simulation no app", |bencher| {
        bencher.iter_with_large_drop(|| run_simulation(0.0))
    });
    c.bench_function("simulation full app usage", |bencher| {
        bencher.iter_with_large_drop(|| run_simulation(1.0))
    });
}

criterion_group!(simulation_benches, criterion_benchmark);
criterion_main!(simulation_benches);
