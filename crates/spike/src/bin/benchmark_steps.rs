use rayon::prelude::*;
use slime_mold_core::{SimConfig, Simulation};
use std::time::{Duration, Instant};

struct SeedResult {
    seed: u64,
    steps: usize,
    volume: usize,
    stalled: bool,
    elapsed: Duration,
}

fn run_seed(base: &SimConfig, seed: u64, max_steps: usize) -> anyhow::Result<SeedResult> {
    let config = SimConfig {
        seed,
        ..base.clone()
    };
    let mut sim = Simulation::new(config)?;
    let start = Instant::now();
    let summary = sim.run(max_steps, max_steps.max(1))?;
    Ok(SeedResult {
        seed,
        steps: summary.steps_run,
        volume: summary.final_stats.volume,
        stalled: summary.stalled,
        elapsed: start.elapsed(),
    })
}

fn main() -> anyhow::Result<()> {
    let seeds: Vec<u64> = (0..16).collect();
    let max_steps = 500;
    let base = SimConfig {
        x_size: 160,
        y_size: 120,
        ..SimConfig::default()
    };
    println!(
        "Benchmarking {} independent runs on a {}x{} grid, up to {} steps each",
        seeds.len(),
        base.x_size,
        base.y_size,
        max_steps
    );

    // runs are independent; each one is stepped serially
    let wall = Instant::now();
    let results = seeds
        .par_iter()
        .map(|&seed| run_seed(&base, seed, max_steps))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let wall = wall.elapsed();

    let mut total_steps = 0;
    for r in &results {
        total_steps += r.steps;
        println!(
            "seed {:>3}: {:>4} steps, volume {:>5}, stalled {:<5} in {:?} ({:?}/step)",
            r.seed,
            r.steps,
            r.volume,
            r.stalled,
            r.elapsed,
            r.elapsed / r.steps.max(1) as u32
        );
    }
    println!("Wall time: {:?}", wall);
    println!(
        "Throughput: {:.1} steps/s",
        total_steps as f64 / wall.as_secs_f64().max(f64::EPSILON)
    );
    Ok(())
}
