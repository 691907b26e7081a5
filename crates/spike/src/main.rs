use anyhow::{Context, Result};
use clap::Parser;
use slime_mold_core::render::render_ascii;
use slime_mold_core::{SimConfig, Simulation};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Grow a slime-mold colony headlessly until it stalls or runs out of steps.
#[derive(Parser, Debug)]
#[command(name = "slime-mold", version)]
struct Args {
    /// JSON config file; missing keys take defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    height: Option<usize>,
    #[arg(long, default_value_t = 1000)]
    max_steps: usize,
    #[arg(long, default_value_t = 10)]
    sample_every: usize,
    /// Print the final grid as text.
    #[arg(long)]
    render: bool,
    /// Print the run summary as JSON instead of a one-line report.
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            SimConfig::from_json_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.x_size = width;
    }
    if let Some(height) = args.height {
        config.y_size = height;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("slime_mold_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    tracing::info!(
        seed = config.seed,
        x_size = config.x_size,
        y_size = config.y_size,
        "starting simulation"
    );

    let mut sim = Simulation::new(config).context("building simulation")?;
    let summary = sim
        .run(args.max_steps, args.sample_every)
        .context("running simulation")?;

    if args.render {
        print!("{}", render_ascii(sim.grid()));
    }
    if args.json {
        println!("{}", summary.to_json()?);
    } else {
        let stats = &summary.final_stats;
        println!(
            "steps={} stalled={} volume={} connected_food={} active={}",
            summary.steps_run,
            summary.stalled,
            stats.volume,
            stats.connected_food_sources,
            stats.active_cells
        );
    }
    Ok(())
}
