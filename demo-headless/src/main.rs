use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wildfire_sim_core::fluid::AdvectionScheme;
use wildfire_sim_core::{FireSimulation, QualityPreset, SimResult, WindDirection};

/// Headless fire/smoke and wildfire run with periodic reports
#[derive(Parser, Debug)]
#[command(name = "demo-headless")]
#[command(about = "Fluid solver and wildfire automaton without a window", long_about = None)]
struct Args {
    /// Number of ticks to run
    #[arg(short, long, default_value_t = 200)]
    ticks: u64,

    /// Tick length in seconds
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Grid resolution preset (low, medium, high)
    #[arg(short, long, default_value = "low")]
    preset: QualityPreset,

    /// Wind the fire spreads with (calm, N, S, E, W, NE, NW, SE, SW)
    #[arg(short, long, default_value = "calm")]
    wind: WindDirection,

    /// Seed for terrain, wind noise, climate and cell rolls
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Override the preset's scalar advection (semi-lagrangian, bfecc, maccormack)
    #[arg(long)]
    scheme: Option<AdvectionScheme>,

    /// Override the fluid grid's cells per axis
    #[arg(long)]
    fluid_size: Option<u32>,

    /// Override the wildfire grid as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_extent)]
    terrain: Option<(u32, u32)>,

    /// Cells to set alight at the start, as X,Y (default: grid centre)
    #[arg(short, long, value_parser = parse_cell)]
    ignite: Vec<(u32, u32)>,

    /// Cells struck every tick, as X,Y
    #[arg(long, value_parser = parse_cell)]
    lightning: Vec<(u32, u32)>,

    /// Print a report every N ticks
    #[arg(short, long, default_value_t = 20)]
    report_interval: u64,

    /// Print the wildfire grid as ASCII when done
    #[arg(short, long)]
    map: bool,
}

fn parse_cell(s: &str) -> Result<(u32, u32), String> {
    parse_pair(s, ',')
}

fn parse_extent(s: &str) -> Result<(u32, u32), String> {
    parse_pair(s, 'x')
}

fn parse_pair(s: &str, separator: char) -> Result<(u32, u32), String> {
    let (a, b) = s
        .split_once(separator)
        .ok_or_else(|| format!("expected two numbers separated by '{separator}', got '{s}'"))?;
    let a = a.trim().parse().map_err(|e| format!("'{a}': {e}"))?;
    let b = b.trim().parse().map_err(|e| format!("'{b}': {e}"))?;
    Ok((a, b))
}

fn build(args: &Args) -> SimResult<FireSimulation> {
    let mut config = args.preset.config()?.with_seed(args.seed);
    if let Some(n) = args.fluid_size {
        config.fluid_size = wildfire_sim_core::GridSize::cube(n)?;
    }
    if let Some((width, height)) = args.terrain {
        config.wildfire_width = width;
        config.wildfire_height = height;
    }
    if let Some(scheme) = args.scheme {
        config.fluid.density_scheme = scheme;
        config.fluid.reaction_scheme = scheme;
    }
    config.wildfire.wind = args.wind;

    let mut sim = FireSimulation::new(config)?;

    let grid = sim.wildfire_grid();
    let centre = (grid.width() / 2, grid.height() / 2);
    let starts = if args.ignite.is_empty() {
        vec![centre]
    } else {
        args.ignite.clone()
    };
    for (x, y) in starts {
        if !sim.ignite(x, y) {
            println!("Ignition point {x},{y} is off the grid, skipped");
        }
    }
    for &(x, y) in &args.lightning {
        sim.ignition_sources_mut().insert(x, y);
    }
    Ok(sim)
}

fn run(args: &Args) -> SimResult<()> {
    println!("=== Fire Simulation Demo ===\n");
    let mut sim = build(args)?;

    let grid = sim.wildfire_grid();
    println!(
        "Fluid grid {} | terrain {}x{} | preset {} | wind {} | seed {}",
        sim.fluid_grid().size(),
        grid.width(),
        grid.height(),
        args.preset,
        args.wind,
        args.seed
    );
    println!("Scheme: {}\n", sim.fluid_solver().config().density_scheme);

    println!(" Tick |   Time | Hour | Max speed | Max reaction | Residual div | Burning | Burnt |  ms");
    println!("------|--------|------|-----------|--------------|--------------|---------|-------|-----");

    let mut peak_burning = 0;
    let mut total_ignited = 0;
    let mut total_regrown = 0;
    for tick in 0..args.ticks {
        let report = sim.tick(args.dt)?;
        peak_burning = peak_burning.max(report.states.on_fire);
        total_ignited += report.wildfire.ignited;
        total_regrown += report.wildfire.regrown;

        let last = tick + 1 == args.ticks;
        if tick % args.report_interval.max(1) == 0 || last {
            let hot = if sim.automaton().is_hot(report.clock.frame) {
                "*"
            } else {
                " "
            };
            println!(
                "{:5} | {:6.1} | {:3}{} | {:9.3} | {:12.4} | {:12.2e} | {:7} | {:5} | {:4.1}",
                report.clock.frame,
                report.clock.time,
                report.clock.frame % 24,
                hot,
                report.fluid.max_speed,
                report.fluid.max_reaction,
                report.fluid.residual_divergence,
                report.states.on_fire,
                report.states.destroyed,
                report.elapsed_ms,
            );
        }
    }

    let states = sim.wildfire_grid().state_counts();
    println!("\n=== Simulation Complete ===");
    println!("Final time: {:.1}s", sim.clock().time);
    println!("Peak burning cells: {peak_burning}");
    println!("Cells ignited: {total_ignited}, regrown: {total_regrown}");
    println!(
        "Final census: {} unburnt, {} burning, {} burnt",
        states.not_on_fire, states.on_fire, states.destroyed
    );
    println!(
        "Average tick: {:.2} ms over {} ticks",
        sim.frame_timer().average_ms(),
        sim.frame_timer().samples()
    );
    info!(
        total_density = sim.fluid_grid().total_density(),
        max_speed = sim.fluid_grid().max_speed(),
        "Fluid final state"
    );

    if args.map {
        println!("\n{}", sim.wildfire_grid().render_ascii());
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!(error = %e, "Simulation aborted");
        std::process::exit(1);
    }
}
