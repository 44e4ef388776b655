use clap::{Parser, Subcommand, ValueEnum};
use lcow::envs::aging_asset::{Aging, AgingScenario};
use lcow::levelized::{interest_rates, sweep_interest_rates, LevelizedCost, START};
use lcow::math::discount_factor;
use lcow::mdps::mdp_simulator::PolicyEpisodes;
use lcow::mdps::solvers::mc_methods::mc_first_visit;
use lcow::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "lcow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Levelized cost of water of a degrading asset by discounted policy evaluation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with `evaluation` and `economics` sections
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Relative RMS change (percent) at which iteration stops
    #[arg(long, global = true)]
    tolerance: Option<Continuous>,

    /// Upper bound on the number of sweeps
    #[arg(long, global = true)]
    max_iterations: Option<usize>,

    /// Update the states of a sweep in parallel
    #[arg(long, global = true)]
    parallel: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Levelized cost over a range of interest rates
    Sweep {
        #[arg(long, value_enum, default_value = "both")]
        scenario: Scenario,

        /// First interest rate, percent
        #[arg(long, default_value = "4")]
        rate_start: Continuous,

        /// Last interest rate, percent
        #[arg(long, default_value = "12")]
        rate_end: Continuous,

        #[arg(long, default_value = "1")]
        rate_step: Continuous,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Compare the evaluator with a Monte Carlo estimate at the configured rate
    Check {
        #[arg(long, default_value = "20000")]
        episodes: usize,

        #[arg(long, default_value = "2718")]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Scenario {
    Deterministic,
    Stochastic,
    Both,
}

impl Scenario {
    fn agings(self) -> Vec<Aging> {
        match self {
            Scenario::Deterministic => vec![Aging::Deterministic],
            Scenario::Stochastic => vec![Aging::Stochastic],
            Scenario::Both => vec![Aging::Deterministic, Aging::Stochastic],
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = settings(&cli)?;
    debug!(?settings, "settings");

    match cli.command {
        Commands::Sweep {
            scenario,
            rate_start,
            rate_end,
            rate_step,
            json,
        } => {
            let rates = interest_rates(rate_start, rate_end, rate_step)?;
            let mut rows = Vec::new();
            for aging in scenario.agings() {
                rows.extend(sweep_interest_rates(
                    aging,
                    &settings.economics,
                    &settings.evaluation,
                    &rates,
                )?);
            }

            if json {
                let out = serde_json::to_string_pretty(&rows)
                    .map_err(|e| EvaluationError::Config(e.to_string()))?;
                println!("{out}");
            } else {
                print_table(&rows);
            }
        }

        Commands::Check { episodes, seed } => {
            let config = &settings.evaluation;
            let gamma = discount_factor(config.interest_rate, config.time_step);
            let horizon = 4 * settings.economics.n_states;
            for aging in [Aging::Deterministic, Aging::Stochastic] {
                let sc = AgingScenario::new(aging, &settings.economics, gamma)?;
                let n_s = sc.n_s();
                for (name, mdp) in [("cost", &sc.cost), ("water", &sc.water)] {
                    let exact = evaluate(mdp, n_s, &sc.policy, config, &vec![0.; n_s])?;
                    let ep_gen = PolicyEpisodes::new(mdp, &sc.policy, START, horizon, seed)?;
                    let estimate = mc_first_visit(&ep_gen, gamma, n_s, episodes)[START];
                    let v = exact.values[START];
                    info!(?aging, name, exact = v, estimate, "monte carlo check");
                    println!(
                        "{aging:?} {name:>5}: evaluator {v:>10.6}  monte carlo {estimate:>10.6}  diff {:>8.4}%",
                        100. * (estimate - v) / v
                    );
                }
            }
        }
    }

    Ok(())
}

fn settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    if let Some(tolerance) = cli.tolerance {
        settings.evaluation.tolerance = tolerance;
    }
    if let Some(max_iterations) = cli.max_iterations {
        settings.evaluation.max_iterations = max_iterations;
    }
    if cli.parallel {
        settings.evaluation.sweep = SweepMode::Parallel;
    }

    settings.evaluation.validate()?;
    Ok(settings)
}

fn print_table(rows: &[LevelizedCost]) {
    println!(
        "{:<14} {:>6} {:>8} {:>12} {:>12} {:>10}",
        "scenario", "rate%", "gamma", "cost", "water", "lcow"
    );
    for r in rows {
        println!(
            "{:<14} {:>6.2} {:>8.5} {:>12.6} {:>12.6} {:>10.6}",
            format!("{:?}", r.aging),
            r.interest_rate,
            r.gamma,
            r.discounted_cost,
            r.discounted_water,
            r.lcow
        );
    }
}
