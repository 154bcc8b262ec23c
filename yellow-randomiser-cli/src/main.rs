use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use yellow_randomiser_core::{run, RandomiserSettings};

const DEFAULT_LOG_FILTER: &str = "yellow_randomiser_core=info,yellow_randomiser=info";

#[derive(Debug, Parser)]
#[command(name = "yellow-randomiser", version, about = "Pokemon Yellow ROM randomiser")]
struct Args {
    #[arg(long, default_value = "Pokemon - Yellow Version.gbc")]
    input: PathBuf,

    #[arg(long, default_value = "output.gbc")]
    output: PathBuf,

    /// Character transition table used to generate names.
    #[arg(long, default_value = "nameMarkov.json")]
    names: PathBuf,

    /// Random seed; picked at random and logged when omitted.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    randomize_base_stats: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    randomize_types: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    randomize_starting_moves: bool,

    #[arg(long, default_value_t = false)]
    randomize_catch_rates: bool,

    #[arg(long, default_value_t = false)]
    randomize_exp_yields: bool,

    #[arg(long, default_value_t = false)]
    randomize_growth_rates: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    randomize_palettes: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    randomize_evolution_learnsets: bool,

    /// Only swap evolution/learnset pointers between creatures of the same
    /// evolution stage.
    #[arg(long, default_value_t = false)]
    stage_aware_evolution_learnsets: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    randomize_names: bool,

    #[arg(long, default_value_t = 4)]
    name_min_length: usize,

    /// Write a JSON spoiler log next to the output image.
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);
    if args.seed.is_none() {
        info!(seed, "no seed given, picked one");
    }

    let settings = RandomiserSettings {
        seed,
        randomize_base_stats: args.randomize_base_stats,
        randomize_types: args.randomize_types,
        randomize_starting_moves: args.randomize_starting_moves,
        randomize_catch_rates: args.randomize_catch_rates,
        randomize_exp_yields: args.randomize_exp_yields,
        randomize_growth_rates: args.randomize_growth_rates,
        randomize_palettes: args.randomize_palettes,
        randomize_evolution_learnsets: args.randomize_evolution_learnsets,
        stage_aware_evolution_learnsets: args.stage_aware_evolution_learnsets,
        randomize_names: args.randomize_names,
        name_min_length: args.name_min_length,
        debug: args.debug,
        input_path: args.input,
        output_path: args.output,
        name_table_path: args.names,
    };

    match run(settings) {
        Ok(randomised) => {
            info!(
                groups = randomised.groups.len(),
                names = randomised.names.len(),
                "done"
            );
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
