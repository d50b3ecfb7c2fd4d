use anyhow::Context;
use clap::Parser;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use mts_ai::SearchConfig;
use mts_simulator::scenario::{Status, DUEL_OPPONENT, DUEL_PLAYER};
use mts_tools::{run_match, Archetype, MatchResult, MatchSettings};
use rayon::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap()]
struct Arguments {
    /// Number of matches, one per consecutive seed.
    #[clap(short = 'n', long, value_parser, default_value_t = 10)]
    matches: u64,

    #[clap(short, long, value_parser, default_value_t = 0)]
    seed: u64,

    #[clap(long, value_parser, default_value_t = 60 * 60)]
    max_ticks: u64,

    #[clap(long, value_parser, default_value_t = mts_simulator::scenario::DEFAULT_HITS_TO_WIN)]
    hits_to_win: u32,

    /// Overrides the config's iteration budget.
    #[clap(short, long, value_parser)]
    budget: Option<usize>,

    /// JSON search config; missing fields take their defaults.
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Run each agent on its own worker thread.
    #[clap(long)]
    threaded: bool,

    /// Replay every match and fail if the final state differs.
    #[clap(long)]
    check_determinism: bool,

    #[clap(long, value_enum, default_value = "fighter")]
    player: Archetype,

    #[clap(long, value_enum, default_value = "fighter")]
    opponent: Archetype,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("duel=info"))
        .init();

    let args = Arguments::parse();

    let mut search = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<SearchConfig>(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => SearchConfig::default(),
    };
    if let Some(budget) = args.budget {
        search.iteration_budget = budget;
    }
    search.validate()?;
    log::info!("Search config: {:?}", search);

    let settings = MatchSettings {
        search,
        max_ticks: args.max_ticks,
        hits_to_win: args.hits_to_win,
        threaded: args.threaded,
        player: args.player,
        opponent: args.opponent,
    };

    log::info!("Running {} matches", args.matches);
    let results = (args.seed..args.seed + args.matches)
        .into_par_iter()
        .map(|seed| run_match(seed, &settings))
        .collect::<anyhow::Result<Vec<_>>>()?;

    if args.check_determinism {
        log::info!("Replaying matches");
        let replays = results
            .par_iter()
            .map(|result| run_match(result.seed, &settings))
            .collect::<anyhow::Result<Vec<_>>>()?;
        for (result, replay) in results.iter().zip(replays.iter()) {
            if result != replay {
                anyhow::bail!(
                    "seed {} is not deterministic: {:?} vs {:?}",
                    result.seed,
                    result,
                    replay
                );
            }
        }
        log::info!("All matches replayed identically");
    }

    print_results(&results);
    Ok(())
}

fn print_results(results: &[MatchResult]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Seed", "Result", "Ticks", "Player hits", "Opponent hits"]);

    let (mut player_wins, mut opponent_wins, mut draws) = (0, 0, 0);
    for result in results {
        let outcome = match result.status {
            Status::Victory { id: DUEL_PLAYER } => {
                player_wins += 1;
                "player"
            }
            Status::Victory { id: DUEL_OPPONENT } => {
                opponent_wins += 1;
                "opponent"
            }
            _ => {
                draws += 1;
                "draw"
            }
        };
        table.add_row(vec![
            result.seed.to_string(),
            outcome.to_owned(),
            result.ticks.to_string(),
            result.player_hits_taken.to_string(),
            result.opponent_hits_taken.to_string(),
        ]);
    }

    println!("{table}");
    println!("Player {player_wins}, opponent {opponent_wins}, draws {draws}");
}
