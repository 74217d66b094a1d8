//! Jutland - Entry Point
//!
//! Loads configuration and the saved game, then plays turns at the console:
//! the player types orders, the language model answers for the other side
//! and the referee resolves the turn. The game is saved after every turn.

use jutland::core::config::{GameConfig, DEFAULT_CONFIG_PATH};
use jutland::core::error::Result;
use jutland::fleet::{GameState, Side};
use jutland::llm::LlmClient;
use jutland::save;
use jutland::turn::{EngineSettings, GameOutcome, TurnEngine, TurnOutcome, TurnReport};

use clap::{Parser, ValueEnum};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Command the fleet of one side in the North Sea, 1914
#[derive(Parser, Debug)]
#[command(name = "jutland")]
#[command(about = "Turn-based WWI naval wargame refereed by a language model")]
struct Args {
    /// Config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Saved game location (overrides config)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Starting scenario used when there is no saved game (overrides config)
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Model identifier (overrides config)
    #[arg(long)]
    model: Option<String>,

    /// Side played by the language model (overrides config)
    #[arg(long, value_enum)]
    ai_side: Option<SideArg>,

    /// Refuse adjudications that raise sunk ships
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Discard the saved game and start from the scenario
    #[arg(long, default_value_t = false)]
    reset: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SideArg {
    British,
    German,
}

impl From<SideArg> for Side {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::British => Side::British,
            SideArg::German => Side::German,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jutland=info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    tracing::info!(
        model = %config.llm.model,
        ai_side = %config.game.ai_side,
        "Jutland starting..."
    );

    let state_path = config.game.state_path.clone();
    if args.reset {
        save::reset(&state_path)?;
    }
    let seed = match &config.game.seed_path {
        Some(path) => std::fs::read_to_string(path)?,
        None => save::DEFAULT_SEED.to_string(),
    };
    let state = save::load_or_seed(&state_path, &seed)?;

    let client = LlmClient::from_config(&config.llm)?;
    let settings = EngineSettings::from_config(&config);
    let human_side = settings.human_side;
    let mut engine = TurnEngine::new(client, state, settings);

    println!("\n=== JUTLAND ===");
    if let Some(outcome) = engine.game_over() {
        tracing::warn!(?outcome, "Saved game is already decided");
        display_outcome(outcome);
        println!("This game is over. Run with --reset to start a new one.");
        return Ok(());
    }
    println!("You command the {}. Type your orders each turn, or 'exit' to stop.", human_side.navy());

    let rt = Runtime::new()?;
    let result = rt.block_on(play(&mut engine, human_side, &state_path));
    // stdin is read on a blocking thread that may still be parked on a line
    rt.shutdown_background();
    result?;

    println!("\nGoodbye, Admiral.");
    Ok(())
}

/// Prompt, play and save turns until the game ends, the player exits or
/// Ctrl-C arrives. An interrupt at any point saves nothing.
async fn play(engine: &mut TurnEngine<LlmClient>, human_side: Side, state_path: &Path) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        display_briefing(engine.state(), human_side);

        print!("Your orders ({}): ", human_side.country());
        io::stdout().flush()?;
        let Some(line) = until_interrupted(lines.next_line(), tokio::signal::ctrl_c()).await else {
            interrupted();
            return Ok(());
        };
        // End of input behaves like the exit command
        let order = line?.unwrap_or_else(|| "exit".to_string());

        let Some(result) = until_interrupted(engine.play_turn(&order), tokio::signal::ctrl_c()).await else {
            interrupted();
            return Ok(());
        };

        let report = result?;
        display_report(&report);

        if report.should_persist() {
            save::save(state_path, &report.state)?;
            println!("State saved.");
        }
        if report.is_terminal() {
            return Ok(());
        }
    }
}

/// Run `work` unless `interrupt` resolves first, in which case `work` is dropped
async fn until_interrupted<T>(
    work: impl Future<Output = T>,
    interrupt: impl Future<Output = io::Result<()>>,
) -> Option<T> {
    tokio::select! {
        value = work => Some(value),
        _ = interrupt => None,
    }
}

fn interrupted() {
    tracing::warn!("Interrupted; the last completed turn remains saved");
    println!("\n\nInterrupted. Nothing from this turn was saved.");
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let mut config = GameConfig::load(&args.config)?;

    if let Some(state) = &args.state {
        config.game.state_path = state.clone();
    }
    if let Some(seed) = &args.seed {
        config.game.seed_path = Some(seed.clone());
    }
    if let Some(model) = &args.model {
        config.llm.model = model.clone();
    }
    if let Some(side) = args.ai_side {
        config.game.ai_side = side.into();
    }
    if args.strict {
        config.game.strict_status = true;
    }

    config.validate()?;
    Ok(config)
}

/// What the player's side knows at the start of a turn
fn display_briefing(state: &GameState, side: Side) {
    println!();
    println!("=== Turn {}: {} ===", state.turn, state.date);
    println!("{}", state.summary);
    if !state.last_event.is_empty() {
        println!("\nLast event: {}", state.last_event);
    }
    println!("\nYour situation: {}", state.situation(side));
    println!("\nIntelligence: {}", state.intel(side));
    println!("\nYour forces:");
    for unit in state.units(side) {
        println!("  {} ({}) at {}", unit.name, unit.commander, unit.location);
        for ship in &unit.ships {
            println!("    {} [{}] - {}", ship.name, ship.class, ship.status);
        }
    }
    println!();
}

fn display_report(report: &TurnReport) {
    let Some(resolution) = &report.resolution else {
        return;
    };

    println!("\nYour orders: {}", resolution.human_orders());
    println!(
        "\n{} orders: {}",
        resolution.human_side.opponent().high_command(),
        resolution.ai_orders()
    );

    if resolution.degraded {
        println!("\n=== TURN RESULT (unstructured) ===\n{}", resolution.raw_adjudication);
        println!("\nThe referee's report could not be read; no forces changed this turn.");
    } else {
        println!("\n=== TURN RESULT ===\n{}", report.state.last_event);
        for change in &resolution.changes {
            if change.is_loss() {
                println!("  {} loss: {} ({})", change.side, change.ship, change.unit);
            } else {
                println!("  {}: {} -> {}", change.ship, change.from, change.to);
            }
        }
    }

    if let TurnOutcome::GameOver(outcome) = report.outcome {
        display_outcome(outcome);
    }
}

fn display_outcome(outcome: GameOutcome) {
    println!();
    match outcome {
        GameOutcome::BritishVictory => println!("The German fleet has been destroyed. British victory!"),
        GameOutcome::GermanVictory => println!("The British fleet has been destroyed. German victory!"),
        GameOutcome::MutualDestruction => println!("Both fleets lie on the seabed. Mutual destruction."),
    }
}
