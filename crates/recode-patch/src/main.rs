mod state;
mod table;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use recode_core::config::DEFAULT_CONFIG_FILE;
use recode_core::{BytePattern, FixConfig, GAME_MODULES, PrimaryDisplay, Settings, format_bytes};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use state::{PatchState, STATE_FILE};
use table::{Outcome, STOCK_TABLE};

#[derive(Parser)]
#[command(name = "recode-patch")]
#[command(about = "Rewrite the resolution table in the Hack GU Last Recode DLLs")]
struct Args {
    /// Settings file holding the target resolution
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory containing the hackGU_*.dll files
    #[arg(short, long, default_value = "..")]
    game_dir: PathBuf,

    /// Where the last applied table is recorded
    #[arg(short, long, default_value = STATE_FILE)]
    state: PathBuf,

    /// Report what would be patched without writing anything
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("recode_patch=info".parse()?))
        .init();

    let args = Args::parse();

    let settings = Settings::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    let config = FixConfig::resolve(&settings, &PrimaryDisplay)?;
    info!("Target resolution: {}x{}", config.width, config.height);

    let previous = PatchState::load(&args.state);
    let search = match &previous {
        Some(state) => {
            info!(
                "Searching for the table written on {} ({}x{})",
                state.patched_at, state.width, state.height
            );
            state.replacement.as_str()
        }
        None => STOCK_TABLE,
    };
    let pattern = BytePattern::parse(search)
        .with_context(|| format!("Invalid search pattern in {}", args.state.display()))?;

    let payload = table::replacement(config.width, config.height);
    let results = table::patch_dir(&args.game_dir, GAME_MODULES, &pattern, &payload, args.dry_run)?;

    let patched = results
        .iter()
        .filter(|(_, outcome)| matches!(outcome, Outcome::Patched { .. }))
        .count();
    info!("{} of {} DLLs patched", patched, results.len());

    if patched == 0 {
        warn!("Nothing was patched");
    } else if !args.dry_run {
        PatchState::new(format_bytes(&payload), config.width, config.height)
            .save(&args.state)
            .with_context(|| format!("Failed to save {}", args.state.display()))?;
    }

    Ok(())
}
