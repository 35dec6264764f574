use anyhow::{Context, Result};
use succuland::{
    app::SuccuApp,
    config::{self, WorldConfig},
};

const SEED_FILE: &str = "seed.txt";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // A seed on the command line wins over the seed file.
    let seed = match std::env::args().nth(1) {
        Some(arg) => config::parse_seed(&arg).with_context(|| format!("invalid seed argument {arg:?}"))?,
        None => config::load_seed(SEED_FILE).with_context(|| format!("cannot read {SEED_FILE}"))?,
    };
    log::info!("SEED: {}", seed);

    let app = SuccuApp::new(WorldConfig::default(), seed).context("failed to build the world")?;
    app.run().context("run loop stopped")?;
    Ok(())
}
