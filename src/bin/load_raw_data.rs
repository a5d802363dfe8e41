use std::{error::Error, path::PathBuf};

use clap::Parser;
use log::{error, info};
use rawload::{
    config::{load_env, DbConfig},
    db::{prod_db::ProdDb, raw::warehouse::Warehouse},
    load::run,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File with the DW_* variables.  Defaults to `.env` when it exists.
    #[arg(long)]
    env_file: Option<PathBuf>,
}

/// Download the hosts, reviews and listings files and replace the tables
/// in the `raw` schema.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // env file first, it may set RUST_LOG
    let env_loaded = load_env(args.env_file.as_deref());

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .init();

    if let Err(e) = env_loaded {
        let path = args.env_file.unwrap_or_default();
        error!("Failed to read {}: {}", path.display(), e);
        return Err(e.into());
    }

    let config = DbConfig::from_env();
    info!("Loading raw datasets into {}", config);

    let client = reqwest::Client::new();
    let mut warehouse = Warehouse::new(config);
    // a schema failure has been logged already, exit quietly
    if let Ok(report) = run(&client, &mut warehouse, &ProdDb::raw_datasets()).await {
        info!("{} of {} datasets loaded", report.loaded(), report.len());
    }

    Ok(())
}
