use std::{error::Error, io, path::PathBuf};

use clap::Parser;
use library_relay::{Client, SessionClient, Settings};

#[derive(Debug, Parser)]
#[command(version, about = "Run one sequential client session per book title")]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = "appsettings.json")]
    settings: PathBuf,
    /// Book titles to request, one client each
    #[arg(required = true)]
    titles: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.settings)?;
    let server = settings.server_addr()?;

    let results = cli
        .titles
        .into_iter()
        .enumerate()
        .map(|(id, title)| Client::new(id, title, server).run())
        .collect::<Vec<_>>();

    serde_json::to_writer_pretty(io::stdout().lock(), &results)?;
    println!();
    Ok(())
}
