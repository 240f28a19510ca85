use std::{error::Error, path::PathBuf, process};

use clap::Parser;
use library_relay::{LibraryServer, Settings, Supervisor};
use log::info;

#[derive(Debug, Parser)]
#[command(version, about = "Relay client book inquiries to the book helper")]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = "appsettings.json")]
    settings: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.settings)?;

    ctrlc::set_handler(|| {
        info!("server shutting down");
        process::exit(0);
    })?;

    let mut server = LibraryServer::bind(
        settings.server_addr()?,
        settings.listen_backlog,
        settings.helper_addr()?,
        &Supervisor::new(),
    )?;

    server.listen()?;
    Ok(())
}
