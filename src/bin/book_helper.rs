use std::{env::current_dir, error::Error, path::PathBuf, process};

use clap::Parser;
use library_relay::{BookHelper, Settings};
use log::{error, info};

const DEFAULT_CATALOG: &str = "Books.json";

#[derive(Debug, Parser)]
#[command(version, about = "Serve book catalog lookups to the library server")]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = "appsettings.json")]
    settings: PathBuf,
    /// Path to the catalog; overrides `BooksDataFile` from the settings
    #[arg(short, long)]
    catalog: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.settings)?;
    let catalog = match cli.catalog {
        Some(path) => path,
        None => settings.catalog_path(&current_dir()?, DEFAULT_CATALOG.as_ref()),
    };

    let helper = match BookHelper::new(settings.helper_addr()?, &catalog) {
        Ok(helper) => helper,
        Err(e) => {
            error!("stopping book helper: {e}");
            process::exit(1);
        }
    };

    ctrlc::set_handler(|| {
        info!("book helper shutting down");
        process::exit(0);
    })?;

    helper.listen(settings.listen_backlog)?;
    Ok(())
}
