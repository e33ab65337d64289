use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xiv_pricecheck::app;
use xiv_pricecheck::category::{choose_categories, find_categories, load_categories, render_menu};
use xiv_pricecheck::cli_args::{Cli, Commands};
use xiv_pricecheck::configuration::PricecheckConfiguration;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let Cli { common, command } = Cli::parse();
    let cfg = PricecheckConfiguration::new(common)?;

    match command {
        Commands::ListCategories => {
            let categories = load_categories(&cfg.categories_dir)?;
            println!("{}", render_menu(&categories));
            Ok(())
        }
        Commands::Resolve { names } => {
            let client = app::build_client(&cfg)?;
            app::resolve_names(&cfg, client, &names).await
        }
        Commands::Check { categories, all } => {
            let available = load_categories(&cfg.categories_dir)?;
            if available.is_empty() {
                bail!("No category files found in {:?}", cfg.categories_dir);
            }

            let selected = if all {
                available
            } else if !categories.is_empty() {
                find_categories(&available, &categories)?
            } else {
                choose_categories(&available, std::io::stdin().lock(), std::io::stdout())?
            };

            let client = app::build_client(&cfg)?;
            app::check_categories(&cfg, client, &selected).await
        }
    }
}
