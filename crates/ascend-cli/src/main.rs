use std::path::PathBuf;

use anyhow::Result;
use ascend_core::catalog::SortBy;
use ascend_infrastructure::AscendPaths;
use clap::{Parser, Subcommand};

mod app;
mod commands;
mod logging;

use app::AppContext;
use commands::catalog::CatalogArgs;

#[derive(Parser)]
#[command(name = "ascend")]
#[command(about = "ASCEND - storefront catalog, cart and shopping assistant", long_about = None)]
struct Cli {
    /// Mirror logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this directory instead of the platform config directory
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Catalog {
        /// Only show these categories (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// relevance, price-asc, price-desc, rating or name
        #[arg(short, long, default_value = "relevance")]
        sort: SortBy,

        #[arg(long)]
        max_price: Option<f64>,

        #[arg(long)]
        in_stock: bool,

        /// Fetch the remote catalog before listing
        #[arg(long)]
        refresh: bool,
    },
    /// Read or change preferences
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Talk to the shopping assistant
    Chat,
    /// Manage config.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config.toml with the default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the config.toml location
    Path,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print a setting (language, theme or currency)
    Get { key: String },
    /// Change a setting
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = AscendPaths::new(cli.config_dir);
    let _log_guard = logging::init(&paths.logs_dir()?, cli.verbose)?;

    // Handled before loading so a broken config.toml can still be reset.
    if let Commands::Config { action } = &cli.command {
        let config_file = paths.config_file()?;
        match action {
            ConfigAction::Init { force } => {
                commands::config::init(&config_file, *force)?;
            }
            ConfigAction::Path => println!("{}", config_file.display()),
        }
        return Ok(());
    }

    let ctx = AppContext::load(paths).await?;

    match cli.command {
        Commands::Catalog {
            categories,
            sort,
            max_price,
            in_stock,
            refresh,
        } => {
            let args = CatalogArgs {
                categories,
                sort,
                max_price,
                in_stock,
                refresh,
            };
            commands::catalog::run(&ctx, args).await?
        }
        Commands::Settings { action } => match action {
            SettingsAction::Get { key } => commands::settings::get(&ctx, &key).await?,
            SettingsAction::Set { key, value } => {
                commands::settings::set(&ctx, &key, &value).await?
            }
        },
        Commands::Chat => commands::chat::run(&ctx).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}
