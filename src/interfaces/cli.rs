use crate::application::use_cases::region_import::RegionImportUseCase;
use crate::application::use_cases::select_options::SelectOptionsUseCase;
use crate::domain::error::{AppError, Result};
use crate::domain::region::RegionLevel;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::connection::init_admin_db;
use crate::interfaces::http::start_server;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Marketplace back office: region import and admin option feeds
#[derive(Parser, Debug)]
#[command(name = "marketplace-admin")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database schema
    Migrate,
    /// Rebuild the region tables from a wilayah dump
    ImportRegions {
        /// Dump file (defaults to `regions.dump_path`)
        file: Option<PathBuf>,
    },
    /// Print the category parent select options
    CategoryOptions {
        /// Category being edited, left out of the list
        #[arg(long)]
        exclude: Option<i64>,
    },
    /// Print breadcrumb options for one region level
    RegionOptions {
        /// province, regency, district or village
        #[arg(long)]
        level: RegionLevel,
    },
    /// Serve the option feeds over HTTP
    Serve,
}

pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let pool = init_admin_db(&config.database).await?;

    match cli.command {
        Commands::Migrate => {
            println!("Schema applied to {}", config.database.url);
        }
        Commands::ImportRegions { file } => {
            let path = file.unwrap_or(config.regions.dump_path);
            let summary = RegionImportUseCase::new(pool).import_file(&path).await?;
            print!("{summary}");
        }
        Commands::CategoryOptions { exclude } => {
            let options = SelectOptionsUseCase::new(pool)
                .category_parent_options(exclude)
                .await?;
            for option in options {
                match option.value {
                    Some(id) => println!("{id}\t{}", option.label),
                    None => println!("-\t{}", option.label),
                }
            }
        }
        Commands::RegionOptions { level } => {
            let options = SelectOptionsUseCase::new(pool).region_options(level).await?;
            for option in options {
                println!("{}\t{}", option.value.unwrap_or_default(), option.label);
            }
        }
        Commands::Serve => {
            info!(host = %config.http.host, port = config.http.port, "Starting HTTP server");
            start_server(pool, &config.http.host, config.http.port)?
                .await
                .map_err(AppError::from)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_with_default_file() {
        let cli = Cli::try_parse_from(["marketplace-admin", "import-regions"]).unwrap();
        assert!(matches!(cli.command, Commands::ImportRegions { file: None }));
    }

    #[test]
    fn test_parse_region_level() {
        let cli =
            Cli::try_parse_from(["marketplace-admin", "region-options", "--level", "district"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Commands::RegionOptions { level: RegionLevel::District }
        ));

        assert!(
            Cli::try_parse_from(["marketplace-admin", "region-options", "--level", "country"])
                .is_err()
        );
    }

    #[test]
    fn test_parse_category_exclude() {
        let cli =
            Cli::try_parse_from(["marketplace-admin", "category-options", "--exclude", "7"]).unwrap();
        assert!(matches!(cli.command, Commands::CategoryOptions { exclude: Some(7) }));
    }
}
