//! Database command handlers.

use crate::DbCommands;

pub(crate) async fn run(command: DbCommands) -> anyhow::Result<()> {
    let config = roadwatch_core::load_app_config()?;
    let pool_config = roadwatch_db::PoolConfig::from_app_config(&config);
    let pool = roadwatch_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        DbCommands::Ping => {
            roadwatch_db::ping(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = roadwatch_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Seed { path } => {
            let path = path.unwrap_or_else(|| config.network_path.clone());
            run_seed(&pool, &path).await?;
        }
    }

    pool.close().await;
    Ok(())
}

/// Load a network file and upsert it.
///
/// # Errors
///
/// Returns an error if the file is invalid or any database write fails; in the
/// latter case nothing is committed.
async fn run_seed(pool: &sqlx::PgPool, path: &std::path::Path) -> anyhow::Result<()> {
    let network = roadwatch_core::load_network(path)?;
    let summary = roadwatch_db::seed_network(pool, &network).await?;

    tracing::info!(
        path = %path.display(),
        cities = summary.cities,
        roads_inserted = summary.roads_inserted,
        "seeded road network"
    );
    println!(
        "seeded {} cities, {} new roads from {}",
        summary.cities,
        summary.roads_inserted,
        path.display()
    );
    Ok(())
}
