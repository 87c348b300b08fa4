pub mod timetable_repo;
pub use timetable_repo::{SlotFilter, TimetableRepository, TimetableStore};

#[cfg(test)]
pub mod memory_store;

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use crate::config::Settings;

/// Conecta ao Postgres com os limites definidos no ambiente.
pub async fn connect(settings: &Settings) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&settings.database_url)
        .await?; // <-- Se falhar, retorna um Err em vez de dar panic ou exit

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(pool)
}
