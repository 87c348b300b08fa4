// src/db/timetable_repo.rs

use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_tenant_tx, error::AppError},
    models::timetable::{ConfigPayload, DayOfWeek, SlotPayload, TimetableConfig, TimetableSlot},
};

// Nomes das constraints em migrations/
const CONFIG_TENANT_KEY: &str = "timetable_configs_tenant_key";
const TEACHER_PERIOD_KEY: &str = "timetable_slots_teacher_period_key";
const SLOT_CONFIG_FKEY: &str = "timetable_slots_config_fkey";

/// Quais aulas listar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotFilter {
    All,
    Division(Uuid),
    Teacher(Uuid),
}

/// Persistência da grade. Toda operação recebe o tenant explicitamente.
#[async_trait]
pub trait TimetableStore: Send + Sync {
    async fn find_config(&self, tenant_id: Uuid) -> Result<Option<TimetableConfig>, AppError>;

    async fn insert_config(&self, tenant_id: Uuid, payload: &ConfigPayload) -> Result<TimetableConfig, AppError>;

    async fn update_config(&self, tenant_id: Uuid, payload: &ConfigPayload) -> Result<Option<TimetableConfig>, AppError>;

    /// `None` quando não há configuração ou ainda existem aulas apontando para ela.
    async fn delete_config(&self, tenant_id: Uuid) -> Result<Option<TimetableConfig>, AppError>;

    async fn count_slots(&self, tenant_id: Uuid) -> Result<i64, AppError>;

    /// Já existe aula do professor neste dia/período (ignorando `exclude_slot_id`)?
    async fn teacher_slot_taken(
        &self,
        tenant_id: Uuid,
        teacher_id: Uuid,
        day: DayOfWeek,
        period_number: i32,
        exclude_slot_id: Option<Uuid>,
    ) -> Result<bool, AppError>;

    async fn teacher_teaches_subject(&self, tenant_id: Uuid, teacher_id: Uuid, subject_id: Uuid) -> Result<bool, AppError>;

    async fn insert_slot(&self, tenant_id: Uuid, payload: &SlotPayload) -> Result<TimetableSlot, AppError>;

    async fn update_slot(&self, tenant_id: Uuid, slot_id: Uuid, payload: &SlotPayload) -> Result<Option<TimetableSlot>, AppError>;

    async fn delete_slot(&self, tenant_id: Uuid, slot_id: Uuid) -> Result<Option<TimetableSlot>, AppError>;

    async fn find_slot(&self, tenant_id: Uuid, slot_id: Uuid) -> Result<Option<TimetableSlot>, AppError>;

    async fn list_slots(&self, tenant_id: Uuid, filter: SlotFilter) -> Result<Vec<TimetableSlot>, AppError>;
}

// O repositório da grade, responsável pelas tabelas 'timetable_configs' e 'timetable_slots'
#[derive(Clone)]
pub struct TimetableRepository {
    pool: PgPool,
}

impl TimetableRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// O que o Postgres disse sobre uma escrita que falhou.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Violation<'a> {
    Unique(Option<&'a str>),
    ForeignKey(Option<&'a str>),
}

fn violation_of(e: &sqlx::Error) -> Option<Violation<'_>> {
    let db_err = e.as_database_error()?;
    if db_err.is_unique_violation() {
        return Some(Violation::Unique(db_err.constraint()));
    }
    if db_err.is_foreign_key_violation() {
        return Some(Violation::ForeignKey(db_err.constraint()));
    }
    None
}

// Converte violações de constraint em erros de domínio.
// O banco é o árbitro final: as checagens do service são só um atalho.
fn slot_violation_error(violation: Violation<'_>) -> Option<AppError> {
    match violation {
        Violation::Unique(Some(TEACHER_PERIOD_KEY)) => Some(AppError::TeacherAlreadyAssigned),
        Violation::Unique(_) => None,
        Violation::ForeignKey(Some(SLOT_CONFIG_FKEY)) => Some(AppError::ConfigNotFound),
        Violation::ForeignKey(_) => Some(AppError::ReferenceNotFound),
    }
}

fn config_violation_error(violation: Violation<'_>) -> Option<AppError> {
    match violation {
        // Dois POSTs simultâneos: quem chegar depois cai aqui
        Violation::Unique(Some(CONFIG_TENANT_KEY)) => Some(AppError::ConfigAlreadyExists),
        Violation::Unique(_) => None,
        // O tenant do token não existe em `tenants`
        Violation::ForeignKey(_) => Some(AppError::TenantNotFound),
    }
}

fn map_slot_write_error(e: sqlx::Error) -> AppError {
    let mapped = violation_of(&e).and_then(slot_violation_error);
    mapped.unwrap_or(AppError::DatabaseError(e))
}

fn map_config_write_error(e: sqlx::Error) -> AppError {
    let mapped = violation_of(&e).and_then(config_violation_error);
    mapped.unwrap_or(AppError::DatabaseError(e))
}

#[async_trait]
impl TimetableStore for TimetableRepository {
    async fn find_config(&self, tenant_id: Uuid) -> Result<Option<TimetableConfig>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;

        let config = sqlx::query_as::<_, TimetableConfig>(
            "SELECT * FROM timetable_configs WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(config)
    }

    async fn insert_config(&self, tenant_id: Uuid, payload: &ConfigPayload) -> Result<TimetableConfig, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;

        let config = sqlx::query_as::<_, TimetableConfig>(
            r#"
            INSERT INTO timetable_configs (
                id, tenant_id, periods_per_day, default_duration, start_time, end_time, break_slots
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(payload.periods_per_day)
        .bind(payload.default_duration)
        .bind(&payload.start_time)
        .bind(&payload.end_time)
        .bind(Json(&payload.break_slots))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_config_write_error)?;

        tx.commit().await?;
        Ok(config)
    }

    async fn update_config(&self, tenant_id: Uuid, payload: &ConfigPayload) -> Result<Option<TimetableConfig>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;

        let config = sqlx::query_as::<_, TimetableConfig>(
            r#"
            UPDATE timetable_configs
            SET periods_per_day = $2,
                default_duration = $3,
                start_time = $4,
                end_time = $5,
                break_slots = $6,
                updated_at = NOW()
            WHERE tenant_id = $1
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payload.periods_per_day)
        .bind(payload.default_duration)
        .bind(&payload.start_time)
        .bind(&payload.end_time)
        .bind(Json(&payload.break_slots))
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(config)
    }

    async fn delete_config(&self, tenant_id: Uuid) -> Result<Option<TimetableConfig>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;

        // A FK das aulas (ON DELETE RESTRICT) barra a exclusão se alguma aula
        // for criada entre a contagem do service e este DELETE.
        let deleted = sqlx::query_as::<_, TimetableConfig>(
            "DELETE FROM timetable_configs WHERE tenant_id = $1 RETURNING *",
        )
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await;

        let deleted = match deleted {
            Ok(config) => config,
            Err(e) => {
                let in_use = e
                    .as_database_error()
                    .is_some_and(|db_err| db_err.is_foreign_key_violation());
                if in_use {
                    return Ok(None);
                }
                return Err(e.into());
            }
        };

        tx.commit().await?;
        Ok(deleted)
    }

    async fn count_slots(&self, tenant_id: Uuid) -> Result<i64, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM timetable_slots WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(count)
    }

    async fn teacher_slot_taken(
        &self,
        tenant_id: Uuid,
        teacher_id: Uuid,
        day: DayOfWeek,
        period_number: i32,
        exclude_slot_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;

        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM timetable_slots
                WHERE tenant_id = $1
                  AND teacher_id = $2
                  AND day_of_week = $3
                  AND period_number = $4
                  AND ($5::uuid IS NULL OR id <> $5)
            )
            "#,
        )
        .bind(tenant_id)
        .bind(teacher_id)
        .bind(day)
        .bind(period_number)
        .bind(exclude_slot_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(taken)
    }

    async fn teacher_teaches_subject(&self, tenant_id: Uuid, teacher_id: Uuid, subject_id: Uuid) -> Result<bool, AppError> {
        // Professores e matérias ficam fora do RLS; o filtro por tenant é explícito.
        let linked = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM teachers t
                JOIN teacher_subjects ts ON ts.teacher_id = t.id
                JOIN subjects s ON s.id = ts.subject_id
                WHERE t.id = $1
                  AND t.tenant_id = $2
                  AND s.id = $3
                  AND s.tenant_id = $2
            )
            "#,
        )
        .bind(teacher_id)
        .bind(tenant_id)
        .bind(subject_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(linked)
    }

    async fn insert_slot(&self, tenant_id: Uuid, payload: &SlotPayload) -> Result<TimetableSlot, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;

        let slot = sqlx::query_as::<_, TimetableSlot>(
            r#"
            INSERT INTO timetable_slots (
                id, tenant_id, day_of_week, period_number, start_time, end_time,
                duration, division_id, subject_id, teacher_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(payload.day_of_week)
        .bind(payload.period_number)
        .bind(&payload.start_time)
        .bind(&payload.end_time)
        .bind(payload.duration)
        .bind(payload.division_id)
        .bind(payload.subject_id)
        .bind(payload.teacher_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_slot_write_error)?;

        tx.commit().await?;
        Ok(slot)
    }

    async fn update_slot(&self, tenant_id: Uuid, slot_id: Uuid, payload: &SlotPayload) -> Result<Option<TimetableSlot>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;

        let slot = sqlx::query_as::<_, TimetableSlot>(
            r#"
            UPDATE timetable_slots
            SET day_of_week = $3,
                period_number = $4,
                start_time = $5,
                end_time = $6,
                duration = $7,
                division_id = $8,
                subject_id = $9,
                teacher_id = $10,
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(slot_id)
        .bind(tenant_id)
        .bind(payload.day_of_week)
        .bind(payload.period_number)
        .bind(&payload.start_time)
        .bind(&payload.end_time)
        .bind(payload.duration)
        .bind(payload.division_id)
        .bind(payload.subject_id)
        .bind(payload.teacher_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_slot_write_error)?;

        tx.commit().await?;
        Ok(slot)
    }

    async fn delete_slot(&self, tenant_id: Uuid, slot_id: Uuid) -> Result<Option<TimetableSlot>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;

        let slot = sqlx::query_as::<_, TimetableSlot>(
            "DELETE FROM timetable_slots WHERE id = $1 AND tenant_id = $2 RETURNING *",
        )
        .bind(slot_id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(slot)
    }

    async fn find_slot(&self, tenant_id: Uuid, slot_id: Uuid) -> Result<Option<TimetableSlot>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;

        let slot = sqlx::query_as::<_, TimetableSlot>(
            "SELECT * FROM timetable_slots WHERE id = $1 AND tenant_id = $2",
        )
        .bind(slot_id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(slot)
    }

    async fn list_slots(&self, tenant_id: Uuid, filter: SlotFilter) -> Result<Vec<TimetableSlot>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;

        // Um único SQL: o filtro opcional vira NULL quando não se aplica
        let (division_id, teacher_id) = match filter {
            SlotFilter::All => (None, None),
            SlotFilter::Division(id) => (Some(id), None),
            SlotFilter::Teacher(id) => (None, Some(id)),
        };

        let slots = sqlx::query_as::<_, TimetableSlot>(
            r#"
            SELECT * FROM timetable_slots
            WHERE tenant_id = $1
              AND ($2::uuid IS NULL OR division_id = $2)
              AND ($3::uuid IS NULL OR teacher_id = $3)
            ORDER BY day_of_week ASC, period_number ASC
            "#,
        )
        .bind(tenant_id)
        .bind(division_id)
        .bind(teacher_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(slots)
    }
}
