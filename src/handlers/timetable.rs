// src/handlers/timetable.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{RequireRole, SchoolAdmin},
        tenancy::TenantContext,
    },
    // Importe os models de resposta para o Swagger
    models::timetable::{
        ConfigPatchPayload, ConfigPayload, DaySchedule, SlotPatchPayload, SlotPayload, TimetableConfig,
        TimetableSlot,
    },
};

// =============================================================================
//  1. CONFIGURAÇÃO DA GRADE
// =============================================================================

// POST /api/time-table/config
#[utoipa::path(
    post,
    path = "/api/time-table/config",
    tag = "Timetable Config",
    request_body = ConfigPayload,
    responses(
        (status = 201, description = "Configuração criada", body = TimetableConfig),
        (status = 400, description = "Campos inválidos"),
        (status = 409, description = "A escola já tem configuração")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_config(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<SchoolAdmin>,
    Json(payload): Json<ConfigPayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let config = app_state.timetable_service
        .create_config(tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(config)))
}

// GET /api/time-table/config
#[utoipa::path(
    get,
    path = "/api/time-table/config",
    tag = "Timetable Config",
    responses(
        (status = 200, description = "Configuração da escola", body = TimetableConfig),
        (status = 404, description = "Escola ainda sem configuração")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_config(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {

    let config = app_state.timetable_service
        .get_config(tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(config)))
}

// PUT /api/time-table/config
#[utoipa::path(
    put,
    path = "/api/time-table/config",
    tag = "Timetable Config",
    request_body = ConfigPatchPayload,
    responses(
        (status = 200, description = "Configuração atualizada", body = TimetableConfig),
        (status = 404, description = "Escola ainda sem configuração"),
        (status = 409, description = "Aulas existentes ficariam inválidas")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_config(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<SchoolAdmin>,
    Json(payload): Json<ConfigPatchPayload>,
) -> Result<impl IntoResponse, ApiError> {

    // A validação acontece no service, depois do merge com o que já está salvo
    let config = app_state.timetable_service
        .update_config(tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(config)))
}

// DELETE /api/time-table/config
#[utoipa::path(
    delete,
    path = "/api/time-table/config",
    tag = "Timetable Config",
    responses(
        (status = 200, description = "Configuração removida", body = TimetableConfig),
        (status = 404, description = "Escola ainda sem configuração"),
        (status = 409, description = "Ainda existem aulas na grade")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_config(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<SchoolAdmin>,
) -> Result<impl IntoResponse, ApiError> {

    let deleted = app_state.timetable_service
        .delete_config(tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(deleted)))
}

// =============================================================================
//  2. AULAS (SLOTS)
// =============================================================================

// POST /api/time-table
#[utoipa::path(
    post,
    path = "/api/time-table",
    tag = "Timetable",
    request_body = SlotPayload,
    responses(
        (status = 201, description = "Aula criada", body = TimetableSlot),
        (status = 400, description = "Período, duração ou intervalo inválidos"),
        (status = 403, description = "Professor não leciona a matéria"),
        (status = 404, description = "Escola sem configuração ou referência inexistente"),
        (status = 409, description = "Professor já alocado neste período")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_slot(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<SchoolAdmin>,
    Json(payload): Json<SlotPayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let slot = app_state.timetable_service
        .create_slot(tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(slot)))
}

// GET /api/time-table
#[utoipa::path(
    get,
    path = "/api/time-table",
    tag = "Timetable",
    responses(
        (status = 200, description = "Todas as aulas da escola", body = Vec<TimetableSlot>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_slots(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {

    let slots = app_state.timetable_service
        .list_slots(tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(slots)))
}

// GET /api/time-table/{id}
#[utoipa::path(
    get,
    path = "/api/time-table/{id}",
    tag = "Timetable",
    responses(
        (status = 200, description = "Aula", body = TimetableSlot),
        (status = 404, description = "Aula não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da Aula")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_slot(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {

    let slot = app_state.timetable_service
        .get_slot(tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(slot)))
}

// PATCH /api/time-table/{id}
#[utoipa::path(
    patch,
    path = "/api/time-table/{id}",
    tag = "Timetable",
    request_body = SlotPatchPayload,
    responses(
        (status = 200, description = "Aula atualizada (revalidada por inteiro)", body = TimetableSlot),
        (status = 400, description = "Período, duração ou intervalo inválidos"),
        (status = 403, description = "Professor não leciona a matéria"),
        (status = 404, description = "Aula não encontrada"),
        (status = 409, description = "Professor já alocado neste período")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da Aula")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_slot(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<SchoolAdmin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SlotPatchPayload>,
) -> Result<impl IntoResponse, ApiError> {

    let slot = app_state.timetable_service
        .update_slot(tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(slot)))
}

// DELETE /api/time-table/{id}
#[utoipa::path(
    delete,
    path = "/api/time-table/{id}",
    tag = "Timetable",
    responses(
        (status = 200, description = "Aula removida", body = TimetableSlot),
        (status = 404, description = "Aula não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da Aula")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_slot(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<SchoolAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {

    let slot = app_state.timetable_service
        .delete_slot(tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(slot)))
}

// =============================================================================
//  3. GRADES AGRUPADAS POR DIA
// =============================================================================

// GET /api/time-table/division/{division_id}
#[utoipa::path(
    get,
    path = "/api/time-table/division/{division_id}",
    tag = "Timetable",
    responses(
        (status = 200, description = "Grade da turma: os sete dias, aulas por período", body = Vec<DaySchedule>)
    ),
    params(
        ("division_id" = Uuid, Path, description = "ID da Turma")
    ),
    security(("api_jwt" = []))
)]
pub async fn division_timetable(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(division_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {

    let days = app_state.timetable_service
        .division_timetable(tenant.0, division_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(days)))
}

// GET /api/time-table/teacher/{teacher_id}
#[utoipa::path(
    get,
    path = "/api/time-table/teacher/{teacher_id}",
    tag = "Timetable",
    responses(
        (status = 200, description = "Grade do professor: os sete dias, aulas por período", body = Vec<DaySchedule>)
    ),
    params(
        ("teacher_id" = Uuid, Path, description = "ID do Professor")
    ),
    security(("api_jwt" = []))
)]
pub async fn teacher_timetable(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(teacher_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {

    let days = app_state.timetable_service
        .teacher_timetable(tenant.0, teacher_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(days)))
}
