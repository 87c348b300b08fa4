use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::{common::i18n::I18nStore, middleware::i18n::Locale, models::auth::Role};

// Erros de domínio. A mensagem final (traduzida) sai pelo `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Autenticação / Tenancy ---
    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário sem escola associada")]
    MissingTenant,

    #[error("Cargo exigido: {}", .0.as_str())]
    RoleRequired(Role),

    // --- Configuração da grade ---
    #[error("Configuração já existe")]
    ConfigAlreadyExists,

    #[error("Configuração não encontrada")]
    ConfigNotFound,

    #[error("Configuração em uso por aulas existentes")]
    ConfigInUse,

    #[error("{count} aulas ficariam inválidas com a nova configuração")]
    ConfigStrandsSlots { count: usize },

    // --- Aulas ---
    #[error("Aula não encontrada: {0}")]
    SlotNotFound(Uuid),

    #[error("Período acima do limite de {max}")]
    PeriodOutOfRange { max: i32 },

    #[error("Duração diferente de {expected} minutos")]
    DurationMismatch { expected: i32 },

    #[error("Horário coincide com o intervalo {name}")]
    BreakOverlap { name: String },

    #[error("Professor já alocado neste período")]
    TeacherAlreadyAssigned,

    #[error("Professor não leciona a matéria")]
    TeacherNotQualified,

    #[error("Turma, matéria ou professor inexistente no tenant")]
    ReferenceNotFound,

    #[error("Escola inexistente")]
    TenantNotFound,

    #[error("Horário inválido: {0}")]
    InvalidClockTime(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::PeriodOutOfRange { .. }
            | AppError::DurationMismatch { .. }
            | AppError::BreakOverlap { .. }
            | AppError::InvalidClockTime(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::MissingTenant | AppError::RoleRequired(_) | AppError::TeacherNotQualified => {
                StatusCode::FORBIDDEN
            }
            AppError::ConfigNotFound
            | AppError::SlotNotFound(_)
            | AppError::ReferenceNotFound
            | AppError::TenantNotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::ConfigAlreadyExists
            | AppError::ConfigInUse
            | AppError::ConfigStrandsSlots { .. }
            | AppError::TeacherAlreadyAssigned => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    // Chave do catálogo + argumentos para interpolar
    fn message_key(&self) -> (&'static str, Vec<(&'static str, String)>) {
        match self {
            AppError::ValidationError(_) => ("validation.failed", vec![]),
            AppError::InvalidToken => ("auth.invalid_token", vec![]),
            AppError::MissingTenant => ("tenancy.missing", vec![]),
            AppError::RoleRequired(role) => ("auth.role_required", vec![("role", role.as_str().to_string())]),
            AppError::ConfigAlreadyExists => ("timetable.config_exists", vec![]),
            AppError::ConfigNotFound => ("timetable.config_not_found", vec![]),
            AppError::ConfigInUse => ("timetable.config_in_use", vec![]),
            AppError::ConfigStrandsSlots { count } => {
                ("timetable.config_strands_slots", vec![("count", count.to_string())])
            }
            AppError::SlotNotFound(id) => ("timetable.slot_not_found", vec![("id", id.to_string())]),
            AppError::PeriodOutOfRange { max } => {
                ("timetable.period_out_of_range", vec![("max", max.to_string())])
            }
            AppError::DurationMismatch { expected } => {
                ("timetable.duration_mismatch", vec![("expected", expected.to_string())])
            }
            AppError::BreakOverlap { name } => ("timetable.break_overlap", vec![("name", name.clone())]),
            AppError::TeacherAlreadyAssigned => ("timetable.teacher_busy", vec![]),
            AppError::TeacherNotQualified => ("timetable.teacher_not_qualified", vec![]),
            AppError::ReferenceNotFound => ("timetable.reference_not_found", vec![]),
            AppError::TenantNotFound => ("tenancy.not_found", vec![]),
            AppError::InvalidClockTime(value) => ("timetable.invalid_clock", vec![("value", value.clone())]),
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => ("internal", vec![]),
        }
    }

    /// Converte o erro na resposta HTTP, no idioma pedido pelo cliente.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O cliente recebe só a mensagem genérica; o detalhe fica no log.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let (key, args) = self.message_key();
        let error = i18n.translate(&locale.0, key, &args);

        // Retorna todos os detalhes da validação, campo a campo.
        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields = BTreeMap::new();
                collect_messages(errors, "", &mut fields);
                Some(json!(fields))
            }
            _ => None,
        };

        ApiError { status, error, details }
    }
}

// Achata os erros aninhados (structs e listas) em "campo[i].subcampo" -> mensagens
fn collect_messages(errors: &ValidationErrors, prefix: &str, out: &mut BTreeMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                });
                out.entry(path).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

/// O que efetivamente vai para o cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(AppError::ConfigNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::ConfigAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::ConfigInUse.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::TeacherAlreadyAssigned.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::PeriodOutOfRange { max: 8 }.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::TeacherNotQualified.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::MissingTenant.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::TenantNotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn nested_break_errors_keep_their_path() {
        use crate::models::timetable::{BreakSlot, ConfigPayload};
        use validator::Validate;

        let payload = ConfigPayload {
            periods_per_day: 8,
            default_duration: 40,
            start_time: "08:00".into(),
            end_time: "14:00".into(),
            break_slots: vec![
                BreakSlot { name: "Recess".into(), start_time: "10:00".into(), end_time: "10:15".into() },
                BreakSlot { name: "".into(), start_time: "12:40".into(), end_time: "12:00".into() },
            ],
        };
        let err = AppError::ValidationError(payload.validate().unwrap_err());
        let api = err.to_api_error(&Locale("en".into()), &I18nStore::new());

        let details = api.details.unwrap();
        let fields = details.as_object().unwrap();
        assert!(fields["break_slots[1].name"].is_array());
        assert!(!fields.keys().any(|k| k.starts_with("break_slots[0]")));
    }

    #[test]
    fn localizes_message_with_arguments() {
        let store = I18nStore::new();
        let api = AppError::PeriodOutOfRange { max: 8 }.to_api_error(&Locale("en".into()), &store);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "Period number cannot exceed 8");
        assert!(api.details.is_none());
    }

    #[test]
    fn internal_errors_hide_details() {
        let store = I18nStore::new();
        let err = AppError::InternalServerError(anyhow::anyhow!("pool exhausted"));
        let api = err.to_api_error(&Locale("pt".into()), &store);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "Ocorreu um erro inesperado.");
    }
}
