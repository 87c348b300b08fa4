// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Configuração ---
        handlers::timetable::create_config,
        handlers::timetable::get_config,
        handlers::timetable::update_config,
        handlers::timetable::delete_config,

        // --- Aulas ---
        handlers::timetable::create_slot,
        handlers::timetable::list_slots,
        handlers::timetable::get_slot,
        handlers::timetable::update_slot,
        handlers::timetable::delete_slot,

        // --- Grades ---
        handlers::timetable::division_timetable,
        handlers::timetable::teacher_timetable,
    ),
    components(
        schemas(
            models::timetable::DayOfWeek,
            models::timetable::BreakSlot,
            models::timetable::TimetableConfig,
            models::timetable::ConfigPayload,
            models::timetable::ConfigPatchPayload,
            models::timetable::TimetableSlot,
            models::timetable::SlotPayload,
            models::timetable::SlotPatchPayload,
            models::timetable::DaySchedule,
        )
    ),
    tags(
        (name = "Timetable Config", description = "Configuração da Grade da Escola"),
        (name = "Timetable", description = "Alocação de Aulas e Grades por Turma/Professor")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_timetable_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/time-table/config",
            "/api/time-table",
            "/api/time-table/{id}",
            "/api/time-table/division/{division_id}",
            "/api/time-table/teacher/{teacher_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "faltando {path}");
        }
    }
}
