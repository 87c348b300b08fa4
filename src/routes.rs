// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn app_router(app_state: AppState) -> Router {
    // Tudo em /api/time-table exige Bearer válido
    let timetable_routes = Router::new()
        .route("/api/time-table/config"
               ,post(handlers::timetable::create_config)
               .get(handlers::timetable::get_config)
               .put(handlers::timetable::update_config)
               .delete(handlers::timetable::delete_config)
        )
        .route("/api/time-table"
               ,post(handlers::timetable::create_slot)
               .get(handlers::timetable::list_slots)
        )
        .route("/api/time-table/{id}"
               ,get(handlers::timetable::get_slot)
               .patch(handlers::timetable::update_slot)
               .delete(handlers::timetable::delete_slot)
        )
        .route("/api/time-table/division/{division_id}"
               ,get(handlers::timetable::division_timetable)
        )
        .route("/api/time-table/teacher/{teacher_id}"
               ,get(handlers::timetable::teacher_timetable)
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(timetable_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
