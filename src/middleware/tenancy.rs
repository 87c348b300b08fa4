// src/middleware/tenancy.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

// A escola do usuário autenticado. Vem da claim `tenantId` do JWT,
// nunca de um cabeçalho enviado pelo cliente.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        match user.0.tenant_id {
            Some(tenant_id) => Ok(TenantContext(tenant_id)),
            None => {
                let app_state = AppState::from_ref(state);
                Err(AppError::MissingTenant.to_api_error(&Locale::from_headers(&parts.headers), &app_state.i18n_store))
            }
        }
    }
}
