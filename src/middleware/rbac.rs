// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::Role,
};

/// 1. O Trait que define qual cargo uma rota exige
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> Role;
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai Usuário
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        // B. Compara com o cargo exigido
        let required = T::role();
        if !user.0.role.satisfies(required) {
            let app_state = AppState::from_ref(state);
            return Err(AppError::RoleRequired(required)
                .to_api_error(&Locale::from_headers(&parts.headers), &app_state.i18n_store));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS CARGOS (TIPOS)
// ---

pub struct SchoolAdmin;
impl RoleDef for SchoolAdmin {
    fn role() -> Role { Role::SchoolAdmin }
}
