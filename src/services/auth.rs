// src/services/auth.rs

use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    models::auth::{CallerIdentity, Claims},
};

/// Valida os tokens emitidos pelo serviço de login (fora deste backend).
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    pub fn validate_token(&self, token: &str) -> Result<CallerIdentity, AppError> {
        // HS256 e `exp` obrigatório (padrão do Validation)
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims.into())
    }

    #[cfg(test)]
    pub fn issue_token(&self, claims: &Claims) -> String {
        use jsonwebtoken::{encode, EncodingKey, Header};

        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .expect("falha ao assinar token de teste")
    }
}

#[cfg(test)]
pub(crate) fn test_claims(role: crate::models::auth::Role, tenant_id: Option<uuid::Uuid>) -> Claims {
    let now = chrono::Utc::now();
    Claims {
        sub: uuid::Uuid::new_v4(),
        email: Some("admin@school.test".into()),
        role,
        tenant_id,
        exp: (now + chrono::Duration::hours(1)).timestamp() as usize,
        iat: now.timestamp() as usize,
    }
}
