// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    SchoolAdmin,
    Teacher,
    Student,
}

impl Role {
    /// O SUPER_ADMIN passa por qualquer exigência de cargo.
    pub fn satisfies(self, required: Role) -> bool {
        self == Role::SuperAdmin || self == required
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::SchoolAdmin => "SCHOOL_ADMIN",
            Role::Teacher => "TEACHER",
            Role::Student => "STUDENT",
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    // Usuários de plataforma (SUPER_ADMIN) não pertencem a nenhuma escola
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

/// Quem está chamando, já extraído do token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: Uuid,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
}

impl From<Claims> for CallerIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            tenant_id: claims.tenant_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_satisfies_every_role() {
        assert!(Role::SuperAdmin.satisfies(Role::SchoolAdmin));
        assert!(Role::SchoolAdmin.satisfies(Role::SchoolAdmin));
        assert!(!Role::Teacher.satisfies(Role::SchoolAdmin));
    }

    #[test]
    fn claims_read_camel_case_tenant() {
        let tenant = Uuid::new_v4();
        let raw = serde_json::json!({
            "sub": Uuid::new_v4(),
            "email": "admin@school.test",
            "role": "SCHOOL_ADMIN",
            "tenantId": tenant,
            "exp": 2_000_000_000usize,
            "iat": 1_700_000_000usize,
        });

        let claims: Claims = serde_json::from_value(raw).unwrap();
        let caller = CallerIdentity::from(claims);
        assert_eq!(caller.role, Role::SchoolAdmin);
        assert_eq!(caller.tenant_id, Some(tenant));
    }
}
