// src/models/auth.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

// Papel do usuário, carregado dentro do access token.
// O servidor continua sendo a autoridade; aqui só liberamos/escondemos ações.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADM")]
    Adm,
    #[serde(rename = "USUARIO")]
    Usuario,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Adm)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Adm => write!(f, "ADM"),
            Role::Usuario => write!(f, "USUARIO"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADM" => Ok(Role::Adm),
            "USUARIO" => Ok(Role::Usuario),
            other => Err(format!("papel desconhecido: {other}")),
        }
    }
}

// Par de credenciais devolvido por /auth/login e /auth/refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

// Dados para login
#[derive(Debug, Serialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "O usuário é obrigatório."))]
    pub username: String,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
}

// Corpo enviado para /auth/refresh
#[derive(Debug, Serialize)]
pub struct RefreshPayload {
    pub refresh: String,
}
