// src/models/user.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{auth::Role, church::Church};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

// Perfil do próprio usuário (GET /users/me), incluindo o conjunto de
// igrejas às quais ele está vinculado. Para USUARIO esse conjunto limita
// tanto a listagem quanto a submissão de pedidos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Me {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub churches: Vec<Church>,
}

// Corpo de POST /users; `church_ids` define o vínculo usuário-igreja.
#[derive(Debug, Serialize, Validate)]
pub struct UserPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    pub church_ids: Vec<i64>,
}

fn default_true() -> bool {
    true
}
