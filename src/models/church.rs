// src/models/church.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Church {
    pub id: i64,
    pub name: String,
    pub city: String,
}

// Corpo de POST /churches e PUT /churches/{id}
#[derive(Debug, Serialize, Validate)]
pub struct ChurchPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, message = "A cidade é obrigatória."))]
    pub city: String,
}
