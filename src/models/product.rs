// src/models/product.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Produto do catálogo central. `stock_qty` é a quantidade disponível
// segundo o servidor; o cliente nunca a decrementa localmente, só a usa
// como teto na seleção de quantidades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category_id: Option<i64>,
    pub unit: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock_qty: i64,
    #[serde(default)]
    pub low_stock_threshold: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Product {
    pub fn out_of_stock(&self) -> bool {
        self.stock_qty <= 0
    }

    pub fn low_stock(&self) -> bool {
        self.stock_qty <= self.low_stock_threshold
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

// ---
// Payloads de escrita (POST /products e PUT /products/{id})
// ---

#[derive(Debug, Serialize, Validate)]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub category_id: Option<i64>,
    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,
    pub price: Decimal,
    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    pub stock_qty: i64,
    #[validate(range(min = 0, message = "O limite de estoque baixo não pode ser negativo."))]
    pub low_stock_threshold: i64,
    pub is_active: bool,
}

// Atualização parcial: só os campos presentes são enviados.
#[derive(Debug, Default, Serialize, Validate)]
pub struct ProductUpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "O nome não pode ficar vazio."))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    pub stock_qty: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Validate)]
pub struct CategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
}

fn default_true() -> bool {
    true
}
