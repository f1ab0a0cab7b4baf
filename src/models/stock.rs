// src/models/stock.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// Tipo de movimentação no razão de estoque (append-only, mantido pelo
// servidor). SAIDA_PEDIDO nasce da aprovação de pedidos; o cliente só
// registra os tipos manuais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementType {
    #[serde(rename = "ENTRADA")]
    Entrada,
    #[serde(rename = "SAIDA_MANUAL")]
    SaidaManual,
    #[serde(rename = "SAIDA_PEDIDO")]
    SaidaPedido,
    #[serde(rename = "PERDA")]
    Perda,
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MovementType::Entrada => "ENTRADA",
            MovementType::SaidaManual => "SAIDA_MANUAL",
            MovementType::SaidaPedido => "SAIDA_PEDIDO",
            MovementType::Perda => "PERDA",
        };
        write!(f, "{label}")
    }
}

impl std::str::FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ENTRADA" => Ok(MovementType::Entrada),
            "SAIDA_MANUAL" => Ok(MovementType::SaidaManual),
            "SAIDA_PEDIDO" => Ok(MovementType::SaidaPedido),
            "PERDA" => Ok(MovementType::Perda),
            other => Err(format!("tipo de movimentação desconhecido: {other}")),
        }
    }
}

// Corpo de POST /stock/movements. O servidor aplica o delta no estoque;
// aqui só garantimos qty positiva antes de enviar.
#[derive(Debug, Serialize, Validate)]
pub struct MovementPayload {
    pub product_id: i64,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub qty: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub qty: i64,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub related_order_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
