// src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Estado do pedido. A máquina só anda para frente:
// PENDENTE -> APROVADO -> ENTREGUE, sem cancelamento nem retorno.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "PENDENTE")]
    Pendente,
    #[serde(rename = "APROVADO")]
    Aprovado,
    #[serde(rename = "ENTREGUE")]
    Entregue,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pendente => write!(f, "PENDENTE"),
            OrderStatus::Aprovado => write!(f, "APROVADO"),
            OrderStatus::Entregue => write!(f, "ENTREGUE"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<i64>,
    pub product_id: i64,
    pub qty: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
}

impl OrderItem {
    // Usa o subtotal do servidor quando veio; senão deriva de qty × preço.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
            .unwrap_or_else(|| self.unit_price * Decimal::from(self.qty))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub requester_id: i64,
    pub church_id: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|it| it.subtotal()).sum()
    }
}

// Corpo enviado em POST /orders e PUT /orders/{id}
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemPayload {
    pub product_id: i64,
    pub qty: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPayload {
    pub church_id: i64,
    pub items: Vec<OrderItemPayload>,
}
