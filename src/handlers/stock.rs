// src/handlers/stock.rs

use chrono::{DateTime, Utc};
use clap::Subcommand;

use crate::{
    common::{error::AppError, rbac::Action},
    config::AppState,
    handlers::{print_json, require},
    models::stock::{MovementPayload, MovementType},
    services::stock_service::MovementFilter,
};
use validator::Validate;

#[derive(Debug, Subcommand)]
pub enum StockCommand {
    /// Lista as movimentações do razão de estoque
    Movements {
        #[arg(long)]
        product: Option<i64>,
        /// ENTRADA, SAIDA_MANUAL, SAIDA_PEDIDO ou PERDA
        #[arg(long = "type")]
        movement_type: Option<MovementType>,
        /// Início do intervalo (RFC 3339, ex.: 2026-01-01T00:00:00Z)
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long)]
        end: Option<DateTime<Utc>>,
    },
    /// Registra uma movimentação manual (ADM)
    Add {
        #[arg(long)]
        product: i64,
        /// ENTRADA, SAIDA_MANUAL ou PERDA
        #[arg(long = "type")]
        movement_type: MovementType,
        #[arg(long)]
        qty: i64,
        #[arg(long)]
        note: Option<String>,
    },
}

pub async fn run(state: &AppState, command: StockCommand, json: bool) -> Result<(), AppError> {
    match command {
        StockCommand::Movements {
            product,
            movement_type,
            start,
            end,
        } => {
            require(state, Action::ViewMovements)?;
            let filter = MovementFilter {
                product_id: product,
                movement_type,
                start,
                end,
            };
            let movements = state.stock_service.list_movements(&filter).await?;
            if json {
                return print_json(&movements);
            }

            println!(
                "{:<6} {:<8} {:<14} {:>6}  {:<12} {:<10} {}",
                "ID", "PROD.", "TIPO", "QTD", "DATA", "PEDIDO", "OBS."
            );
            for movement in &movements {
                let date = movement
                    .created_at
                    .map(|at| at.format("%d/%m/%Y").to_string())
                    .unwrap_or_else(|| "-".to_string());
                let order = movement
                    .related_order_id
                    .map(|id| format!("#{id}"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<6} {:<8} {:<14} {:>6}  {:<12} {:<10} {}",
                    movement.id,
                    movement.product_id,
                    movement.movement_type.to_string(),
                    movement.qty,
                    date,
                    order,
                    movement.note.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }
        StockCommand::Add {
            product,
            movement_type,
            qty,
            note,
        } => {
            require(state, Action::RegisterMovement)?;

            // SAIDA_PEDIDO nasce da aprovação de pedido no servidor; o
            // registro manual cobre só os demais tipos.
            if movement_type == MovementType::SaidaPedido {
                return Err(AppError::invalid(
                    "type",
                    "SAIDA_PEDIDO é gerada pela aprovação de pedidos, não manualmente.",
                ));
            }

            let payload = MovementPayload {
                product_id: product,
                movement_type,
                qty,
                note,
            };
            payload.validate()?;

            let movement = state.stock_service.add_movement(&payload).await?;
            println!(
                "Movimentação #{} registrada ({} {} no produto #{}).",
                movement.id, movement.movement_type, movement.qty, movement.product_id
            );
            Ok(())
        }
    }
}
