// src/handlers/orders.rs

use std::path::PathBuf;

use clap::Subcommand;

use crate::{
    common::{error::AppError, rbac::Action},
    config::AppState,
    handlers::{confirm, print_json, require},
    models::order::Order,
    services::order_service::OrderDraft,
};

#[derive(Debug, Subcommand)]
pub enum OrdersCommand {
    /// Lista os pedidos visíveis ao usuário
    List,
    /// Cria um pedido novo ou edita o pendente existente
    Submit {
        /// Igreja destinatária do pedido
        #[arg(long)]
        church: Option<i64>,
        /// Item no formato produto=quantidade (repetível)
        #[arg(long = "item", value_parser = parse_item)]
        items: Vec<(i64, i64)>,
    },
    /// Aprova um pedido pendente (ADM)
    Approve {
        id: i64,
        /// Pula o prompt de confirmação
        #[arg(long)]
        yes: bool,
    },
    /// Marca um pedido aprovado como entregue (ADM)
    Deliver {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
    /// Baixa o recibo PDF de um pedido entregue (ADM)
    Receipt {
        id: i64,
        /// Arquivo de saída (padrão: pedido_{id}_recibo.pdf)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Baixa um PDF único com os recibos dos pedidos informados (ADM)
    BatchReceipts {
        /// Id de pedido (repetível)
        #[arg(long = "id")]
        ids: Vec<i64>,
        #[arg(long)]
        out: PathBuf,
    },
}

fn parse_item(raw: &str) -> Result<(i64, i64), String> {
    let (product, qty) = raw
        .split_once('=')
        .ok_or_else(|| format!("item inválido '{raw}': use produto=quantidade"))?;
    let product: i64 = product
        .trim()
        .parse()
        .map_err(|_| format!("id de produto inválido em '{raw}'"))?;
    let qty: i64 = qty
        .trim()
        .parse()
        .map_err(|_| format!("quantidade inválida em '{raw}'"))?;
    Ok((product, qty))
}

pub async fn run(state: &AppState, command: OrdersCommand, json: bool) -> Result<(), AppError> {
    match command {
        OrdersCommand::List => list(state, json).await,
        OrdersCommand::Submit { church, items } => submit(state, church, items).await,
        OrdersCommand::Approve { id, yes } => approve(state, id, yes).await,
        OrdersCommand::Deliver { id, yes } => deliver(state, id, yes).await,
        OrdersCommand::Receipt { id, out } => receipt(state, id, out).await,
        OrdersCommand::BatchReceipts { ids, out } => batch_receipts(state, ids, out).await,
    }
}

async fn list(state: &AppState, json: bool) -> Result<(), AppError> {
    let orders = state.order_service.list_orders().await?;
    if json {
        return print_json(&orders);
    }

    if orders.is_empty() {
        println!("Nenhum pedido encontrado.");
        return Ok(());
    }

    println!(
        "{:<6} {:<8} {:<10} {:<12} {:>10}  ITENS",
        "ID", "IGREJA", "STATUS", "DATA", "TOTAL"
    );
    for order in &orders {
        let mut items: Vec<String> = order
            .items
            .iter()
            .take(3)
            .map(|it| format!("{}×{}", it.product_id, it.qty))
            .collect();
        if order.items.len() > 3 {
            items.push(format!("+{}", order.items.len() - 3));
        }
        println!(
            "{:<6} {:<8} {:<10} {:<12} {:>10}  {}",
            order.id,
            format!("#{}", order.church_id),
            order.status.to_string(),
            order.created_at.format("%d/%m/%Y").to_string(),
            format!("R$ {}", order.total()),
            items.join(", ")
        );
    }
    Ok(())
}

async fn submit(
    state: &AppState,
    church: Option<i64>,
    items: Vec<(i64, i64)>,
) -> Result<(), AppError> {
    require(state, Action::CreateOrder)?;

    let context = state.order_service.load_catalog_context().await?;
    let pending = state.order_service.resolve_pending_order().await?;

    let mut draft = match &pending {
        Some(order) => {
            println!(
                "Editando pedido pendente #{} (criado em {}).",
                order.id,
                order.created_at.format("%d/%m/%Y")
            );
            OrderDraft::seeded_from(order)
        }
        None => OrderDraft::new(),
    };

    if let Some(church_id) = church {
        draft.set_church(church_id);
    }

    for (product_id, raw_qty) in items {
        let Some(product) = context.product(product_id) else {
            return Err(AppError::invalid(
                "items",
                &format!("Produto {product_id} não está no catálogo."),
            ));
        };
        let applied = draft.set_item_quantity(product, raw_qty);
        if i64::from(applied) != raw_qty {
            println!(
                "Quantidade de '{}' ajustada para {} (estoque atual: {}).",
                product.name, applied, product.stock_qty
            );
        }
    }

    // Recapitula o que vai ser enviado (zeros ficam de fora).
    for product in &context.products {
        let qty = draft.quantity(product.id);
        if qty > 0 {
            println!("  {} × {} {}", product.name, qty, product.unit);
        }
    }

    let order = state.order_service.submit_order(&draft, &context).await?;
    if pending.is_some() {
        println!("Pedido #{} atualizado.", order.id);
    } else {
        println!("Pedido #{} criado.", order.id);
    }
    Ok(())
}

// Localiza o pedido na listagem atual; a guarda de status fica no serviço.
async fn find_order(state: &AppState, id: i64) -> Result<Order, AppError> {
    let orders = state.order_service.list_orders().await?;
    orders
        .into_iter()
        .find(|o| o.id == id)
        .ok_or_else(|| AppError::invalid("id", &format!("Pedido {id} não encontrado.")))
}

async fn approve(state: &AppState, id: i64, yes: bool) -> Result<(), AppError> {
    require(state, Action::ApproveOrder)?;
    let order = find_order(state, id).await?;

    // Transição irreversível: sempre confirma antes de chamar a API.
    if !yes && !confirm(&format!("Confirma a aprovação do pedido #{id}?"))? {
        println!("Operação cancelada.");
        return Ok(());
    }

    let approved = state.order_service.approve(&order).await?;
    println!("Pedido #{} agora está {}.", approved.id, approved.status);
    Ok(())
}

async fn deliver(state: &AppState, id: i64, yes: bool) -> Result<(), AppError> {
    require(state, Action::DeliverOrder)?;
    let order = find_order(state, id).await?;

    if !yes && !confirm(&format!("Confirma a entrega do pedido #{id}?"))? {
        println!("Operação cancelada.");
        return Ok(());
    }

    let delivered = state.order_service.deliver(&order).await?;
    println!("Pedido #{} agora está {}.", delivered.id, delivered.status);
    Ok(())
}

async fn receipt(state: &AppState, id: i64, out: Option<PathBuf>) -> Result<(), AppError> {
    require(state, Action::DownloadReceipt)?;
    let order = find_order(state, id).await?;

    let bytes = state.order_service.fetch_receipt(&order).await?;
    let out = out.unwrap_or_else(|| PathBuf::from(format!("pedido_{id}_recibo.pdf")));
    std::fs::write(&out, &bytes)?;
    println!("Recibo salvo em {}.", out.display());
    Ok(())
}

async fn batch_receipts(state: &AppState, ids: Vec<i64>, out: PathBuf) -> Result<(), AppError> {
    require(state, Action::DownloadReceipt)?;

    let bytes = state.order_service.fetch_batch_receipts(&ids).await?;
    std::fs::write(&out, &bytes)?;
    println!("Recibos de {} pedido(s) salvos em {}.", ids.len(), out.display());
    Ok(())
}
