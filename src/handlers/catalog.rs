// src/handlers/catalog.rs

use clap::Subcommand;
use rust_decimal::Decimal;

use crate::{
    common::{error::AppError, rbac::Action},
    config::AppState,
    handlers::{confirm, print_json, require},
    models::product::{CategoryPayload, ProductPayload, ProductUpdatePayload},
    services::catalog_service::ProductFilter,
};
use validator::Validate;

#[derive(Debug, Subcommand)]
pub enum ProductsCommand {
    /// Lista o catálogo, com filtros e paginação
    List {
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<i64>,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Cadastra um produto (ADM)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        unit: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value_t = 0)]
        stock: i64,
        #[arg(long, default_value_t = 0)]
        low_stock: i64,
        #[arg(long)]
        category: Option<i64>,
        /// Cadastra o produto já inativo
        #[arg(long)]
        inactive: bool,
    },
    /// Atualiza os campos informados de um produto (ADM)
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        stock: Option<i64>,
        #[arg(long)]
        low_stock: Option<i64>,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Remove um produto (ADM)
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
    /// Duplica um produto existente (ADM)
    Duplicate { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum CategoriesCommand {
    /// Lista as categorias
    List,
    /// Cadastra uma categoria (ADM)
    Create {
        #[arg(long)]
        name: String,
    },
}

pub async fn run_products(
    state: &AppState,
    command: ProductsCommand,
    json: bool,
) -> Result<(), AppError> {
    match command {
        ProductsCommand::List {
            category,
            search,
            page,
            limit,
        } => {
            require(state, Action::ViewCatalog)?;
            let filter = ProductFilter {
                category_id: category,
                search,
                page,
                limit,
            };
            let paged = state.catalog_service.list_products(&filter).await?;
            if json {
                return print_json(&paged.data);
            }

            println!(
                "{:<6} {:<30} {:<8} {:>10} {:>8}  {}",
                "ID", "NOME", "UNID.", "PREÇO", "ESTOQUE", ""
            );
            for product in &paged.data {
                let mut flags = Vec::new();
                if !product.is_active {
                    flags.push("inativo");
                }
                if product.out_of_stock() {
                    flags.push("sem estoque");
                } else if product.low_stock() {
                    flags.push("estoque baixo");
                }
                println!(
                    "{:<6} {:<30} {:<8} {:>10} {:>8}  {}",
                    product.id,
                    product.name,
                    product.unit,
                    format!("R$ {}", product.price),
                    product.stock_qty,
                    flags.join(", ")
                );
            }
            println!("({} de {} produtos)", paged.data.len(), paged.total);
            Ok(())
        }
        ProductsCommand::Create {
            name,
            unit,
            price,
            stock,
            low_stock,
            category,
            inactive,
        } => {
            require(state, Action::ManageProducts)?;
            let payload = ProductPayload {
                name,
                category_id: category,
                unit,
                price,
                stock_qty: stock,
                low_stock_threshold: low_stock,
                is_active: !inactive,
            };
            payload.validate()?;

            let product = state.catalog_service.create_product(&payload).await?;
            println!("Produto #{} '{}' cadastrado.", product.id, product.name);
            Ok(())
        }
        ProductsCommand::Update {
            id,
            name,
            unit,
            price,
            stock,
            low_stock,
            category,
            active,
        } => {
            require(state, Action::ManageProducts)?;
            let payload = ProductUpdatePayload {
                name,
                category_id: category,
                unit,
                price,
                stock_qty: stock,
                low_stock_threshold: low_stock,
                is_active: active,
            };
            payload.validate()?;

            let product = state.catalog_service.update_product(id, &payload).await?;
            println!("Produto #{} atualizado.", product.id);
            Ok(())
        }
        ProductsCommand::Delete { id, yes } => {
            require(state, Action::ManageProducts)?;
            if !yes && !confirm(&format!("Confirma a exclusão do produto #{id}?"))? {
                println!("Operação cancelada.");
                return Ok(());
            }
            state.catalog_service.delete_product(id).await?;
            println!("Produto #{id} removido.");
            Ok(())
        }
        ProductsCommand::Duplicate { id } => {
            require(state, Action::ManageProducts)?;
            let copy = state.catalog_service.duplicate_product(id).await?;
            println!("Produto duplicado como #{} '{}'.", copy.id, copy.name);
            Ok(())
        }
    }
}

pub async fn run_categories(
    state: &AppState,
    command: CategoriesCommand,
    json: bool,
) -> Result<(), AppError> {
    match command {
        CategoriesCommand::List => {
            require(state, Action::ViewCatalog)?;
            let categories = state.catalog_service.list_categories().await?;
            if json {
                return print_json(&categories);
            }
            for category in &categories {
                println!("{:<6} {}", category.id, category.name);
            }
            Ok(())
        }
        CategoriesCommand::Create { name } => {
            require(state, Action::ManageProducts)?;
            let payload = CategoryPayload { name };
            payload.validate()?;

            let category = state.catalog_service.create_category(&payload).await?;
            println!("Categoria #{} '{}' criada.", category.id, category.name);
            Ok(())
        }
    }
}
