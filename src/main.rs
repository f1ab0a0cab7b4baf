//src/main.rs

use clap::{Parser, Subcommand};

// Declaração dos nossos módulos
mod api;
mod common;
mod config;
mod handlers;
mod models;
mod services;


use crate::config::AppState;

#[derive(Parser)]
#[command(name = "cns-admin")]
#[command(about = "Cliente administrativo do sistema de suprimentos CNS")]
struct Cli {
    /// Imprime as respostas em JSON em vez de tabelas
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Autentica na API e guarda a sessão localmente
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Encerra a sessão atual
    Logout,
    /// Mostra o usuário autenticado e suas igrejas
    Whoami,
    /// Pedidos: listagem, criação/edição, aprovação, entrega e recibos
    Orders {
        #[command(subcommand)]
        command: handlers::orders::OrdersCommand,
    },
    /// Catálogo de produtos
    Products {
        #[command(subcommand)]
        command: handlers::catalog::ProductsCommand,
    },
    /// Categorias do catálogo
    Categories {
        #[command(subcommand)]
        command: handlers::catalog::CategoriesCommand,
    },
    /// Igrejas atendidas
    Churches {
        #[command(subcommand)]
        command: handlers::churches::ChurchesCommand,
    },
    /// Usuários do sistema
    Users {
        #[command(subcommand)]
        command: handlers::users::UsersCommand,
    },
    /// Razão de movimentações de estoque
    Stock {
        #[command(subcommand)]
        command: handlers::stock::StockCommand,
    },
}

#[tokio::main]
async fn main() {
    // Inicializa o logger; RUST_LOG controla a verbosidade.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    // .expect() é bom aqui: se a configuração falhar, nada mais funciona.
    let app_state = AppState::new().expect("Falha ao inicializar o estado da aplicação.");

    let result = match cli.command {
        Commands::Login { username, password } => {
            handlers::auth::login(&app_state, &username, &password).await
        }
        Commands::Logout => handlers::auth::logout(&app_state),
        Commands::Whoami => handlers::auth::whoami(&app_state, cli.json).await,
        Commands::Orders { command } => handlers::orders::run(&app_state, command, cli.json).await,
        Commands::Products { command } => {
            handlers::catalog::run_products(&app_state, command, cli.json).await
        }
        Commands::Categories { command } => {
            handlers::catalog::run_categories(&app_state, command, cli.json).await
        }
        Commands::Churches { command } => {
            handlers::churches::run(&app_state, command, cli.json).await
        }
        Commands::Users { command } => handlers::users::run(&app_state, command, cli.json).await,
        Commands::Stock { command } => handlers::stock::run(&app_state, command, cli.json).await,
    };

    if let Err(err) = result {
        eprintln!("Erro: {}", err.user_message());
        std::process::exit(1);
    }
}
