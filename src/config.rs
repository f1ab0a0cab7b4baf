// src/config.rs

use std::{env, sync::Arc, time::Duration};

use crate::{
    api::{session::SessionManager, store::TokenStore, transport::ReqwestTransport},
    services::{
        catalog_service::CatalogService, church_service::ChurchService,
        order_service::OrderService, stock_service::StockService, user_service::UserService,
    },
};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_FILE: &str = ".cns_session.json";

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionManager>,
    pub catalog_service: CatalogService,
    pub church_service: ChurchService,
    pub user_service: UserService,
    pub stock_service: StockService,
    pub order_service: OrderService,
}

impl AppState {
    pub fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let base_url =
            env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let session_file =
            env::var("SESSION_FILE").unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string());

        tracing::debug!("API em {base_url}, timeout de {timeout_secs}s");

        // --- Monta o gráfico de dependências ---
        let transport = ReqwestTransport::new(&base_url, Duration::from_secs(timeout_secs))
            .map_err(|e| anyhow::anyhow!("Falha ao construir o cliente HTTP: {e}"))?;
        let session = Arc::new(SessionManager::new(
            Arc::new(transport),
            TokenStore::new(session_file),
        ));

        let catalog_service = CatalogService::new(session.clone());
        let church_service = ChurchService::new(session.clone());
        let user_service = UserService::new(session.clone());
        let stock_service = StockService::new(session.clone());
        let order_service = OrderService::new(
            session.clone(),
            catalog_service.clone(),
            church_service.clone(),
            user_service.clone(),
        );

        Ok(Self {
            session,
            catalog_service,
            church_service,
            user_service,
            stock_service,
            order_service,
        })
    }
}
