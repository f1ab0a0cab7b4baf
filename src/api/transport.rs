// src/api/transport.rs

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    api::request::{ApiRequest, HttpResponse},
    common::error::AppError,
};

// Fronteira entre o cliente e a rede. O SessionManager e os testes só
// conhecem este trait; a implementação real usa reqwest, a de teste é um
// roteiro de respostas.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<HttpResponse, AppError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    // Um único Client para o processo inteiro, com timeout limitado para
    // nenhuma chamada ficar pendurada indefinidamente.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<HttpResponse, AppError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!("{} {}", request.method, url);

        // Timeout e falha de conexão viram RequestFailed via From<reqwest::Error>.
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }
}
