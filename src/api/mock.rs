// src/api/mock.rs
//
// Transporte de mentira para os testes: um roteiro de respostas e o
// registro de tudo que o cliente enviou, na ordem. Permite afirmar o
// comportamento do SessionManager e dos serviços sem nenhuma rede.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header};

use crate::{
    api::{
        request::{ApiRequest, HttpResponse},
        transport::Transport,
    },
    common::error::AppError,
    models::auth::{Claims, Role},
};

pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, AppError>>>,
    seen: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            body: body.to_string().into_bytes(),
        }));
    }

    pub fn push_bytes(&self, status: u16, body: Vec<u8>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse { status, body }));
    }

    // Simula uma chamada que estourou o timeout do cliente HTTP.
    pub fn push_timeout(&self) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(AppError::request_failed(
                None,
                "Tempo limite de conexão com a API excedido.",
            )));
    }

    pub fn seen(&self) -> Vec<ApiRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<HttpResponse, AppError> {
        let label = format!("{} {}", request.method, request.path);
        self.seen.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("MockTransport sem resposta programada para {label}"))
    }
}

// Token assinado com segredo de teste; o cliente decodifica claims sem
// validar assinatura, então qualquer segredo serve. Determinístico para as
// asserções de igualdade de bearer.
pub fn test_token(role: Role, user_id: i64) -> String {
    test_token_exp(role, user_id, 4_102_444_800)
}

pub fn test_token_exp(role: Role, user_id: i64, exp: usize) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        role: Some(role),
        user_id: Some(user_id),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"segredo-de-teste"),
    )
    .expect("claims de teste sempre serializam")
}
