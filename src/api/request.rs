// src/api/request.rs

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::common::error::AppError;

// Descrição de uma chamada lógica à API. Diferente de um RequestBuilder,
// ela pode ser clonada, reautorizada e reenviada, que é o que permite ao
// SessionManager repetir a mesma chamada uma única vez após o refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post<B: Serialize>(path: &str, body: &B) -> Result<Self, AppError> {
        let mut request = Self::new(Method::POST, path);
        request.body = Some(serde_json::to_value(body)?);
        Ok(request)
    }

    pub fn put<B: Serialize>(path: &str, body: &B) -> Result<Self, AppError> {
        let mut request = Self::new(Method::PUT, path);
        request.body = Some(serde_json::to_value(body)?);
        Ok(request)
    }

    // PUT sem corpo (transições como /approve e /deliver).
    pub fn put_empty(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    // POST sem corpo (ex.: /products/{id}/duplicate).
    pub fn post_empty(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

// Resposta bruta vinda do transporte: status + corpo em bytes. Recibos são
// binários, então a decodificação JSON fica a cargo de quem chamou.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, AppError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    // A API devolve erros no formato {"detail": "..."}; quando o campo
    // existe, é essa a mensagem mostrada ao usuário.
    pub fn detail_message(&self) -> Option<String> {
        let value: Value = serde_json::from_slice(&self.body).ok()?;
        value
            .get("detail")
            .and_then(|d| d.as_str())
            .map(|s| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_serializes_body_and_query() {
        let request = ApiRequest::post("/orders", &json!({"church_id": 1}))
            .expect("corpo serializável")
            .with_query("page", 2);
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.query, vec![("page".to_string(), "2".to_string())]);
        assert!(request.body.is_some());
    }

    #[test]
    fn detail_message_reads_fastapi_error_body() {
        let response = HttpResponse {
            status: 400,
            body: br#"{"detail":"Insufficient stock"}"#.to_vec(),
        };
        assert_eq!(response.detail_message().as_deref(), Some("Insufficient stock"));

        let binary = HttpResponse {
            status: 200,
            body: vec![0x25, 0x50, 0x44, 0x46],
        };
        assert_eq!(binary.detail_message(), None);
    }
}
