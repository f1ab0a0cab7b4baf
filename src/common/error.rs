// src/common/error.rs

use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Erros de validação nunca chegam à rede; AuthExpired é terminal e exige
// novo login; todo o resto vira RequestFailed com a mensagem do servidor.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Sessão expirada. Faça login novamente.")]
    AuthExpired,

    #[error("{message}")]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Ação '{action}' não permitida para pedido com status {status}.")]
    InvalidTransition { action: String, status: String },

    #[error("Nenhum pedido selecionado.")]
    NoSelection,

    #[error("Você precisa do papel ADM para realizar esta ação: {0}.")]
    Forbidden(String),

    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resposta da API em formato inesperado: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado.
    #[error("Erro interno: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    // Atalho para erros de validação detectados manualmente (igreja fora do
    // conjunto permitido, lista de itens vazia etc.), mantendo o mesmo
    // formato dos erros do `validator`.
    pub fn invalid(field: &'static str, message: &str) -> Self {
        let mut err = validator::ValidationError::new("invalid");
        err.message = Some(message.to_string().into());
        let mut errors = validator::ValidationErrors::new();
        errors.add(field.into(), err);
        AppError::ValidationError(errors)
    }

    pub fn request_failed(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::RequestFailed {
            status,
            message: message.into(),
        }
    }

    // Mensagem única para exibição no terminal. Erros de validação são
    // achatados campo a campo.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ValidationError(errors) => {
                let mut parts = Vec::new();
                for (field, field_errors) in errors.field_errors() {
                    for e in field_errors.iter() {
                        let msg = e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "valor inválido".to_string());
                        parts.push(format!("{field}: {msg}"));
                    }
                }
                if parts.is_empty() {
                    "Um ou mais campos são inválidos.".to_string()
                } else {
                    parts.join("; ")
                }
            }
            other => other.to_string(),
        }
    }
}

// Erros de rede do reqwest viram RequestFailed. Timeout NÃO é AuthExpired:
// uma requisição pendurada não derruba a sessão.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Tempo limite de conexão com a API excedido.".to_string()
        } else if err.is_connect() {
            "Não foi possível conectar à API.".to_string()
        } else {
            format!("Falha na comunicação com a API: {err}")
        };
        AppError::RequestFailed {
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_builds_validation_error_for_field() {
        let err = AppError::invalid("church_id", "Selecione a igreja");
        match &err {
            AppError::ValidationError(errors) => {
                assert!(errors.field_errors().contains_key("church_id"));
            }
            other => panic!("esperava ValidationError, veio {other:?}"),
        }
        assert!(err.user_message().contains("Selecione a igreja"));
    }

    #[test]
    fn request_failed_keeps_server_detail() {
        let err = AppError::request_failed(Some(400), "Insufficient stock");
        assert_eq!(err.user_message(), "Insufficient stock");
    }
}
