// src/services/user_service.rs

use std::sync::Arc;

use crate::{
    api::{paging::ListResponse, session::SessionManager},
    common::error::AppError,
    models::user::{Me, User, UserPayload},
};

#[derive(Clone)]
pub struct UserService {
    session: Arc<SessionManager>,
}

impl UserService {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    // Perfil do usuário autenticado, com o conjunto de igrejas vinculadas.
    // É daqui que sai o conjunto permitido para quem não é ADM.
    pub async fn me(&self) -> Result<Me, AppError> {
        self.session.get_json("/users/me", &[]).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let response: ListResponse<User> = self.session.get_json("/users", &[]).await?;
        Ok(response.into_paged().data)
    }

    pub async fn create_user(&self, payload: &UserPayload) -> Result<User, AppError> {
        self.session.post_json("/users", payload).await
    }
}
