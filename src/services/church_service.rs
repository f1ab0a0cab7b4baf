// src/services/church_service.rs

use std::sync::Arc;

use crate::{
    api::{paging::ListResponse, session::SessionManager},
    common::error::AppError,
    models::church::{Church, ChurchPayload},
};

#[derive(Clone)]
pub struct ChurchService {
    session: Arc<SessionManager>,
}

impl ChurchService {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    pub async fn list_churches(&self) -> Result<Vec<Church>, AppError> {
        let response: ListResponse<Church> = self.session.get_json("/churches", &[]).await?;
        Ok(response.into_paged().data)
    }

    pub async fn list_cities(&self) -> Result<Vec<String>, AppError> {
        self.session.get_json("/churches/cities", &[]).await
    }

    pub async fn create_church(&self, payload: &ChurchPayload) -> Result<Church, AppError> {
        self.session.post_json("/churches", payload).await
    }

    pub async fn update_church(
        &self,
        church_id: i64,
        payload: &ChurchPayload,
    ) -> Result<Church, AppError> {
        self.session
            .put_json(&format!("/churches/{church_id}"), payload)
            .await
    }

    pub async fn delete_church(&self, church_id: i64) -> Result<(), AppError> {
        self.session.delete(&format!("/churches/{church_id}")).await
    }
}
