// src/services/catalog_service.rs

use std::sync::Arc;

use crate::{
    api::{
        paging::{ListResponse, Paged},
        request::ApiRequest,
        session::SessionManager,
    },
    common::error::AppError,
    models::product::{Category, CategoryPayload, Product, ProductPayload, ProductUpdatePayload},
};

// Filtros aceitos por GET /products.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ProductFilter {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(category_id) = self.category_id {
            query.push(("category_id", category_id.to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        query
    }
}

// Catálogo: produtos e categorias andam juntos em todas as telas, então
// vivem no mesmo serviço.
#[derive(Clone)]
pub struct CatalogService {
    session: Arc<SessionManager>,
}

impl CatalogService {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    // --- PRODUTOS ---

    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Paged<Product>, AppError> {
        let response: ListResponse<Product> = self
            .session
            .get_json("/products", &filter.to_query())
            .await?;
        Ok(response.into_paged())
    }

    pub async fn create_product(&self, payload: &ProductPayload) -> Result<Product, AppError> {
        self.session.post_json("/products", payload).await
    }

    pub async fn update_product(
        &self,
        product_id: i64,
        payload: &ProductUpdatePayload,
    ) -> Result<Product, AppError> {
        self.session
            .put_json(&format!("/products/{product_id}"), payload)
            .await
    }

    pub async fn delete_product(&self, product_id: i64) -> Result<(), AppError> {
        self.session.delete(&format!("/products/{product_id}")).await
    }

    pub async fn duplicate_product(&self, product_id: i64) -> Result<Product, AppError> {
        let request = ApiRequest::post_empty(&format!("/products/{product_id}/duplicate"));
        self.session.dispatch(request).await?.json()
    }

    // --- CATEGORIAS ---

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let response: ListResponse<Category> = self.session.get_json("/categories", &[]).await?;
        Ok(response.into_paged().data)
    }

    pub async fn create_category(&self, payload: &CategoryPayload) -> Result<Category, AppError> {
        self.session.post_json("/categories", payload).await
    }
}
