// src/services/order_service.rs

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::{
    api::{paging::ListResponse, session::SessionManager},
    common::{
        error::AppError,
        rbac::{Action, role_allows},
    },
    models::{
        auth::Role,
        church::Church,
        order::{Order, OrderItemPayload, OrderPayload, OrderStatus},
        product::{Category, Product},
    },
    services::{
        catalog_service::{CatalogService, ProductFilter},
        church_service::ChurchService,
        user_service::UserService,
    },
};

// Limita a quantidade pedida ao intervalo [0, estoque]. Com isso um pedido
// acima do estoque simplesmente não é construível no cliente; o servidor
// ainda revalida na aprovação.
pub fn clamp_quantity(raw: i64, stock_qty: i64) -> u32 {
    raw.clamp(0, stock_qty.max(0)) as u32
}

// Tudo que a tela de pedido precisa, carregado de uma vez: categorias,
// catálogo e o conjunto de igrejas VISÍVEL ao usuário (todas para ADM,
// só as vinculadas para USUARIO).
#[derive(Debug, Clone)]
pub struct CatalogContext {
    pub role: Role,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub churches: Vec<Church>,
}

impl CatalogContext {
    pub fn product(&self, product_id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    pub fn church_allowed(&self, church_id: i64) -> bool {
        self.churches.iter().any(|c| c.id == church_id)
    }
}

// Estado local do formulário de pedido. Itens com quantidade zero ficam no
// rascunho (o usuário pode voltar a mexer), mas caem na submissão.
#[derive(Debug, Default, Clone)]
pub struct OrderDraft {
    pub church_id: Option<i64>,
    items: BTreeMap<i64, u32>,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    // Reaproveita um pedido pendente existente: mesma igreja, mesmos itens.
    pub fn seeded_from(order: &Order) -> Self {
        let mut draft = Self::new();
        draft.church_id = Some(order.church_id);
        for item in &order.items {
            draft.items.insert(item.product_id, item.qty);
        }
        draft
    }

    pub fn set_church(&mut self, church_id: i64) {
        self.church_id = Some(church_id);
    }

    // Aplica o clamp e devolve a quantidade efetivamente registrada.
    pub fn set_item_quantity(&mut self, product: &Product, raw_qty: i64) -> u32 {
        let qty = clamp_quantity(raw_qty, product.stock_qty);
        self.items.insert(product.id, qty);
        qty
    }

    pub fn quantity(&self, product_id: i64) -> u32 {
        self.items.get(&product_id).copied().unwrap_or(0)
    }

    // Itens escolhidos para envio; zeros são descartados aqui.
    pub fn chosen_items(&self) -> Vec<OrderItemPayload> {
        self.items
            .iter()
            .filter(|(_, qty)| **qty > 0)
            .map(|(product_id, qty)| OrderItemPayload {
                product_id: *product_id,
                qty: *qty,
            })
            .collect()
    }
}

// Controlador do ciclo de vida do pedido: criação/edição enquanto
// pendente, aprovação, entrega e recibos. Nunca muda status localmente;
// depois de cada transição a lista é recarregada do servidor.
#[derive(Clone)]
pub struct OrderService {
    session: Arc<SessionManager>,
    catalog: CatalogService,
    churches: ChurchService,
    users: UserService,
    // cache da listagem; invalidado por toda operação de escrita
    cached_orders: Arc<Mutex<Option<Vec<Order>>>>,
}

impl OrderService {
    pub fn new(
        session: Arc<SessionManager>,
        catalog: CatalogService,
        churches: ChurchService,
        users: UserService,
    ) -> Self {
        Self {
            session,
            catalog,
            churches,
            users,
            cached_orders: Arc::new(Mutex::new(None)),
        }
    }

    fn require_role(&self) -> Result<Role, AppError> {
        self.session.role().ok_or(AppError::AuthExpired)
    }

    fn require_capability(&self, action: Action) -> Result<(), AppError> {
        let role = self.require_role()?;
        if !role_allows(role, action) {
            return Err(AppError::Forbidden(action.label().to_string()));
        }
        Ok(())
    }

    // ---
    // Carga do contexto de pedido
    // ---

    // As quatro buscas são independentes e vão em paralelo.
    pub async fn load_catalog_context(&self) -> Result<CatalogContext, AppError> {
        let role = self.require_role()?;

        let filter = ProductFilter {
            limit: Some(100),
            ..ProductFilter::default()
        };
        let (categories, products, all_churches, me) = tokio::try_join!(
            self.catalog.list_categories(),
            self.catalog.list_products(&filter),
            self.churches.list_churches(),
            self.users.me(),
        )?;

        // USUARIO só enxerga (e só pode submeter) as igrejas vinculadas.
        let churches = if role.is_admin() {
            all_churches
        } else {
            let allowed: Vec<i64> = me.churches.iter().map(|c| c.id).collect();
            all_churches
                .into_iter()
                .filter(|c| allowed.contains(&c.id))
                .collect()
        };

        Ok(CatalogContext {
            role,
            categories,
            products: products.data,
            churches,
        })
    }

    // ---
    // Listagem (com cache) e resolução de pendente
    // ---

    pub async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        if let Ok(guard) = self.cached_orders.lock() {
            if let Some(cached) = guard.as_ref() {
                return Ok(cached.clone());
            }
        }

        let response: ListResponse<Order> = self.session.get_json("/orders", &[]).await?;
        let orders = response.into_paged().data;

        if let Ok(mut guard) = self.cached_orders.lock() {
            *guard = Some(orders.clone());
        }
        Ok(orders)
    }

    fn invalidate_orders(&self) {
        if let Ok(mut guard) = self.cached_orders.lock() {
            *guard = None;
        }
    }

    // Pedido PENDENTE do próprio usuário, se existir. É o que transforma a
    // tela de criação em edição e garante no máximo um pendente por pessoa.
    pub async fn resolve_pending_order(&self) -> Result<Option<Order>, AppError> {
        let Some(user_id) = self.session.current_user_id() else {
            return Ok(None);
        };
        let orders = self.list_orders().await?;
        Ok(orders
            .into_iter()
            .find(|o| o.status == OrderStatus::Pendente && o.requester_id == user_id))
    }

    // ---
    // Submissão: cria ou atualiza em-place o pendente existente
    // ---

    pub async fn submit_order(
        &self,
        draft: &OrderDraft,
        context: &CatalogContext,
    ) -> Result<Order, AppError> {
        // Validações locais primeiro; nenhuma delas gera tráfego de rede.
        let Some(church_id) = draft.church_id else {
            return Err(AppError::invalid("church_id", "Selecione a igreja."));
        };
        if !context.church_allowed(church_id) {
            return Err(AppError::invalid(
                "church_id",
                "Igreja fora do conjunto permitido para este usuário.",
            ));
        }
        let items = draft.chosen_items();
        if items.is_empty() {
            return Err(AppError::invalid("items", "Selecione ao menos 1 item."));
        }

        let payload = OrderPayload { church_id, items };

        // Reenviar com um pendente em aberto substitui a lista de itens
        // daquele pedido; nunca nasce um segundo PENDENTE para o usuário.
        let order = match self.resolve_pending_order().await? {
            Some(pending) => {
                self.session
                    .put_json(&format!("/orders/{}", pending.id), &payload)
                    .await?
            }
            None => self.session.post_json("/orders", &payload).await?,
        };

        self.invalidate_orders();
        Ok(order)
    }

    // ---
    // Transições (ADM)
    // ---

    pub async fn approve(&self, order: &Order) -> Result<Order, AppError> {
        self.require_capability(Action::ApproveOrder)?;
        if order.status != OrderStatus::Pendente {
            return Err(AppError::InvalidTransition {
                action: "aprovar".to_string(),
                status: order.status.to_string(),
            });
        }

        let approved = self
            .session
            .put_action(&format!("/orders/{}/approve", order.id))
            .await?;
        self.invalidate_orders();
        Ok(approved)
    }

    pub async fn deliver(&self, order: &Order) -> Result<Order, AppError> {
        self.require_capability(Action::DeliverOrder)?;
        if order.status != OrderStatus::Aprovado {
            return Err(AppError::InvalidTransition {
                action: "entregar".to_string(),
                status: order.status.to_string(),
            });
        }

        let delivered = self
            .session
            .put_action(&format!("/orders/{}/deliver", order.id))
            .await?;
        self.invalidate_orders();
        Ok(delivered)
    }

    // ---
    // Recibos (somente pedidos ENTREGUE)
    // ---

    pub async fn fetch_receipt(&self, order: &Order) -> Result<Vec<u8>, AppError> {
        self.require_capability(Action::DownloadReceipt)?;
        if order.status != OrderStatus::Entregue {
            return Err(AppError::InvalidTransition {
                action: "baixar recibo".to_string(),
                status: order.status.to_string(),
            });
        }
        self.session
            .get_bytes(&format!("/orders/{}/receipt", order.id))
            .await
    }

    pub async fn fetch_batch_receipts(&self, order_ids: &[i64]) -> Result<Vec<u8>, AppError> {
        self.require_capability(Action::DownloadReceipt)?;
        if order_ids.is_empty() {
            return Err(AppError::NoSelection);
        }
        self.session
            .post_bytes("/orders/batch-receipts", &order_ids)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{
            mock::{MockTransport, test_token},
            store::TokenStore,
        },
        models::auth::TokenPair,
    };
    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn service_with(name: &str, transport: Arc<MockTransport>, role: Role) -> OrderService {
        let path = std::env::temp_dir().join(format!(
            "cns-admin-orders-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let store = TokenStore::new(path);
        store
            .save(&TokenPair {
                access: test_token(role, 7),
                refresh: "refresh".to_string(),
            })
            .unwrap();
        let session = Arc::new(SessionManager::new(transport, store));
        OrderService::new(
            session.clone(),
            CatalogService::new(session.clone()),
            ChurchService::new(session.clone()),
            UserService::new(session),
        )
    }

    fn paper_product() -> Product {
        Product {
            id: 1,
            name: "Papel toalha".to_string(),
            category_id: Some(1),
            unit: "pct".to_string(),
            price: Decimal::new(25, 1),
            stock_qty: 10,
            low_stock_threshold: 2,
            is_active: true,
        }
    }

    fn sample_context(role: Role) -> CatalogContext {
        CatalogContext {
            role,
            categories: vec![Category {
                id: 1,
                name: "Limpeza".to_string(),
            }],
            products: vec![paper_product()],
            churches: vec![Church {
                id: 1,
                name: "Central".to_string(),
                city: "Campinas".to_string(),
            }],
        }
    }

    fn local_order(status: OrderStatus) -> Order {
        Order {
            id: 42,
            requester_id: 7,
            church_id: 1,
            status,
            created_at: Utc::now(),
            approved_at: None,
            delivered_at: None,
            items: Vec::new(),
        }
    }

    fn order_json(id: i64, requester_id: i64, status: &str, qty: u32) -> serde_json::Value {
        json!({
            "id": id,
            "requester_id": requester_id,
            "church_id": 1,
            "status": status,
            "created_at": "2026-01-05T12:00:00Z",
            "approved_at": null,
            "delivered_at": null,
            "items": [
                {"id": 10, "product_id": 1, "qty": qty, "unit_price": 2.5, "subtotal": 12.5}
            ]
        })
    }

    // --- clamp ---

    #[test]
    fn clamp_keeps_quantity_inside_stock_bounds() {
        assert_eq!(clamp_quantity(-3, 10), 0);
        assert_eq!(clamp_quantity(0, 10), 0);
        assert_eq!(clamp_quantity(5, 10), 5);
        assert_eq!(clamp_quantity(10, 10), 10);
        assert_eq!(clamp_quantity(11, 10), 10);
        // produto sem estoque nunca aceita quantidade
        assert_eq!(clamp_quantity(4, 0), 0);
        assert_eq!(clamp_quantity(4, -1), 0);
    }

    #[test]
    fn draft_drops_zero_quantities_at_submission() {
        let product = paper_product();
        let mut draft = OrderDraft::new();

        assert_eq!(draft.set_item_quantity(&product, 25), 10);
        assert_eq!(draft.set_item_quantity(&product, 0), 0);
        assert!(draft.chosen_items().is_empty());

        draft.set_item_quantity(&product, 5);
        let items = draft.chosen_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, 1);
        assert_eq!(items[0].qty, 5);
    }

    #[test]
    fn draft_seeded_from_pending_order_keeps_church_and_items() {
        let mut order = local_order(OrderStatus::Pendente);
        order.items = vec![crate::models::order::OrderItem {
            id: Some(10),
            product_id: 1,
            qty: 5,
            unit_price: Decimal::new(25, 1),
            subtotal: None,
        }];

        let draft = OrderDraft::seeded_from(&order);
        assert_eq!(draft.church_id, Some(1));
        assert_eq!(draft.quantity(1), 5);
    }

    // --- submissão ---

    #[tokio::test]
    async fn submit_without_church_is_local_validation_error() {
        let transport = MockTransport::new();
        let service = service_with("no-church", transport.clone(), Role::Usuario);

        let mut draft = OrderDraft::new();
        draft.set_item_quantity(&paper_product(), 5);

        let err = service
            .submit_order(&draft, &sample_context(Role::Usuario))
            .await
            .expect_err("sem igreja não submete");
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(transport.seen().is_empty(), "validação nunca vai à rede");
    }

    #[tokio::test]
    async fn submit_outside_allowed_churches_is_rejected_locally() {
        let transport = MockTransport::new();
        let service = service_with("bad-church", transport.clone(), Role::Usuario);

        let mut draft = OrderDraft::new();
        draft.set_church(99);
        draft.set_item_quantity(&paper_product(), 5);

        let err = service
            .submit_order(&draft, &sample_context(Role::Usuario))
            .await
            .expect_err("igreja fora do conjunto permitido");
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(transport.seen().is_empty());
    }

    #[tokio::test]
    async fn submit_with_empty_items_is_rejected_locally() {
        let transport = MockTransport::new();
        let service = service_with("no-items", transport.clone(), Role::Usuario);

        let mut draft = OrderDraft::new();
        draft.set_church(1);
        draft.set_item_quantity(&paper_product(), 0);

        let err = service
            .submit_order(&draft, &sample_context(Role::Usuario))
            .await
            .expect_err("pedido vazio não submete");
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(transport.seen().is_empty());
    }

    #[tokio::test]
    async fn submit_without_pending_creates_a_new_order() {
        let transport = MockTransport::new();
        // resolução de pendente: nenhum pedido do usuário
        transport.push_json(200, json!([]));
        transport.push_json(201, order_json(50, 7, "PENDENTE", 5));
        let service = service_with("create", transport.clone(), Role::Usuario);

        let mut draft = OrderDraft::new();
        draft.set_church(1);
        draft.set_item_quantity(&paper_product(), 5);

        let order = service
            .submit_order(&draft, &sample_context(Role::Usuario))
            .await
            .unwrap();
        assert_eq!(order.id, 50);

        let seen = transport.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].method, reqwest::Method::POST);
        assert_eq!(seen[1].path, "/orders");
        assert_eq!(
            seen[1].body.as_ref().unwrap(),
            &json!({"church_id": 1, "items": [{"product_id": 1, "qty": 5}]})
        );
    }

    #[tokio::test]
    async fn submit_with_pending_updates_it_in_place() {
        let transport = MockTransport::new();
        // o usuário 7 já tem o pedido #42 pendente
        transport.push_json(200, json!([order_json(42, 7, "PENDENTE", 5)]));
        transport.push_json(200, order_json(42, 7, "PENDENTE", 8));
        let service = service_with("update", transport.clone(), Role::Usuario);

        let mut draft = OrderDraft::new();
        draft.set_church(1);
        draft.set_item_quantity(&paper_product(), 8);

        let order = service
            .submit_order(&draft, &sample_context(Role::Usuario))
            .await
            .unwrap();
        assert_eq!(order.id, 42);

        let seen = transport.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].method, reqwest::Method::PUT);
        assert_eq!(seen[1].path, "/orders/42");
        assert_eq!(
            seen[1].body.as_ref().unwrap(),
            &json!({"church_id": 1, "items": [{"product_id": 1, "qty": 8}]})
        );
    }

    #[tokio::test]
    async fn pending_order_of_another_requester_is_ignored() {
        let transport = MockTransport::new();
        transport.push_json(200, json!([order_json(42, 99, "PENDENTE", 5)]));
        let service = service_with("other-user", transport.clone(), Role::Usuario);

        let pending = service.resolve_pending_order().await.unwrap();
        assert!(pending.is_none());
    }

    // --- listagem e cache ---

    #[tokio::test]
    async fn order_list_is_cached_until_a_write_invalidates_it() {
        let transport = MockTransport::new();
        transport.push_json(200, json!([order_json(42, 7, "PENDENTE", 5)]));
        let service = service_with("cache", transport.clone(), Role::Adm);

        service.list_orders().await.unwrap();
        service.list_orders().await.unwrap();
        assert_eq!(transport.seen().len(), 1, "segunda leitura veio do cache");

        // aprovação invalida; a próxima leitura volta ao servidor
        transport.push_json(200, order_json(42, 7, "APROVADO", 5));
        transport.push_json(200, json!([order_json(42, 7, "APROVADO", 5)]));

        service.approve(&local_order(OrderStatus::Pendente)).await.unwrap();
        let orders = service.list_orders().await.unwrap();
        assert_eq!(orders[0].status, OrderStatus::Aprovado);
        assert_eq!(transport.seen().len(), 3);
    }

    #[tokio::test]
    async fn list_handles_both_response_shapes() {
        let transport = MockTransport::new();
        transport.push_json(
            200,
            json!({"data": [order_json(1, 7, "ENTREGUE", 2)], "total": 1}),
        );
        let service = service_with("envelope", transport.clone(), Role::Adm);

        let orders = service.list_orders().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Entregue);
    }

    // --- transições ---

    #[tokio::test]
    async fn approve_requires_pending_status() {
        let transport = MockTransport::new();
        let service = service_with("approve-guard", transport.clone(), Role::Adm);

        let err = service
            .approve(&local_order(OrderStatus::Aprovado))
            .await
            .expect_err("aprovar de novo é transição inválida");
        assert!(matches!(err, AppError::InvalidTransition { .. }));
        assert!(transport.seen().is_empty(), "guarda local não vai à rede");
    }

    #[tokio::test]
    async fn deliver_requires_approved_status() {
        let transport = MockTransport::new();
        let service = service_with("deliver-guard", transport.clone(), Role::Adm);

        let err = service
            .deliver(&local_order(OrderStatus::Pendente))
            .await
            .expect_err("entregar sem aprovar é transição inválida");
        assert!(matches!(err, AppError::InvalidTransition { .. }));
        assert!(transport.seen().is_empty());
    }

    #[tokio::test]
    async fn approve_is_denied_for_usuario() {
        let transport = MockTransport::new();
        let service = service_with("approve-role", transport.clone(), Role::Usuario);

        let err = service
            .approve(&local_order(OrderStatus::Pendente))
            .await
            .expect_err("USUARIO não aprova pedido");
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(transport.seen().is_empty());
    }

    // --- recibos ---

    #[tokio::test]
    async fn receipt_requires_delivered_status() {
        let transport = MockTransport::new();
        let service = service_with("receipt-guard", transport.clone(), Role::Adm);

        let err = service
            .fetch_receipt(&local_order(OrderStatus::Aprovado))
            .await
            .expect_err("recibo só depois da entrega");
        assert!(matches!(err, AppError::InvalidTransition { .. }));
        assert!(transport.seen().is_empty());
    }

    #[tokio::test]
    async fn receipt_returns_binary_body() {
        let transport = MockTransport::new();
        transport.push_bytes(200, vec![0x25, 0x50, 0x44, 0x46]); // "%PDF"
        let service = service_with("receipt", transport.clone(), Role::Adm);

        let bytes = service
            .fetch_receipt(&local_order(OrderStatus::Entregue))
            .await
            .unwrap();
        assert_eq!(&bytes[..4], b"%PDF");
        assert_eq!(transport.seen()[0].path, "/orders/42/receipt");
    }

    #[tokio::test]
    async fn batch_receipts_fail_fast_on_empty_selection() {
        let transport = MockTransport::new();
        let service = service_with("batch-empty", transport.clone(), Role::Adm);

        let err = service
            .fetch_batch_receipts(&[])
            .await
            .expect_err("seleção vazia não gera requisição");
        assert!(matches!(err, AppError::NoSelection));
        assert!(transport.seen().is_empty());
    }

    #[tokio::test]
    async fn batch_receipts_post_the_id_list() {
        let transport = MockTransport::new();
        transport.push_bytes(200, vec![0x25, 0x50, 0x44, 0x46]);
        let service = service_with("batch", transport.clone(), Role::Adm);

        service.fetch_batch_receipts(&[3, 5, 8]).await.unwrap();

        let seen = transport.seen();
        assert_eq!(seen[0].path, "/orders/batch-receipts");
        assert_eq!(seen[0].body.as_ref().unwrap(), &json!([3, 5, 8]));
    }

    // --- contexto de catálogo ---

    #[tokio::test]
    async fn catalog_context_restricts_churches_for_usuario() {
        let transport = MockTransport::new();
        transport.push_json(200, json!([{"id": 1, "name": "Limpeza"}]));
        transport.push_json(
            200,
            json!({"data": [{"id": 1, "name": "Papel", "category_id": 1, "unit": "pct",
                              "price": 2.5, "stock_qty": 10, "low_stock_threshold": 2,
                              "is_active": true}],
                   "total": 1}),
        );
        transport.push_json(
            200,
            json!([
                {"id": 1, "name": "Central", "city": "Campinas"},
                {"id": 2, "name": "Bairro Alto", "city": "Campinas"}
            ]),
        );
        transport.push_json(
            200,
            json!({"id": 7, "name": "Irmão José", "email": "jose@cns.org",
                   "role": "USUARIO",
                   "churches": [{"id": 1, "name": "Central", "city": "Campinas"}]}),
        );
        let service = service_with("context-usuario", transport.clone(), Role::Usuario);

        let context = service.load_catalog_context().await.unwrap();
        assert_eq!(context.churches.len(), 1);
        assert_eq!(context.churches[0].id, 1);
        assert!(context.church_allowed(1));
        assert!(!context.church_allowed(2));
        assert_eq!(context.products.len(), 1);
        assert_eq!(context.categories.len(), 1);
    }
}
