// src/api/session.rs

use std::sync::{
    Arc, RwLock,
    atomic::{AtomicBool, Ordering},
};

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Serialize, de::DeserializeOwned};
use validator::Validate;

use crate::{
    api::{
        request::{ApiRequest, HttpResponse},
        store::TokenStore,
        transport::Transport,
    },
    common::error::AppError,
    models::auth::{Claims, LoginPayload, RefreshPayload, Role, TokenPair},
};

// Dono exclusivo do par de credenciais. Todo tráfego autenticado passa por
// `dispatch`, que resolve a expiração do access token de forma silenciosa:
// no primeiro 401 de uma chamada lógica ele renova os tokens e reenvia a
// mesma chamada UMA única vez. Falhou a renovação, a sessão acabou.
//
// Chamadas concorrentes que falham ao mesmo tempo disparam renovações
// independentes; não há deduplicação entre chamadas (limitação conhecida,
// o retry continua sendo no máximo um por chamada).
pub struct SessionManager {
    transport: Arc<dyn Transport>,
    store: TokenStore,
    credentials: RwLock<Option<TokenPair>>,
    expired_notified: AtomicBool,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn Transport>, store: TokenStore) -> Self {
        let credentials = store.load();
        Self {
            transport,
            store,
            credentials: RwLock::new(credentials),
            expired_notified: AtomicBool::new(false),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials
            .read()
            .map(|c| c.is_some())
            .unwrap_or(false)
    }

    // Papel vindo das claims do access token. Conveniência de interface:
    // o servidor revalida o papel em toda operação.
    pub fn role(&self) -> Option<Role> {
        self.claims().and_then(|c| c.role)
    }

    pub fn current_user_id(&self) -> Option<i64> {
        self.claims().and_then(|c| c.user_id)
    }

    fn claims(&self) -> Option<Claims> {
        let access = self
            .credentials
            .read()
            .ok()
            .and_then(|c| c.as_ref().map(|pair| pair.access.clone()))?;
        decode_claims(&access).ok()
    }

    // ---
    // Login / logout
    // ---

    pub async fn login(&self, username: &str, password: &str) -> Result<(), AppError> {
        let payload = LoginPayload {
            username: username.to_string(),
            password: password.to_string(),
        };
        payload.validate()?;

        // Login não passa por `dispatch`: um 401 aqui é credencial errada,
        // não access token vencido.
        let request = ApiRequest::post("/auth/login", &payload)?;
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            let message = response
                .detail_message()
                .unwrap_or_else(|| "Usuário ou senha inválidos.".to_string());
            return Err(AppError::request_failed(Some(response.status), message));
        }

        let pair: TokenPair = response.json()?;
        self.set_credentials(pair)?;
        tracing::info!("✅ Sessão iniciada.");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), AppError> {
        if let Ok(mut guard) = self.credentials.write() {
            *guard = None;
        }
        self.store.clear()?;
        tracing::info!("Sessão encerrada.");
        Ok(())
    }

    // ---
    // Caminho autenticado
    // ---

    // Anexa o access token atual como credencial bearer. Nenhum outro
    // efeito além do cabeçalho.
    pub fn authorize(&self, request: &mut ApiRequest) {
        if let Ok(guard) = self.credentials.read() {
            if let Some(pair) = guard.as_ref() {
                request.bearer = Some(pair.access.clone());
            }
        }
    }

    pub async fn dispatch(&self, request: ApiRequest) -> Result<HttpResponse, AppError> {
        let mut first = request.clone();
        self.authorize(&mut first);
        let response = self.transport.execute(first).await?;

        if !response.is_unauthorized() {
            return Self::into_result(response);
        }

        // Primeiro 401 desta chamada lógica: renova e reenvia uma vez.
        self.refresh().await?;

        let mut retry = request;
        self.authorize(&mut retry);
        let response = self.transport.execute(retry).await?;

        // Um segundo 401 cai aqui como RequestFailed comum: nunca há um
        // segundo retry para a mesma chamada.
        Self::into_result(response)
    }

    fn into_result(response: HttpResponse) -> Result<HttpResponse, AppError> {
        if response.is_success() {
            return Ok(response);
        }
        let message = response
            .detail_message()
            .unwrap_or_else(|| "Ocorreu um erro inesperado na comunicação com a API.".to_string());
        Err(AppError::request_failed(Some(response.status), message))
    }

    // Renovação silenciosa com o refresh token guardado. Resposta de erro
    // da API encerra a sessão; falha de rede/timeout NÃO encerra (a
    // credencial pode continuar válida) e sobe como RequestFailed.
    async fn refresh(&self) -> Result<(), AppError> {
        let refresh_token = self
            .credentials
            .read()
            .ok()
            .and_then(|c| c.as_ref().map(|pair| pair.refresh.clone()));

        let Some(refresh_token) = refresh_token else {
            return Err(self.expire());
        };

        let request = ApiRequest::post(
            "/auth/refresh",
            &RefreshPayload {
                refresh: refresh_token,
            },
        )?;
        let response = self.transport.execute(request).await?;

        if !response.is_success() {
            return Err(self.expire());
        }

        let pair: TokenPair = match response.json() {
            Ok(pair) => pair,
            Err(_) => return Err(self.expire()),
        };

        // Troca atômica dos dois tokens: memória e espelho em disco.
        self.set_credentials(pair)?;
        tracing::debug!("Tokens renovados após 401.");
        Ok(())
    }

    fn set_credentials(&self, pair: TokenPair) -> Result<(), AppError> {
        self.store.save(&pair)?;
        if let Ok(mut guard) = self.credentials.write() {
            *guard = Some(pair);
        }
        self.expired_notified.store(false, Ordering::SeqCst);
        Ok(())
    }

    // Estado terminal: limpa as credenciais e avisa uma única vez por
    // ciclo de vida de credencial que é preciso logar de novo.
    fn expire(&self) -> AppError {
        if let Ok(mut guard) = self.credentials.write() {
            *guard = None;
        }
        if let Err(e) = self.store.clear() {
            tracing::warn!("Falha ao limpar o arquivo de sessão: {e}");
        }
        if !self.expired_notified.swap(true, Ordering::SeqCst) {
            tracing::warn!("Sessão expirada; credenciais removidas.");
        }
        AppError::AuthExpired
    }

    // ---
    // Atalhos tipados sobre `dispatch`
    // ---

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let mut request = ApiRequest::get(path);
        for (key, value) in query {
            request = request.with_query(key, value.clone());
        }
        self.dispatch(request).await?.json()
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let request = ApiRequest::post(path, body)?;
        self.dispatch(request).await?.json()
    }

    pub async fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let request = ApiRequest::put(path, body)?;
        self.dispatch(request).await?.json()
    }

    // PUT sem corpo, usado nas transições de pedido.
    pub async fn put_action<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        self.dispatch(ApiRequest::put_empty(path)).await?.json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), AppError> {
        self.dispatch(ApiRequest::delete(path)).await?;
        Ok(())
    }

    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, AppError> {
        Ok(self.dispatch(ApiRequest::get(path)).await?.body)
    }

    pub async fn post_bytes<B: Serialize>(&self, path: &str, body: &B) -> Result<Vec<u8>, AppError> {
        let request = ApiRequest::post(path, body)?;
        Ok(self.dispatch(request).await?.body)
    }
}

// Decodifica as claims SEM validar assinatura nem expiração: o cliente não
// tem o segredo e precisa ler o papel até de um token já vencido.
pub fn decode_claims(token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockTransport, test_token};
    use serde_json::json;

    fn temp_store(name: &str) -> TokenStore {
        let path = std::env::temp_dir().join(format!(
            "cns-admin-session-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        TokenStore::new(path)
    }

    fn authenticated_session(name: &str, transport: Arc<MockTransport>) -> SessionManager {
        let store = temp_store(name);
        store
            .save(&TokenPair {
                access: test_token(Role::Usuario, 7),
                refresh: "refresh-antigo".to_string(),
            })
            .unwrap();
        SessionManager::new(transport, store)
    }

    #[tokio::test]
    async fn dispatch_success_sends_bearer_and_no_retry() {
        let transport = MockTransport::new();
        transport.push_json(200, json!([]));
        let session = authenticated_session("ok", transport.clone());

        let response = session.dispatch(ApiRequest::get("/orders")).await.unwrap();
        assert_eq!(response.status, 200);

        let seen = transport.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].bearer.as_deref(), Some(test_token(Role::Usuario, 7).as_str()));
    }

    #[tokio::test]
    async fn expired_access_token_refreshes_once_and_replays() {
        use crate::api::mock::test_token_exp;

        let old_access = test_token_exp(Role::Usuario, 7, 1_000);
        let new_access = test_token_exp(Role::Usuario, 7, 2_000);

        let transport = MockTransport::new();
        transport.push_json(401, json!({"detail": "Token expired"}));
        transport.push_json(200, json!({"access": new_access, "refresh": "refresh-novo"}));
        transport.push_json(200, json!({"id": 1}));

        let store = temp_store("refresh-ok");
        store
            .save(&TokenPair {
                access: old_access.clone(),
                refresh: "refresh-antigo".to_string(),
            })
            .unwrap();
        let session = SessionManager::new(transport.clone(), store);

        let response = session.dispatch(ApiRequest::get("/orders")).await.unwrap();
        assert_eq!(response.status, 200);

        let seen = transport.seen();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].bearer.as_deref(), Some(old_access.as_str()));
        // renovação usa o refresh token antigo, sem bearer
        assert_eq!(seen[1].path, "/auth/refresh");
        assert!(seen[1].bearer.is_none());
        assert_eq!(
            seen[1].body.as_ref().unwrap()["refresh"],
            json!("refresh-antigo")
        );
        // o replay é a MESMA chamada lógica, reautorizada com o token novo
        assert_eq!(seen[2].path, "/orders");
        assert_eq!(seen[2].bearer.as_deref(), Some(new_access.as_str()));
    }

    #[tokio::test]
    async fn failed_refresh_clears_credentials_and_stops() {
        let transport = MockTransport::new();
        transport.push_json(401, json!({"detail": "Token expired"}));
        transport.push_json(401, json!({"detail": "Invalid refresh token"}));
        let session = authenticated_session("refresh-fail", transport.clone());

        let err = session
            .dispatch(ApiRequest::get("/orders"))
            .await
            .expect_err("refresh inválido deve encerrar a sessão");
        assert!(matches!(err, AppError::AuthExpired));

        // nada além da chamada original + tentativa de refresh
        assert_eq!(transport.seen().len(), 2);
        assert!(!session.is_authenticated());

        // sem refresh token guardado, um novo 401 expira na hora: não há
        // nova tentativa de renovação nem replay
        transport.push_json(401, json!({"detail": "Not authenticated"}));
        let err = session
            .dispatch(ApiRequest::get("/orders"))
            .await
            .expect_err("sem credenciais não há retry");
        assert!(matches!(err, AppError::AuthExpired));
        assert_eq!(transport.seen().len(), 3); // só o 401 da nova chamada
        assert!(transport.seen()[2].bearer.is_none());
    }

    #[tokio::test]
    async fn second_401_after_refresh_is_not_retried_again() {
        let transport = MockTransport::new();
        transport.push_json(401, json!({"detail": "Token expired"}));
        transport.push_json(
            200,
            json!({"access": test_token(Role::Usuario, 7), "refresh": "refresh-novo"}),
        );
        transport.push_json(401, json!({"detail": "Still unauthorized"}));
        let session = authenticated_session("second-401", transport.clone());

        let err = session
            .dispatch(ApiRequest::get("/orders"))
            .await
            .expect_err("segundo 401 não gera novo ciclo");
        match err {
            AppError::RequestFailed { status, .. } => assert_eq!(status, Some(401)),
            other => panic!("esperava RequestFailed, veio {other:?}"),
        }
        assert_eq!(transport.seen().len(), 3);
        // a sessão continua de pé: quem expirou foi a autorização do recurso
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn timeout_during_refresh_is_request_failed_not_auth_expired() {
        let transport = MockTransport::new();
        transport.push_json(401, json!({"detail": "Token expired"}));
        transport.push_timeout();
        let session = authenticated_session("refresh-timeout", transport.clone());

        let err = session
            .dispatch(ApiRequest::get("/orders"))
            .await
            .expect_err("timeout não derruba a sessão");
        assert!(matches!(err, AppError::RequestFailed { .. }));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn non_auth_error_passes_through_with_server_detail() {
        let transport = MockTransport::new();
        transport.push_json(400, json!({"detail": "Insufficient stock"}));
        let session = authenticated_session("bad-request", transport.clone());

        let err = session
            .dispatch(ApiRequest::get("/orders"))
            .await
            .expect_err("400 não é tratado como expiração");
        match err {
            AppError::RequestFailed { status, message } => {
                assert_eq!(status, Some(400));
                assert_eq!(message, "Insufficient stock");
            }
            other => panic!("esperava RequestFailed, veio {other:?}"),
        }
        assert_eq!(transport.seen().len(), 1);
    }

    #[tokio::test]
    async fn login_stores_pair_and_exposes_role() {
        let transport = MockTransport::new();
        transport.push_json(
            200,
            json!({"access": test_token(Role::Adm, 1), "refresh": "r1"}),
        );
        let store = temp_store("login");
        let session = SessionManager::new(transport.clone(), store);

        session.login("adm@cns.org", "segredo").await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.role(), Some(Role::Adm));
        assert_eq!(session.current_user_id(), Some(1));
    }

    #[tokio::test]
    async fn login_with_bad_credentials_is_request_failed() {
        let transport = MockTransport::new();
        transport.push_json(401, json!({"detail": "Invalid credentials"}));
        let session = SessionManager::new(transport.clone(), temp_store("login-fail"));

        let err = session
            .login("adm@cns.org", "errada")
            .await
            .expect_err("credencial errada não é sessão expirada");
        match err {
            AppError::RequestFailed { status, message } => {
                assert_eq!(status, Some(401));
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("esperava RequestFailed, veio {other:?}"),
        }
        assert!(!session.is_authenticated());
    }

    #[test]
    fn decode_claims_ignores_signature_and_expiry() {
        use crate::api::mock::test_token_exp;

        // token vencido há muito tempo: as claims continuam legíveis
        let token = test_token_exp(Role::Usuario, 42, 1_000);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.role, Some(Role::Usuario));
        assert_eq!(claims.user_id, Some(42));
        assert_eq!(claims.sub, "42");
    }
}
