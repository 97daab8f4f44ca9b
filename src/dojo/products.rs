//! Client for the DefectDojo `products` resource.

use crate::dojo::client::{ApiRequest, ApiTransport};
use crate::dojo::models::{ApiResponse, CreationOutcome, LookupResult, NewProduct};
use crate::error::DojoError;
use tracing::info;

const PRODUCTS_PATH: &str = "/api/v2/products/";

/// Creates and looks up products through an [`ApiTransport`].
pub struct ProductClient<T> {
    transport: T,
    base_url: String,
    api_key: String,
}

impl<T: ApiTransport> ProductClient<T> {
    /// Creates a client for the instance at `base_url`. A trailing `/` is ignored.
    pub fn new(transport: T, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn products_url(&self) -> String {
        format!("{}{}", self.base_url, PRODUCTS_PATH)
    }

    /// Sends `POST /api/v2/products/` and returns the response unchecked.
    ///
    /// Not idempotent: each call creates a new product on success.
    pub async fn create(&self, product: &NewProduct) -> Result<ApiResponse, DojoError> {
        let body = serde_json::to_string(product)
            .map_err(|source| DojoError::Parse { context: "product payload", source })?;

        info!("Creating product: {}", product.name);
        self.transport.request(ApiRequest::post(self.products_url(), &self.api_key, body)).await
    }

    /// Looks up products whose name equals `name` exactly.
    pub async fn find_by_exact_name(&self, name: &str) -> Result<LookupResult, DojoError> {
        let url = format!("{}?name_exact={}", self.products_url(), urlencoding::encode(name));

        info!("Looking up product: {}", name);
        let response = self
            .transport
            .request(ApiRequest::get(url, &self.api_key))
            .await?
            .error_for_status()?;

        response.parse("product lookup response")
    }

    /// Creates `product` unless one with the same name already exists.
    ///
    /// This is a lookup followed by a create, not an atomic operation:
    /// two concurrent callers can both see no match and both create.
    pub async fn create_if_not_exists(
        &self,
        product: &NewProduct,
    ) -> Result<CreationOutcome, DojoError> {
        let lookup = self.find_by_exact_name(&product.name).await?;

        if let Some(id) = lookup.first_id()? {
            info!("Product '{}' already exists with id {}", product.name, id);
            return Ok(CreationOutcome::AlreadyExists { id });
        }

        let response = self.create(product).await?.error_for_status()?;
        Ok(CreationOutcome::Created(response.json("create product response")?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dojo::client::Method;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Mock transport that replays canned responses and records requests.
    struct MockTransport {
        responses: Mutex<VecDeque<ApiResponse>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl MockTransport {
        fn new(responses: Vec<ApiResponse>) -> Self {
            Self { responses: Mutex::new(responses.into()), requests: Mutex::new(Vec::new()) }
        }

        fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn count(&self, method: Method) -> usize {
            self.requests().iter().filter(|r| r.method == method).count()
        }
    }

    #[async_trait]
    impl ApiTransport for MockTransport {
        async fn request(&self, request: ApiRequest) -> Result<ApiResponse, DojoError> {
            self.requests.lock().unwrap().push(request);
            Ok(self.responses.lock().unwrap().pop_front().expect("unexpected request"))
        }
    }

    fn client(transport: &MockTransport) -> ProductClient<&MockTransport> {
        ProductClient::new(transport, "https://dd.example.com", "k")
    }

    #[tokio::test]
    async fn test_create_request() {
        let transport = MockTransport::new(vec![ApiResponse::new(201, r#"{"id":5}"#)]);
        let product = NewProduct::new("App A", "d", "1", "a,b");

        let response = client(&transport).create(&product).await.unwrap();
        assert_eq!(response, ApiResponse::new(201, r#"{"id":5}"#));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].url, "https://dd.example.com/api/v2/products/");
        assert_eq!(requests[0].api_key, "k");
        assert_eq!(
            requests[0].body.as_deref(),
            Some(r#"{"name":"App A","prod_type":"1","description":"d","tags":["a","b"]}"#)
        );
    }

    #[tokio::test]
    async fn test_create_returns_error_status_unchanged() {
        let transport = MockTransport::new(vec![ApiResponse::new(400, r#"{"name":["taken"]}"#)]);
        let product = NewProduct::new("App A", "d", "1", "");

        let response = client(&transport).create(&product).await.unwrap();
        assert_eq!(response.status, 400);
        assert_eq!(response.body, r#"{"name":["taken"]}"#);
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash_ignored() {
        let transport = MockTransport::new(vec![ApiResponse::new(201, "{}")]);
        let client = ProductClient::new(&transport, "https://dd.example.com///", "k");

        client.create(&NewProduct::new("A", "d", "1", "")).await.unwrap();
        assert_eq!(transport.requests()[0].url, "https://dd.example.com/api/v2/products/");
    }

    #[tokio::test]
    async fn test_find_by_exact_name_encodes_query() {
        let transport =
            MockTransport::new(vec![ApiResponse::new(200, r#"{"count":0,"results":[]}"#)]);

        let lookup = client(&transport).find_by_exact_name("My Product").await.unwrap();
        assert_eq!(lookup.count, 0);

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(
            requests[0].url,
            "https://dd.example.com/api/v2/products/?name_exact=My%20Product"
        );
        assert!(requests[0].body.is_none());
    }

    #[tokio::test]
    async fn test_find_by_exact_name_encodes_reserved_characters() {
        let transport = MockTransport::new(vec![ApiResponse::new(200, r#"{"count":0}"#)]);

        client(&transport).find_by_exact_name("R&D/api?x=1#2").await.unwrap();
        assert!(transport.requests()[0].url.ends_with("?name_exact=R%26D%2Fapi%3Fx%3D1%232"));
    }

    #[tokio::test]
    async fn test_find_by_exact_name_malformed_json() {
        let transport = MockTransport::new(vec![ApiResponse::new(200, "<html>oops</html>")]);

        let err = client(&transport).find_by_exact_name("A").await.unwrap_err();
        assert!(matches!(err, DojoError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_find_by_exact_name_server_error() {
        let transport = MockTransport::new(vec![ApiResponse::new(403, r#"{"detail":"no"}"#)]);

        let err = client(&transport).find_by_exact_name("A").await.unwrap_err();
        assert!(matches!(err, DojoError::Server { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_create_if_not_exists_existing() {
        let transport =
            MockTransport::new(vec![ApiResponse::new(200, r#"{"count":1,"results":[{"id":42}]}"#)]);
        let product = NewProduct::new("App A", "d", "1", "");

        let outcome = client(&transport).create_if_not_exists(&product).await.unwrap();
        assert_eq!(outcome, CreationOutcome::AlreadyExists { id: 42 });
        assert_eq!(transport.count(Method::Post), 0);
        assert_eq!(transport.count(Method::Get), 1);
    }

    #[tokio::test]
    async fn test_create_if_not_exists_takes_first_result() {
        let transport = MockTransport::new(vec![ApiResponse::new(
            200,
            r#"{"count":2,"results":[{"id":9,"name":"A"},{"id":3,"name":"A"}]}"#,
        )]);

        let outcome = client(&transport)
            .create_if_not_exists(&NewProduct::new("A", "d", "1", ""))
            .await
            .unwrap();
        assert_eq!(outcome, CreationOutcome::AlreadyExists { id: 9 });
    }

    #[tokio::test]
    async fn test_create_if_not_exists_creates() {
        let transport = MockTransport::new(vec![
            ApiResponse::new(200, r#"{"count":0,"results":[]}"#),
            ApiResponse::new(201, r#"{"id":77,"name":"App A"}"#),
        ]);
        let product = NewProduct::new("App A", "d", "1", "web, api");

        let outcome = client(&transport).create_if_not_exists(&product).await.unwrap();
        assert_eq!(outcome, CreationOutcome::Created(json!({"id": 77, "name": "App A"})));

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[1].method, Method::Post);

        let sent: NewProduct = serde_json::from_str(requests[1].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, product);
        assert_eq!(sent.tags, vec!["web", "api"]);
    }

    #[tokio::test]
    async fn test_create_if_not_exists_create_rejected() {
        let transport = MockTransport::new(vec![
            ApiResponse::new(200, r#"{"count":0,"results":[]}"#),
            ApiResponse::new(400, r#"{"prod_type":["Invalid pk"]}"#),
        ]);

        let err = client(&transport)
            .create_if_not_exists(&NewProduct::new("A", "d", "999", ""))
            .await
            .unwrap_err();
        match err {
            DojoError::Server { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("Invalid pk"));
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_if_not_exists_lookup_failure_skips_create() {
        let transport = MockTransport::new(vec![ApiResponse::new(500, "boom")]);

        let result = client(&transport)
            .create_if_not_exists(&NewProduct::new("A", "d", "1", ""))
            .await;
        assert!(result.is_err());
        assert_eq!(transport.count(Method::Post), 0);
    }

    #[tokio::test]
    async fn test_create_if_not_exists_inconsistent_lookup() {
        let transport =
            MockTransport::new(vec![ApiResponse::new(200, r#"{"count":1,"results":[]}"#)]);

        let err = client(&transport)
            .create_if_not_exists(&NewProduct::new("A", "d", "1", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, DojoError::InconsistentLookup { count: 1 }));
        assert_eq!(transport.count(Method::Post), 0);
    }
}
