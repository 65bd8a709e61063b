use pretty_assertions::assert_eq;
use product_image_studio::{
    ai::{ImageGenService, MockImageGenClient, OpenRouterHttpClient, OpenRouterImageClient},
    db::{Database, UserRepository},
    models::UserRole,
    pipeline::{Pipeline, PipelineServices},
    server,
    storage::{MockObjectStore, ObjectStore},
    Error,
};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestServer {
    base_url: String,
    http: reqwest::Client,
}

impl TestServer {
    async fn start(image_gen: Arc<dyn ImageGenService>, store: Arc<dyn ObjectStore>) -> Self {
        let db = Database::connect_in_memory().await.unwrap();
        db.upsert_user("u1", "Una", "una@example.com", UserRole::User)
            .await
            .unwrap();
        db.upsert_user("admin", "Ada", "ada@example.com", UserRole::Admin)
            .await
            .unwrap();

        let pipeline =
            Pipeline::with_services(PipelineServices::with_database(image_gen, store, db));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(server::serve(listener, Arc::new(pipeline)));

        Self {
            base_url: format!("http://{}", addr),
            http: reqwest::Client::new(),
        }
    }

    async fn with_mocks(image_gen: MockImageGenClient) -> Self {
        Self::start(Arc::new(image_gen), Arc::new(MockObjectStore::new())).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, user: Option<&str>, body: Value) -> (u16, Value) {
        let mut request = self.http.post(self.url(path)).json(&body);
        if let Some(user) = user {
            request = request.header(server::USER_ID_HEADER, user);
        }
        let response = request.send().await.unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }

    async fn get(&self, path: &str, user: Option<&str>) -> (u16, Value) {
        let mut request = self.http.get(self.url(path));
        if let Some(user) = user {
            request = request.header(server::USER_ID_HEADER, user);
        }
        let response = request.send().await.unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::with_mocks(MockImageGenClient::new()).await;
    let (status, body) = server.get("/health", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_generate_then_history() {
    let server = TestServer::with_mocks(
        MockImageGenClient::new().with_image_url("https://img.test/sneaker.png"),
    )
    .await;

    let (status, body) = server
        .post(
            "/api/images/generate",
            Some("u1"),
            json!({ "prompt": "white sneaker on marble", "apiKey": "sk-or-1" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["imageUrl"], "https://img.test/sneaker.png");

    let (status, body) = server.get("/api/images/history?limit=5", Some("u1")).await;
    assert_eq!(status, 200);
    let generations = body["generations"].as_array().unwrap();
    assert_eq!(generations.len(), 1);
    assert_eq!(generations[0]["prompt"], "white sneaker on marble");
    assert_eq!(generations[0]["userId"], "u1");
    assert_eq!(generations[0]["status"], "completed");

    let (_, body) = server.get("/api/images/history", Some("admin")).await;
    assert!(body["generations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_identity_is_required() {
    let image_gen = MockImageGenClient::new();
    let server = TestServer::with_mocks(image_gen.clone()).await;

    let body = json!({ "prompt": "shoe", "apiKey": "sk-or-1" });
    let (status, response) = server.post("/api/images/generate", None, body.clone()).await;
    assert_eq!(status, 401);
    assert_eq!(response["success"], false);

    let (status, _) = server.post("/api/images/generate", Some("stranger"), body).await;
    assert_eq!(status, 401);

    assert_eq!(image_gen.get_call_count(), 0);
}

#[tokio::test]
async fn test_validation_errors_name_the_field() {
    let image_gen = MockImageGenClient::new();
    let server = TestServer::with_mocks(image_gen.clone()).await;

    let (status, body) = server
        .post(
            "/api/images/generate",
            Some("u1"),
            json!({ "apiKey": "sk-or-1" }),
        )
        .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("prompt"));

    let (status, body) = server
        .post(
            "/api/images/edit",
            Some("u1"),
            json!({ "imageUrl": "ftp://x/a.png", "editPrompt": "blue", "apiKey": "k" }),
        )
        .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("imageUrl"));

    let (status, _) = server.get("/api/images/edit-history?limit=0", Some("u1")).await;
    assert_eq!(status, 400);

    assert_eq!(image_gen.get_call_count(), 0);
}

#[tokio::test]
async fn test_upstream_failure_maps_to_bad_gateway() {
    let server = TestServer::with_mocks(
        MockImageGenClient::new().with_error(|| {
            Error::Upstream("OpenRouter API error: Insufficient credits".to_string())
        }),
    )
    .await;

    let (status, body) = server
        .post(
            "/api/images/edit",
            Some("u1"),
            json!({
                "imageUrl": "https://img.test/a.png",
                "editPrompt": "white background",
                "apiKey": "sk-or-1"
            }),
        )
        .await;
    assert_eq!(status, 502);
    assert_eq!(body["error"], "OpenRouter API error: Insufficient credits");

    let (_, body) = server.get("/api/images/edit-history", Some("u1")).await;
    assert!(body["edits"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_returns_public_url() {
    let store = MockObjectStore::new().with_base_url("https://store.test".to_string());
    let server =
        TestServer::start(Arc::new(MockImageGenClient::new()), Arc::new(store.clone())).await;

    let (status, body) = server
        .post(
            "/api/images/upload",
            Some("u1"),
            json!({ "fileName": "bag.webp", "fileData": "iVBORw0KGgo=", "mimeType": "image/webp" }),
        )
        .await;
    assert_eq!(status, 200);

    let key = body["fileKey"].as_str().unwrap();
    assert!(key.starts_with("images/u1/"));
    assert!(key.ends_with(".webp"));
    assert_eq!(body["url"], format!("https://store.test/{}", key));
    assert_eq!(store.get_file(key).unwrap().1, "image/webp");
}

#[tokio::test]
async fn test_key_validation() {
    let server =
        TestServer::with_mocks(MockImageGenClient::new().with_valid_key("sk-or-good")).await;

    let (status, body) = server
        .post(
            "/api/keys/validate",
            Some("u1"),
            json!({ "apiKey": "sk-or-good" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["valid"], true);

    let (_, body) = server
        .post(
            "/api/keys/validate",
            Some("u1"),
            json!({ "apiKey": "sk-or-bad" }),
        )
        .await;
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn test_inspiration_admin_lifecycle() {
    let server = TestServer::with_mocks(MockImageGenClient::new()).await;
    let template = json!({
        "title": "Marble flat-lay",
        "prompt": "Product on white marble with soft shadows",
        "imageUrl": "https://img.test/marble.png",
        "category": "beauty",
        "tags": ["marble", "flat-lay"],
        "orderWeight": 5
    });

    let (status, _) = server.post("/api/inspirations", Some("u1"), template.clone()).await;
    assert_eq!(status, 403);

    let (status, body) = server.post("/api/inspirations", Some("admin"), template).await;
    assert_eq!(status, 200);
    let id = body["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("insp_"));

    let (status, body) = server.get("/api/inspirations?category=beauty", None).await;
    assert_eq!(status, 200);
    let listed = body["inspirations"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["orderWeight"], 5);
    assert_eq!(listed[0]["tags"], json!(["marble", "flat-lay"]));

    let (_, body) = server.get("/api/inspirations?category=food", None).await;
    assert!(body["inspirations"].as_array().unwrap().is_empty());

    let response = server
        .http
        .patch(server.url(&format!("/api/inspirations/{}", id)))
        .header(server::USER_ID_HEADER, "admin")
        .json(&json!({ "title": "Marble studio" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["inspiration"]["title"], "Marble studio");
    assert_eq!(body["inspiration"]["category"], "beauty");

    let response = server
        .http
        .delete(server.url(&format!("/api/inspirations/{}", id)))
        .header(server::USER_ID_HEADER, "admin")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let (status, _) = server.get(&format!("/api/inspirations/{}", id), None).await;
    assert_eq!(status, 404);
    let (_, body) = server.get("/api/inspirations", None).await;
    assert!(body["inspirations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_categories_and_unknown_category() {
    let server = TestServer::with_mocks(MockImageGenClient::new()).await;

    let (status, body) = server.get("/api/inspirations/categories", None).await;
    assert_eq!(status, 200);
    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 8);
    assert_eq!(
        categories[0],
        json!({ "key": "fashion", "label": "Fashion" })
    );

    let (status, _) = server.get("/api/inspirations?category=toys", None).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_embedded_image_is_rehosted_end_to_end() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-or-live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "Here is your product shot.",
                    "images": [{
                        "type": "image_url",
                        "image_url": { "url": "data:image/png;base64,iVBORw0KGgo=" }
                    }]
                }
            }]
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let store = MockObjectStore::new().with_base_url("https://store.test".to_string());
    let http = OpenRouterHttpClient::new(reqwest::Client::new()).with_base_url(upstream.uri());
    let image_gen = OpenRouterImageClient::new(http, Arc::new(store.clone()));
    let server = TestServer::start(Arc::new(image_gen), Arc::new(store.clone())).await;

    let (status, body) = server
        .post(
            "/api/images/generate",
            Some("u1"),
            json!({ "prompt": "ceramic mug", "apiKey": "sk-or-live" }),
        )
        .await;
    assert_eq!(status, 200);

    let url = body["imageUrl"].as_str().unwrap();
    assert!(url.starts_with("https://store.test/images/generated/"));
    assert!(url.ends_with(".png"));
    assert_eq!(store.get_keys().len(), 1);

    let (_, body) = server.get("/api/images/history", Some("u1")).await;
    let record = &body["generations"][0];
    assert_eq!(record["imageUrl"], url);
    assert_eq!(record["imageKey"], store.get_keys()[0]);
}
