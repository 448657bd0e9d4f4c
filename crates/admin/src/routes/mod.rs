//! HTTP route handlers for admin.
//!
//! Every route except `/logout` extracts `RequireAdmin`, so anonymous
//! visitors and non-admin users are redirected to the storefront login.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to dashboard
//! GET  /dashboard              - Revenue, orders, customers, stock
//!
//! # Products
//! GET  /products               - Product listing
//! POST /products               - Create or update (JSON, optional id)
//! GET  /products/{id}          - Product detail
//! POST /products/{id}/delete   - Delete product
//! POST /products/images        - Upload image (multipart, field "file")
//!
//! # Orders
//! GET  /orders                 - Order listing
//! GET  /orders/{id}            - Order detail
//! POST /orders/{id}/status     - Change status (JSON {status})
//!
//! # Auth
//! POST /logout                 - Clear session, back to storefront login
//! ```

pub mod auth;
pub mod dashboard;
pub mod orders;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Largest accepted image upload.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::save))
        .route(
            "/images",
            post(products::upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route("/{id}", get(products::show))
        .route("/{id}/delete", post(products::delete))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/dashboard", get(dashboard::show))
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .route("/logout", post(auth::logout))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use chrono::Utc;
    use ecommers_core::session::SESSION_COOKIE_NAME;
    use ecommers_core::{Email, Role, User, UserId};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::test_support::{test_state, test_state_with_uploads};

    const LOGIN_URL: &str = "http://localhost:3000/login";
    const BOUNDARY: &str = "ecommers-test-boundary";

    async fn send(request: Request<Body>) -> Response {
        crate::app(test_state()).oneshot(request).await.unwrap()
    }

    async fn json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn session_cookie_for(role: Role) -> String {
        let user = User {
            id: UserId::new("a1"),
            name: "Grace".into(),
            email: Email::parse("grace@example.com").unwrap(),
            role,
        };
        let token = test_state().signer().mint(&user, Utc::now()).unwrap();
        format!("{SESSION_COOKIE_NAME}={}", token.value)
    }

    fn admin_post(uri: &str, content_type: &str, body: String) -> Request<Body> {
        Request::post(uri)
            .header(header::COOKIE, session_cookie_for(Role::Admin))
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    fn multipart(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: image/png\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn assert_sent_to_login(response: &Response) {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], LOGIN_URL);
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn test_gate_redirects_anonymous_visitors() {
        for uri in ["/", "/dashboard", "/products", "/orders", "/orders/o1"] {
            let response = send(Request::get(uri).body(Body::empty()).unwrap()).await;
            assert_sent_to_login(&response);
        }
    }

    #[tokio::test]
    async fn test_gate_redirects_customers() {
        let request = Request::post("/orders/o1/status")
            .header(header::COOKIE, session_cookie_for(Role::User))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"status":"Shipped"}"#))
            .unwrap();
        assert_sent_to_login(&send(request).await);

        let request = Request::post("/products")
            .header(header::COOKIE, session_cookie_for(Role::User))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"Lamp"}"#))
            .unwrap();
        assert_sent_to_login(&send(request).await);
    }

    #[tokio::test]
    async fn test_root_redirects_admin_to_dashboard() {
        let request = Request::get("/")
            .header(header::COOKIE, session_cookie_for(Role::Admin))
            .body(Body::empty())
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/dashboard");
    }

    #[tokio::test]
    async fn test_save_product_validates_before_writing() {
        let body = r#"{"name":"ab"}"#.to_owned();
        let response = send(admin_post("/products", "application/json", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json(response).await;
        assert!(body["fields"]["name"].is_string());
        assert!(body["fields"]["description"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_status_is_json_error() {
        let body = r#"{"status":"Lost"}"#.to_owned();
        let response = send(admin_post("/orders/o1/status", "application/json", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "Invalid request body.");
    }

    #[tokio::test]
    async fn test_malformed_product_json_is_json_error() {
        let body = r#"{"name":"Lamp","stock":"many"}"#.to_owned();
        let response = send(admin_post("/products", "application/json", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "Invalid request body.");
    }

    #[tokio::test]
    async fn test_upload_requires_multipart() {
        let body = r#"{"file":"lamp.png"}"#.to_owned();
        let response = send(admin_post("/products/images", "application/json", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "Expected a multipart upload.");
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let content_type = format!("multipart/form-data; boundary={BOUNDARY}");
        let body = multipart(&[("note", None, "hello")]);
        let response = send(admin_post("/products/images", &content_type, body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "No file provided.");
    }

    #[tokio::test]
    async fn test_upload_of_empty_file() {
        let content_type = format!("multipart/form-data; boundary={BOUNDARY}");
        let body = multipart(&[("file", Some("lamp.png"), "")]);
        let response = send(admin_post("/products/images", &content_type, body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "No file provided.");
    }

    #[tokio::test]
    async fn test_upload_stores_file() {
        let uploads = TempDir::new().unwrap();
        let content_type = format!("multipart/form-data; boundary={BOUNDARY}");
        let body = multipart(&[("file", Some("Lamp.PNG"), "not really a png")]);
        let response = crate::app(test_state_with_uploads(uploads.path()))
            .oneshot(admin_post("/products/images", &content_type, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        let url = body["url"].as_str().unwrap();
        let key = url
            .strip_prefix("http://localhost:3000/uploads/")
            .unwrap();
        assert!(key.starts_with("product-images/"));
        assert!(key.ends_with(".png"));
        let stored = std::fs::read(uploads.path().join(key)).unwrap();
        assert_eq!(stored, b"not really a png");
    }

    #[tokio::test]
    async fn test_logout_returns_to_storefront_login() {
        let response = send(Request::post("/logout").body(Body::empty()).unwrap()).await;
        assert_sent_to_login(&response);

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=;")));
    }
}
