use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use service::product::{ImageUpload, Product, ProductFilter, ProductForm, ProductOutcome};
use tracing::debug;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::ServerState;

/// Query string of the listing page.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IndexQuery {
    /// Case-insensitive substring of the product name
    pub search: Option<String>,
    /// Status line carried over from the previous mutation
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductIndex {
    pub products: Vec<Product>,
    pub filters: ProductFilter,
    pub status: Option<String>,
}

/// Create/edit form body, either urlencoded or multipart with an `image` file.
#[derive(Debug)]
pub struct ProductSubmission {
    pub form: ProductForm,
    pub image: Option<ImageUpload>,
}

#[async_trait]
impl<S> FromRequest<S> for ProductSubmission
where
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rej| JsonApiError::new(rej.status(), "Bad Request", Some(rej.body_text())))?;
            read_multipart(multipart).await
        } else {
            let Form(form) = Form::<ProductForm>::from_request(req, state)
                .await
                .map_err(|rej| JsonApiError::new(rej.status(), "Bad Request", Some(rej.body_text())))?;
            Ok(Self { form, image: None })
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<ProductSubmission, JsonApiError> {
    let bad = |e: axum::extract::multipart::MultipartError| {
        JsonApiError::new(e.status(), "Bad Request", Some(e.body_text()))
    };
    let mut form = ProductForm::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(bad)?;
                // a file input left empty is sent as a nameless, empty part
                if data.is_empty() && file_name.as_deref().unwrap_or_default().is_empty() {
                    continue;
                }
                image = Some(ImageUpload { file_name, content_type, data });
            }
            "name" => form.name = Some(field.text().await.map_err(bad)?),
            "code" => form.code = Some(field.text().await.map_err(bad)?),
            "variant" => form.variant = Some(field.text().await.map_err(bad)?),
            "manufacturer" => form.manufacturer = Some(field.text().await.map_err(bad)?),
            "stock" => form.stock = Some(field.text().await.map_err(bad)?),
            other => debug!(field = other, "ignoring unknown form field"),
        }
    }
    Ok(ProductSubmission { form, image })
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

/// Listing location carrying a status line.
pub fn status_location(status: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("status", status)
        .finish();
    format!("/products?{query}")
}

/// Browser clients are redirected back to the listing; API clients get the outcome.
fn respond(headers: &HeaderMap, success: StatusCode, outcome: ProductOutcome) -> Response {
    if wants_json(headers) {
        (success, Json(outcome)).into_response()
    } else {
        Redirect::to(&status_location(outcome.status)).into_response()
    }
}

fn parse_id(raw: &str) -> Result<Uuid, JsonApiError> {
    Uuid::parse_str(raw).map_err(|_| JsonApiError::not_found("product not found"))
}

/// List products, optionally filtered by name.
#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    params(IndexQuery),
    responses(
        (status = 200, description = "Products ordered by name", body = crate::openapi::ProductIndexDoc),
        (status = 500, description = "Database failure", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn index(
    State(state): State<ServerState>,
    Query(q): Query<IndexQuery>,
) -> Result<Json<ProductIndex>, JsonApiError> {
    let filters = ProductFilter { search: q.search };
    let products = state.products.list(&filters).await?;
    debug!(count = products.len(), search = ?filters.term(), "products_listed");
    Ok(Json(ProductIndex { products, filters, status: q.status }))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = crate::openapi::ProductDoc),
        (status = 404, description = "Unknown product", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn show(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, JsonApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.products.get(id).await?))
}

/// Create a product. Redirects to the listing unless JSON is requested.
#[utoipa::path(
    post,
    path = "/api/products/create",
    tag = "products",
    request_body(content = crate::openapi::ProductFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Created (Accept: application/json)", body = crate::openapi::ProductOutcomeDoc),
        (status = 303, description = "Redirect to /products?status=..."),
        (status = 422, description = "Invalid fields", body = crate::openapi::ValidationErrorDoc),
        (status = 502, description = "Image storage failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn store(
    State(state): State<ServerState>,
    headers: HeaderMap,
    submission: ProductSubmission,
) -> Result<Response, JsonApiError> {
    let outcome = state.products.create(submission.form, submission.image).await?;
    Ok(respond(&headers, StatusCode::CREATED, outcome))
}

/// Replace a product's fields, and its image when a new one is uploaded.
#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body(content = crate::openapi::ProductFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated (Accept: application/json)", body = crate::openapi::ProductOutcomeDoc),
        (status = 303, description = "Redirect to /products?status=..."),
        (status = 404, description = "Unknown product", body = crate::openapi::ErrorDoc),
        (status = 422, description = "Invalid fields", body = crate::openapi::ValidationErrorDoc),
        (status = 502, description = "Image storage failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    submission: ProductSubmission,
) -> Result<Response, JsonApiError> {
    let id = parse_id(&id)?;
    let outcome = state.products.update(id, submission.form, submission.image).await?;
    Ok(respond(&headers, StatusCode::OK, outcome))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Deleted (Accept: application/json)", body = crate::openapi::ProductOutcomeDoc),
        (status = 303, description = "Redirect to /products?status=..."),
        (status = 404, description = "Unknown product", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn destroy(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, JsonApiError> {
    let id = parse_id(&id)?;
    let outcome = state.products.delete(id).await?;
    Ok(respond(&headers, StatusCode::OK, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{test_app, BASE_URL};
    use axum::body::Body;
    use axum::http::Request;
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "catalog-test-boundary";

    fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
            );
        }
        if let Some((file_name, content_type, data)) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn widget_fields(stock: &str) -> Vec<(&'static str, String)> {
        vec![
            ("name", "Widget".into()),
            ("code", "W1".into()),
            ("variant", "red".into()),
            ("manufacturer", "Acme".into()),
            ("stock", stock.into()),
        ]
    }

    fn multipart_request(method: &str, uri: &str, body: Vec<u8>, json: bool) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
        if json {
            builder = builder.header(header::ACCEPT, "application/json");
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn form_request(method: &str, uri: &str, body: &str, json: bool) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if json {
            builder = builder.header(header::ACCEPT, "application/json");
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, headers, json)
    }

    async fn create_widget(app: &Router, image: Option<(&str, &str, &[u8])>) -> Value {
        let fields = widget_fields("10");
        let refs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let (status, _, body) =
            send(app, multipart_request("POST", "/api/products/create", multipart_body(&refs, image), true)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    #[test]
    fn status_location_is_urlencoded() {
        assert_eq!(status_location("Product created successfully!"), "/products?status=Product+created+successfully%21");
    }

    #[tokio::test]
    async fn store_redirects_with_status_for_browsers() {
        let (app, _dir) = test_app().await;
        let body = "name=Widget&code=W1&variant=red&manufacturer=Acme&stock=10";
        let (status, headers, _) = send(&app, form_request("POST", "/api/products/create", body, false)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/products?status=Product+created+successfully%21");

        let (status, _, listing) = send(&app, Request::get("/products").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listing["products"][0]["name"], "Widget");
        assert_eq!(listing["products"][0]["image_path"], Value::Null);
    }

    #[tokio::test]
    async fn store_returns_outcome_for_json_clients() {
        let (app, dir) = test_app().await;
        let body = create_widget(&app, Some(("w.png", "image/png", &b"\x89PNG-bytes"[..]))).await;
        assert_eq!(body["status"], "Product created successfully!");
        assert_eq!(body["product"]["stock"], 10);

        let url = body["product"]["image_path"].as_str().unwrap();
        assert!(url.starts_with(&format!("{BASE_URL}/product-images/")));
        assert!(url.ends_with(".png"));
        let file = dir.path().join(url.strip_prefix(&format!("{BASE_URL}/")).unwrap());
        assert_eq!(std::fs::read(file).unwrap(), &b"\x89PNG-bytes"[..]);
    }

    #[tokio::test]
    async fn store_rejects_invalid_fields_with_422() {
        let (app, dir) = test_app().await;
        let fields = [("name", ""), ("code", "W1"), ("variant", "red"), ("manufacturer", "Acme"), ("stock", "ten")];
        let req = multipart_request(
            "POST",
            "/api/products/create",
            multipart_body(&fields, Some(("doc.pdf", "application/pdf", &b"%PDF"[..]))),
            false,
        );
        let (status, _, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["name"][0], "The name field is required.");
        assert_eq!(body["errors"]["stock"][0], "The stock field must be an integer.");
        assert_eq!(body["errors"]["image"][0], "The image field must be an image.");
        assert!(body["errors"].get("code").is_none());

        let (_, _, listing) = send(&app, Request::get("/products").body(Body::empty()).unwrap()).await;
        assert_eq!(listing["products"].as_array().unwrap().len(), 0);
        assert!(!dir.path().join("product-images").exists());
    }

    #[tokio::test]
    async fn empty_file_input_counts_as_no_image() {
        let (app, _dir) = test_app().await;
        let fields = widget_fields("3");
        let refs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let req = multipart_request(
            "POST",
            "/api/products/create",
            multipart_body(&refs, Some(("", "application/octet-stream", &b""[..]))),
            true,
        );
        let (status, _, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["product"]["image_path"], Value::Null);
    }

    #[tokio::test]
    async fn index_filters_by_search_and_echoes_status() {
        let (app, _dir) = test_app().await;
        for name in ["Blue Widget", "Gadget", "widget mini"] {
            let body = format!("name={}&code=C&variant=V&manufacturer=M&stock=1", name.replace(' ', "+"));
            let (status, _, _) = send(&app, form_request("POST", "/api/products/create", &body, true)).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, _, listing) =
            send(&app, Request::get("/products?search=WIDGET&status=hello").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = listing["products"].as_array().unwrap().iter().map(|p| p["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Blue Widget", "widget mini"]);
        assert_eq!(listing["filters"]["search"], "WIDGET");
        assert_eq!(listing["status"], "hello");
    }

    #[tokio::test]
    async fn update_replaces_image_and_removes_old_file() {
        let (app, dir) = test_app().await;
        let created = create_widget(&app, Some(("a.png", "image/png", &b"old"[..]))).await;
        let id = created["product"]["id"].as_str().unwrap().to_string();
        let old_url = created["product"]["image_path"].as_str().unwrap().to_string();
        let old_file = dir.path().join(old_url.strip_prefix(&format!("{BASE_URL}/")).unwrap());
        assert!(old_file.exists());

        let fields = widget_fields("5");
        let refs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let req = multipart_request(
            "PATCH",
            &format!("/api/products/{id}"),
            multipart_body(&refs, Some(("b.gif", "image/gif", &b"new"[..]))),
            true,
        );
        let (status, _, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["status"], "Product edited successfully!");
        assert_eq!(body["product"]["stock"], 5);
        let new_url = body["product"]["image_path"].as_str().unwrap();
        assert_ne!(new_url, old_url);
        assert!(new_url.ends_with(".gif"));
        assert!(!old_file.exists());
    }

    #[tokio::test]
    async fn update_without_image_keeps_existing() {
        let (app, _dir) = test_app().await;
        let created = create_widget(&app, Some(("a.png", "image/png", &b"img"[..]))).await;
        let id = created["product"]["id"].as_str().unwrap();

        let body = "name=Widget+2&code=W1&variant=red&manufacturer=Acme&stock=7";
        let (status, headers, _) = send(&app, form_request("PATCH", &format!("/api/products/{id}"), body, false)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/products?status=Product+edited+successfully%21");

        let (_, _, shown) = send(&app, Request::get(format!("/api/products/{id}")).body(Body::empty()).unwrap()).await;
        assert_eq!(shown["name"], "Widget 2");
        assert_eq!(shown["stock"], 7);
        assert_eq!(shown["image_path"], created["product"]["image_path"]);
    }

    #[tokio::test]
    async fn destroy_removes_record_and_image() {
        let (app, dir) = test_app().await;
        let created = create_widget(&app, Some(("a.webp", "image/webp", &b"img"[..]))).await;
        let id = created["product"]["id"].as_str().unwrap();
        let url = created["product"]["image_path"].as_str().unwrap();
        let file = dir.path().join(url.strip_prefix(&format!("{BASE_URL}/")).unwrap());

        let req = Request::delete(format!("/api/products/{id}")).body(Body::empty()).unwrap();
        let (status, headers, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/products?status=Product+deleted+successfully%21");
        assert!(!file.exists());

        let (status, _, body) = send(&app, Request::get(format!("/api/products/{id}")).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let (app, _dir) = test_app().await;
        let missing = Uuid::new_v4();
        for uri in [format!("/api/products/{missing}"), "/api/products/not-a-uuid".to_string()] {
            let (status, _, _) = send(&app, Request::get(&uri).body(Body::empty()).unwrap()).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            let (status, _, _) = send(&app, Request::delete(&uri).body(Body::empty()).unwrap()).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
        let body = "name=A&code=B&variant=C&manufacturer=D&stock=1";
        let (status, _, _) = send(&app, form_request("PATCH", &format!("/api/products/{missing}"), body, true)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stored_images_are_served() {
        let (app, _dir) = test_app().await;
        let created = create_widget(&app, Some(("a.png", "image/png", &b"pixels"[..]))).await;
        let url = created["product"]["image_path"].as_str().unwrap();
        let path = url.strip_prefix("http://localhost").unwrap();

        let resp = app.clone().oneshot(Request::get(path).body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], &b"pixels"[..]);
    }
}
