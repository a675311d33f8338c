use arbiterid::{ArbiterId, Generator};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    routing::{get, post},
};
use std::sync::Arc;

use super::error::ServiceError;
use super::types::{Envelope, GenerateData, GenerateQuery, GenerateRequest, HealthData, InfoData};
use crate::server::config::ServerConfig;

/// Shared by every request: one generator for this instance's node.
#[derive(Clone, Debug)]
pub struct AppState {
    generator: Arc<Generator>,
    max_batch: usize,
}

impl AppState {
    /// # Errors
    ///
    /// Returns [`arbiterid::Error::InvalidNodeId`] for a node outside `0..=3`.
    pub fn new(config: &ServerConfig) -> arbiterid::Result<Self> {
        let generator = Generator::with_options(config.node_id, config.options)?;
        Ok(Self {
            generator: Arc::new(generator),
            max_batch: config.max_batch,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate", post(generate).fallback(method_not_allowed))
        .route("/health", get(health).fallback(method_not_allowed))
        .route("/info", get(info).fallback(method_not_allowed))
        .route("/", get(info).fallback(method_not_allowed))
        .fallback(not_found)
        .with_state(state)
}

/// `POST /generate`
///
/// Reads `id_type` and `count` from a JSON body, falling back to the `type`
/// and `count` query parameters. A body that is not valid JSON is treated as
/// empty. Non-positive counts mean 1.
async fn generate(
    State(state): State<AppState>,
    Query(query): Query<GenerateQuery>,
    body: Bytes,
) -> Result<Json<Envelope<GenerateData>>, ServiceError> {
    let request: GenerateRequest = serde_json::from_slice(&body).unwrap_or_default();

    let id_type = request.id_type.or_else(|| query.id_type()).unwrap_or(0);
    let count = request
        .count
        .filter(|count| *count > 0)
        .or_else(|| query.count().filter(|count| *count > 0))
        .unwrap_or(1);

    let count = usize::try_from(count)
        .ok()
        .filter(|count| *count <= state.max_batch)
        .ok_or(ServiceError::BatchTooLarge {
            count,
            max: state.max_batch,
        })?;
    let category = u16::try_from(id_type)
        .ok()
        .filter(|category| *category <= ArbiterId::MAX_CATEGORY)
        .ok_or(ServiceError::InvalidIdType {
            id_type,
            max: ArbiterId::MAX_CATEGORY,
        })?;

    // Generation may sleep while a millisecond's sequence is exhausted.
    let generator = Arc::clone(&state.generator);
    let ids = tokio::task::spawn_blocking(move || {
        (0..count)
            .map(|_| generator.generate(category))
            .collect::<arbiterid::Result<Vec<_>>>()
    })
    .await??;

    tracing::debug!(count, category, "generated ids");
    Ok(Json(Envelope::ok(GenerateData::from(ids))))
}

/// `GET /health`
///
/// Generates a probe id in the category of the last id, so the probe never
/// trips strict ordering on a generator serving several types.
async fn health(State(state): State<AppState>) -> Result<Json<Envelope<HealthData>>, ServiceError> {
    let generator = Arc::clone(&state.generator);
    let probe = tokio::task::spawn_blocking(move || {
        let category = generator.last_id().category();
        generator.generate(category)
    })
    .await??;

    Ok(Json(Envelope::ok(HealthData {
        status: "healthy",
        timestamp: probe.to_iso8601(),
        node_id: probe.node(),
        last_id: state.generator.last_id(),
    })))
}

/// `GET /info` and `GET /`
async fn info(State(state): State<AppState>) -> Json<Envelope<InfoData>> {
    Json(Envelope::ok(InfoData::new(state.generator.node())))
}

async fn not_found() -> ServiceError {
    ServiceError::NotFound
}

async fn method_not_allowed() -> ServiceError {
    ServiceError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::config::LogFormat;
    use arbiterid::{Base58, GeneratorOptions, IdCodec};
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app(node_id: u8, strict: bool) -> Router {
        let config = ServerConfig {
            node_id,
            server_addr: "127.0.0.1:0".parse().unwrap(),
            max_batch: 100,
            options: GeneratorOptions::default()
                .with_strict_monotonicity(strict)
                .with_quiet(true),
            log_format: LogFormat::Pretty,
        };
        router(AppState::new(&config).unwrap())
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = body.map_or_else(Body::empty, |json| Body::from(json.to_string()));
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn raw(data: &Value) -> u64 {
        data["id_int64"].as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn generate_single_id() {
        let app = app(2, true);
        let (status, body) = send(&app, Method::POST, "/generate", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert!(body.get("error").is_none());

        let data = &body["data"];
        let id = ArbiterId::from_raw(raw(data));
        assert_eq!(data["type"], json!(0));
        assert_eq!(data["node"], json!(2));
        assert_eq!(data["sequence"], json!(id.sequence()));
        assert_eq!(Base58::decode(data["id"].as_str().unwrap()), Ok(id));
        assert_eq!(data["id_base64"], json!(id.to_base64()));
        assert_eq!(data["id_hex"], json!(format!("{:x}", id.to_raw())));
        assert_eq!(data["time"], json!(id.to_iso8601()));
    }

    #[tokio::test]
    async fn generate_batch_from_body() {
        let app = app(0, true);
        let (status, body) = send(
            &app,
            Method::POST,
            "/generate",
            Some(json!({"id_type": 5, "count": 3})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);
        assert!(data.iter().all(|d| d["type"] == json!(5)));
        assert!(data.windows(2).all(|w| raw(&w[0]) < raw(&w[1])));
    }

    #[tokio::test]
    async fn generate_falls_back_to_query() {
        let app = app(1, true);
        let (status, body) = send(&app, Method::POST, "/generate?type=7&count=2", None).await;

        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["type"], json!(7));

        // body fields win over the query
        let (_, body) = send(
            &app,
            Method::POST,
            "/generate?type=7&count=2",
            Some(json!({"id_type": 9})),
        )
        .await;
        assert_eq!(body["data"].as_array().unwrap()[0]["type"], json!(9));
    }

    #[tokio::test]
    async fn generate_rejects_invalid_input() {
        let app = app(0, true);

        let too_many = json!({"count": 101});
        let (status, body) = send(&app, Method::POST, "/generate", Some(too_many)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("Count 101 cannot exceed 100"));
        assert!(body.get("data").is_none());

        for id_type in [1024, -1] {
            let bad_type = json!({ "id_type": id_type });
            let (status, body) = send(&app, Method::POST, "/generate", Some(bad_type)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                body["error"],
                json!(format!("ID type {id_type} must be between 0 and 1023"))
            );
        }
    }

    async fn generate_type(app: &Router, id_type: i64) -> (StatusCode, Value) {
        let body = json!({ "id_type": id_type });
        send(app, Method::POST, "/generate", Some(body)).await
    }

    #[tokio::test]
    async fn strict_generator_rejects_lower_type() {
        let strict = app(0, true);
        generate_type(&strict, 5).await;
        let (status, body) = generate_type(&strict, 4).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], json!(false));

        let loose = app(0, false);
        generate_type(&loose, 5).await;
        let (status, _) = generate_type(&loose, 4).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn health_reports_node_and_last_id() {
        let app = app(3, true);
        generate_type(&app, 12).await;

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["status"], json!("healthy"));
        assert_eq!(data["node_id"], json!(3));

        let last_id = ArbiterId::from_raw(data["last_id"].as_str().unwrap().parse().unwrap());
        assert_eq!(last_id.category(), 12);
        assert_eq!(last_id.node(), 3);
    }

    #[tokio::test]
    async fn info_describes_layout() {
        let app = app(1, true);
        for uri in ["/info", "/"] {
            let (status, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::OK);
            let data = &body["data"];
            assert_eq!(data["node_id"], json!(1));
            assert_eq!(data["epoch"], json!("2025-01-01T08:00:00.000Z"));
            assert_eq!(data["bit_layout"]["type"], json!("10 bits (0-1023)"));
            assert_eq!(data["bit_layout"]["node"], json!("2 bits (0-3)"));
        }
    }

    #[tokio::test]
    async fn unknown_routes_and_methods_use_envelope() {
        let app = app(0, true);

        let (status, body) = send(&app, Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("Endpoint not found"));

        let (status, body) = send(&app, Method::GET, "/generate", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["success"], json!(false));

        let (status, _) = send(&app, Method::POST, "/health", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
