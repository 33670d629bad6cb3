//! HTTP API for the map client
//!
//! `start_api_server` owns the accept loop; `dispatch` is the synchronous
//! router behind it, so routing can be exercised without a socket.
//!
//! Routes:
//! - GET /health, GET /metrics
//! - GET/POST/PUT /places, DELETE /places?id=
//! - GET/POST /reports
//! - GET /markers
//! - GET /stats
//! - GET /users/{id}/stats

use crate::domain::forms::{PlaceForm, ReportForm};
use crate::domain::records::{Place, RegionFilter, Report};
use crate::domain::types::{MarkerCategory, PlaceId, RampType, ReportStatus};
use crate::infra::config::Config;
use crate::infra::metrics::Metrics;
use crate::io::error::ApiError;
use crate::io::prometheus::format_prometheus_metrics;
use crate::services::gamification::{calculate_level, Action, ContributorTier};
use crate::services::marker::{prioritize, Clock};
use crate::services::stats::RegionStats;
use crate::services::store::PlaceStore;
use crate::services::submission::{edited_place, new_place, new_report};
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Header carrying the signed-in contributor, if any
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Shared state handed to every connection
pub struct AppState {
    site_id: String,
    max_body_bytes: u64,
    report_limit: usize,
    store: Arc<PlaceStore>,
    metrics: Arc<Metrics>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        config: &Config,
        store: Arc<PlaceStore>,
        metrics: Arc<Metrics>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            site_id: config.site_id().to_string(),
            max_body_bytes: config.max_body_bytes(),
            report_limit: config.report_list_limit(),
            store,
            metrics,
            clock,
        }
    }

    pub fn store(&self) -> &PlaceStore {
        &self.store
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// One request as seen by the router
#[derive(Debug, Clone, Copy)]
pub struct ApiRequest<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub user_id: Option<&'a str>,
    pub body: &'a [u8],
}

/// Marker entry of GET /markers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkerView<'a> {
    id: &'a str,
    place_id: &'a str,
    place_name: &'a str,
    latitude: f64,
    longitude: f64,
    status: ReportStatus,
    category: MarkerCategory,
    opacity: f64,
    stack_order: i32,
    halo_order: i32,
    badge_order: i32,
    pulse: bool,
}

/// Body of GET /users/{id}/stats
#[derive(Debug, Serialize)]
struct UserStats {
    count: usize,
    level: &'static str,
    badge: &'static str,
    next_level_count: usize,
    score: i64,
    score_level: u32,
    score_title: &'static str,
    places: Vec<Place>,
}

/// Route a request and record request metrics
pub fn dispatch(state: &AppState, req: ApiRequest<'_>) -> Response<Full<Bytes>> {
    let start = Instant::now();

    let response = if req.body.len() as u64 > state.max_body_bytes {
        Err(ApiError::PayloadTooLarge)
    } else {
        route(state, &req)
    };

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            if e.is_client_error() {
                state.metrics.record_bad_request();
                warn!(method = %req.method, path = %req.path, error = %e, "request_rejected");
            } else {
                error!(method = %req.method, path = %req.path, error = %e, "request_failed");
            }
            e.into_response()
        }
    };

    let latency_us = start.elapsed().as_micros() as u64;
    state.metrics.record_request(latency_us);
    debug!(
        method = %req.method,
        path = %req.path,
        status = %response.status().as_u16(),
        latency_us = %latency_us,
        "request_handled"
    );
    response
}

fn route(state: &AppState, req: &ApiRequest<'_>) -> Result<Response<Full<Bytes>>, ApiError> {
    if *req.method == Method::OPTIONS {
        return Ok(preflight());
    }

    let params = query_params(req.query);

    match (req.method, req.path) {
        (&Method::GET, "/health") => Ok(Response::builder()
            .status(StatusCode::OK)
            .body(Full::new(Bytes::from("ok")))
            .expect("static response should not fail")),
        (&Method::GET, "/metrics") => {
            let body = format_prometheus_metrics(
                &state.metrics,
                state.store.place_count(),
                state.store.report_count(),
                &state.site_id,
            );
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "text/plain; version=0.0.4; charset=utf-8")
                .body(Full::new(Bytes::from(body)))
                .expect("static response should not fail"))
        }
        (&Method::GET, "/places") => {
            let places = state.store.places(&region_filter(&params));
            json_response(StatusCode::OK, &places)
        }
        (&Method::POST, "/places") => create_place(state, req),
        (&Method::PUT, "/places") => update_place(state, req),
        (&Method::DELETE, "/places") => {
            let id = params
                .get("id")
                .filter(|id| !id.is_empty())
                .ok_or_else(|| ApiError::BadRequest("id is required".to_string()))?;
            let id = PlaceId::from(id.as_str());
            state.store.delete_place(&id)?;
            info!(place_id = %id, "place_removed");
            json_response(StatusCode::OK, &serde_json::json!({ "success": true }))
        }
        (&Method::GET, "/reports") => {
            let reports = state.store.reports(&region_filter(&params), state.report_limit);
            json_response(StatusCode::OK, &reports)
        }
        (&Method::POST, "/reports") => create_report(state, req),
        (&Method::GET, "/markers") => {
            let reports = state.store.reports(&region_filter(&params), state.report_limit);
            json_response(StatusCode::OK, &marker_views(&reports, state.clock.now()))
        }
        (&Method::GET, "/stats") => {
            let places = state.store.places(&region_filter(&params));
            json_response(StatusCode::OK, &RegionStats::compute(&places))
        }
        (&Method::GET, path) => match user_stats_id(path) {
            Some(user_id) => json_response(StatusCode::OK, &user_stats(state, &user_id)),
            None => Err(not_found(path)),
        },
        (_, path) => Err(not_found(path)),
    }
}

fn create_place(state: &AppState, req: &ApiRequest<'_>) -> Result<Response<Full<Bytes>>, ApiError> {
    let form: PlaceForm = serde_json::from_slice(req.body)?;
    let place = new_place(form, req.user_id.map(str::to_string), state.clock.now())?;
    state.metrics.record_graded(place.grade, place.ramp == RampType::StairsOnly);

    let place = state.store.insert_place(place)?;
    info!(place_id = %place.id, grade = %place.grade, "place_created");
    json_response(StatusCode::CREATED, &place)
}

fn update_place(state: &AppState, req: &ApiRequest<'_>) -> Result<Response<Full<Bytes>>, ApiError> {
    let form: PlaceForm = serde_json::from_slice(req.body)?;
    let id = form
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(PlaceId::from)
        .ok_or_else(|| ApiError::BadRequest("id is required".to_string()))?;

    let now = state.clock.now();
    let place = state.store.update_place(&id, |existing| edited_place(existing, form, now))?;
    state.metrics.record_graded(place.grade, place.ramp == RampType::StairsOnly);

    info!(place_id = %place.id, grade = %place.grade, "place_edited");
    json_response(StatusCode::OK, &place)
}

fn create_report(state: &AppState, req: &ApiRequest<'_>) -> Result<Response<Full<Bytes>>, ApiError> {
    let form: ReportForm = serde_json::from_slice(req.body)?;
    let report = new_report(form, state.clock.now())?;
    let status = report.status;

    let receipt = state.store.add_report(report, Action::Report)?;
    state.metrics.record_report(status, receipt.points_awarded);
    json_response(StatusCode::CREATED, &receipt)
}

fn marker_views(reports: &[Report], now: chrono::DateTime<chrono::Utc>) -> Vec<MarkerView<'_>> {
    prioritize(reports, now, |r| r.updated_at)
        .into_iter()
        .map(|m| MarkerView {
            id: &m.record.id,
            place_id: &m.record.place_id,
            place_name: &m.record.place_name,
            latitude: m.record.latitude,
            longitude: m.record.longitude,
            status: m.record.status,
            category: m.priority.category,
            opacity: m.priority.opacity,
            stack_order: m.priority.stack_order,
            halo_order: m.priority.halo_order(),
            badge_order: m.priority.badge_order(),
            pulse: m.priority.pulse,
        })
        .collect()
}

fn user_stats(state: &AppState, user_id: &str) -> UserStats {
    let places = state.store.places_by_author(user_id);
    let tier = ContributorTier::from_place_count(places.len());
    let score = state.store.contributor(user_id).map_or(0, |c| c.score);
    let level = calculate_level(score);

    UserStats {
        count: places.len(),
        level: tier.label(),
        badge: tier.badge(),
        next_level_count: tier.next_level_count(),
        score,
        score_level: level.level,
        score_title: level.title,
        places,
    }
}

/// `/users/{id}/stats` -> decoded `{id}`
fn user_stats_id(path: &str) -> Option<String> {
    let id = path.strip_prefix("/users/")?.strip_suffix("/stats")?;
    if id.is_empty() || id.contains('/') {
        return None;
    }
    Some(decode_path_segment(id))
}

fn region_filter(params: &FxHashMap<String, String>) -> RegionFilter {
    RegionFilter::new(
        params.get("district").map(String::as_str),
        params.get("neighborhood").map(String::as_str),
    )
}

fn not_found(path: &str) -> ApiError {
    ApiError::NotFound(format!("no route for {path}"))
}

fn json_response<T: Serialize + ?Sized>(
    status: StatusCode,
    value: &T,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let body = serde_json::to_vec(value).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body)))
        .expect("static response should not fail"))
}

fn preflight() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, X-User-Id")
        .body(Full::new(Bytes::from("")))
        .expect("static response should not fail")
}

/// Parse `a=1&b=two` into a map; later keys win
pub fn query_params(query: Option<&str>) -> FxHashMap<String, String> {
    let mut params = FxHashMap::default();
    let Some(query) = query else {
        return params;
    };
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(percent_decode(key), percent_decode(value));
    }
    params
}

/// Decode a query key or value: `%XX` escapes and `+` as space.
///
/// Malformed escapes pass through unchanged.
pub fn percent_decode(input: &str) -> String {
    decode_escapes(input, true)
}

/// Decode a path segment; `+` stays literal
pub fn decode_path_segment(input: &str) -> String {
    decode_escapes(input, false)
}

fn decode_escapes(input: &str, plus_as_space: bool) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Handle one HTTP request: read the body under the size cap, then dispatch
async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let user_id = parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let limit = usize::try_from(state.max_body_bytes).unwrap_or(usize::MAX);
    let body = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            let err = if e.downcast_ref::<LengthLimitError>().is_some() {
                ApiError::PayloadTooLarge
            } else {
                ApiError::BadRequest(format!("failed to read body: {e}"))
            };
            state.metrics.record_bad_request();
            warn!(path = %parts.uri.path(), error = %err, "request_body_rejected");
            return Ok(err.into_response());
        }
    };

    let response = dispatch(
        &state,
        ApiRequest {
            method: &parts.method,
            path: parts.uri.path(),
            query: parts.uri.query(),
            user_id: user_id.as_deref(),
            body: &body,
        },
    );
    Ok(response)
}

/// Start the API HTTP server
pub async fn start_api_server(
    addr: SocketAddr,
    state: Arc<AppState>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;

    info!(addr = %addr, site = %state.site_id, "api_server_started");

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, _addr)) => {
                        let io = TokioIo::new(stream);
                        let state = state.clone();

                        tokio::spawn(async move {
                            let service = service_fn(move |req| {
                                let state = state.clone();
                                async move { handle_request(req, state).await }
                            });

                            if let Err(e) = http1::Builder::new()
                                .serve_connection(io, service)
                                .await
                            {
                                error!(error = %e, "api_http_error");
                            }
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "api_accept_error");
                    }
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("api_server_shutdown");
                    return Ok(());
                }
            }
        }
    }
}
