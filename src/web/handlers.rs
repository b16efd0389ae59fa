//! Web 路由处理函数
//!
//! OPTIONS 请求直接返回 CORS 预检响应；其余任意方法触发一次探测

use super::WebAppState;
use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, info, warn};

/// 附加在所有响应上的 CORS 头
const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "authorization, x-client-info, apikey, content-type",
    ),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
];

/// 目标可达时的响应体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReachableResponse {
    pub success: bool,
    /// 上游HTTP状态码
    pub status: u16,
    pub status_text: String,
    /// 响应耗时（毫秒）
    pub response_time: u64,
    pub timestamp: String,
    pub url: String,
    /// 上游响应体，能解析为 JSON 时为 JSON，否则为原始文本
    pub response: serde_json::Value,
}

/// 探测失败或内部错误时的响应体
#[derive(Debug, Serialize)]
pub struct FailureResponse {
    pub success: bool,
    pub error: String,
    pub timestamp: String,
    pub url: String,
}

/// 保活端点处理函数，挂在所有路径上
pub async fn keepalive(State(app_state): State<WebAppState>, method: Method) -> Response {
    if method == Method::OPTIONS {
        return (StatusCode::OK, CORS_HEADERS).into_response();
    }

    let url = app_state.pinger.health_url(&app_state.target_url);
    let timestamp = chrono::Utc::now().to_rfc3339();

    info!("收到保活请求 ({}), 探测目标: {}", method, url);

    match app_state
        .pinger
        .probe(&app_state.target_url, app_state.timeout)
        .await
    {
        Ok(probe) => {
            info!(
                "✓ 目标可达: {} - HTTP {} ({}ms)",
                probe.url,
                probe.status_code,
                probe.latency.as_millis()
            );

            let body = ReachableResponse {
                success: true,
                status: probe.status_code,
                status_text: probe.status_text,
                response_time: probe.latency.as_millis() as u64,
                timestamp,
                url: probe.url,
                response: parse_upstream_body(probe.body),
            };
            json_response(StatusCode::OK, &body, &url)
        }
        Err(e) => {
            // 上游不可达仍返回 200，由 success 字段表达结果
            warn!("✗ 目标不可达: {} - {}", url, e);

            let body = FailureResponse {
                success: false,
                error: e.to_string(),
                timestamp,
                url: url.clone(),
            };
            json_response(StatusCode::OK, &body, &url)
        }
    }
}

/// 上游响应体：优先按 JSON 解析
fn parse_upstream_body(body: String) -> serde_json::Value {
    serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body))
}

/// 序列化 JSON 响应，序列化失败时走 500 分支
fn json_response<T: Serialize>(status: StatusCode, body: &T, url: &str) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            CORS_HEADERS,
            [(header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("响应序列化失败: {}", e);
            internal_error(url, &e.to_string())
        }
    }
}

/// 内部错误响应（HTTP 500）
pub fn internal_error(url: &str, message: &str) -> Response {
    let body = serde_json::json!({
        "success": false,
        "error": message,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "url": url,
    });

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        CORS_HEADERS,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}
