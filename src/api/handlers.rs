use crate::models::{ClassifiedRow, Comparison, ComparisonSummary, Counters};
use crate::service::export::{export_file_name, to_csv_bytes};
use crate::service::view::view;
use crate::service::{ComparisonCache, SortSpec, Tolerances};
use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// 共享状态: 结果缓存 + 比对容差
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ComparisonCache>,
    pub tolerances: Tolerances,
}

impl AppState {
    pub fn new(cache_entries: usize, tolerances: Tolerances) -> Self {
        Self {
            cache: Arc::new(ComparisonCache::new(cache_entries)),
            tolerances,
        }
    }

    fn compare(&self, co: &Value, fc: &Value) -> Arc<Comparison> {
        self.cache.get_or_compute(co, fc, &self.tolerances)
    }
}

/// 请求体: CO / FC 解析结果 (上游解析服务返回的 JSON)
#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub co: Value,
    #[serde(default)]
    pub fc: Value,
    #[serde(default)]
    pub only_diffs: bool,
    #[serde(default)]
    pub sort: Option<SortSpec>,
}

/// 导出请求: 默认只导出差异行
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub co: Value,
    #[serde(default)]
    pub fc: Value,
    #[serde(default = "default_only_diffs")]
    pub only_diffs: bool,
    #[serde(default)]
    pub sort: Option<SortSpec>,
}

fn default_only_diffs() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ComparePair {
    #[serde(default)]
    pub co: Value,
    #[serde(default)]
    pub fc: Value,
}

#[derive(Debug, Deserialize)]
pub struct BatchCompareRequest {
    pub pairs: Vec<ComparePair>,
}

/// 响应体
#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub success: bool,
    pub message: String,
    pub counters: Option<Counters>,
    pub summary: Option<ComparisonSummary>,
    pub leftovers: usize,
    pub rows: Vec<ClassifiedRow>,
}

impl CompareResponse {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            counters: None,
            summary: None,
            leftovers: 0,
            rows: Vec::new(),
        }
    }
}

/// 单组比对统计
#[derive(Debug, Clone, Serialize)]
pub struct PairStats {
    pub index: usize,
    pub rows: usize,
    pub diff_rows: usize,
    pub leftovers: usize,
    pub counters: Counters,
}

#[derive(Debug, Serialize)]
pub struct BatchCompareResponse {
    pub success: bool,
    pub message: String,
    pub stats: Option<Vec<PairStats>>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 比对接口: 返回带状态的行、计数与汇总
pub async fn compare(State(state): State<AppState>, Json(req): Json<CompareRequest>) -> Response {
    let result = tokio::task::spawn_blocking(move || {
        let comparison = state.compare(&req.co, &req.fc);
        let rows = view(&comparison.rows, req.only_diffs, req.sort);
        (comparison, rows)
    })
    .await;

    match result {
        Ok((comparison, rows)) => {
            tracing::info!(
                "[API] 比对完成: {} 行 (返回 {}), 差异行 {}",
                comparison.rows.len(),
                rows.len(),
                comparison.diff_rows()
            );
            let response = CompareResponse {
                success: true,
                message: format!("Compared {} rows, {} with differences", comparison.rows.len(), comparison.diff_rows()),
                counters: Some(comparison.counters),
                summary: Some(comparison.summary.clone()),
                leftovers: comparison.leftovers,
                rows,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!("[API] 比对任务失败: {}", e);
            let response = CompareResponse::failure(format!("Error: {}", e));
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

/// 导出接口: CSV 附件
pub async fn export(State(state): State<AppState>, Json(req): Json<ExportRequest>) -> Response {
    let result = tokio::task::spawn_blocking(move || {
        let comparison = state.compare(&req.co, &req.fc);
        let rows = view(&comparison.rows, false, req.sort);
        to_csv_bytes(&rows, req.only_diffs)
    })
    .await;

    let bytes = match result {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            tracing::error!("[API] CSV 导出失败: {}", e);
            let response = CompareResponse::failure(format!("Error: {}", e));
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
        }
        Err(e) => {
            tracing::error!("[API] 导出任务失败: {}", e);
            let response = CompareResponse::failure(format!("Error: {}", e));
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
        }
    };

    let disposition = format!("attachment; filename=\"{}\"", export_file_name(chrono::Utc::now()));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

/// 批量比对接口: 各组并行计算, 每组内部仍是单线程纯计算
pub async fn compare_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchCompareRequest>,
) -> Response {
    let total = req.pairs.len();
    let result = tokio::task::spawn_blocking(move || {
        req.pairs
            .par_iter()
            .enumerate()
            .map(|(index, pair)| {
                let comparison = state.compare(&pair.co, &pair.fc);
                PairStats {
                    index,
                    rows: comparison.rows.len(),
                    diff_rows: comparison.diff_rows(),
                    leftovers: comparison.leftovers,
                    counters: comparison.counters,
                }
            })
            .collect::<Vec<_>>()
    })
    .await;

    match result {
        Ok(stats) => {
            let diff_rows: usize = stats.iter().map(|s| s.diff_rows).sum();
            tracing::info!("[API] 批量比对完成: {} 组, 差异行 {}", total, diff_rows);
            let response = BatchCompareResponse {
                success: true,
                message: format!("Compared {} pairs, {} rows with differences", total, diff_rows),
                stats: Some(stats),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!("[API] 批量比对任务失败: {}", e);
            let response = BatchCompareResponse {
                success: false,
                message: format!("Error: {}", e),
                stats: None,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}
