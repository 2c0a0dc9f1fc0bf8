//! HTTP处理器

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use triage_core::{LifecycleStatus, PatientIntake, PatientRecord, TriageError};
use triage_workflow::{QueueStats, TriageEngine};
use uuid::Uuid;

/// API 错误：引擎错误或请求体解析失败，统一返回 `{error, message, status}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<TriageError> for ApiError {
    fn from(err: TriageError) -> Self {
        let status = match &err {
            TriageError::NotFound(_) => StatusCode::NOT_FOUND,
            TriageError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": true,
            "message": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// JSON 请求体提取器，解析失败时返回 [`ApiError`]
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// 解析路径中的患者标识；标识对外不透明，无法解析时视为不存在
fn patient_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| TriageError::patient_not_found(raw).into())
}

/// API根路径处理器
pub async fn api_root() -> impl IntoResponse {
    Json(json!({
        "service": "Triage Queue API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "queue": "/api/patients/queue",
            "stats": "/api/patients/stats",
            "triage": "/api/patients/triage",
            "busy_doctors": "/api/doctors/busy"
        }
    }))
}

/// 健康检查处理器
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// 所有患者
pub async fn list_patients(State(engine): State<TriageEngine>) -> Json<Vec<PatientRecord>> {
    Json(engine.list_all().await)
}

/// 按优先级排序的候诊队列
pub async fn get_queue(State(engine): State<TriageEngine>) -> Json<Vec<PatientRecord>> {
    Json(engine.queued().await)
}

/// 队列统计
pub async fn get_stats(State(engine): State<TriageEngine>) -> Json<QueueStats> {
    Json(engine.stats().await)
}

/// 分诊录入
pub async fn submit_triage(
    State(engine): State<TriageEngine>,
    ApiJson(intake): ApiJson<PatientIntake>,
) -> Json<Value> {
    let patient = engine.intake(intake).await;

    Json(json!({
        "triageLevel": patient.base_acuity_level,
        "patient": patient,
        "message": "Patient successfully added to triage queue"
    }))
}

/// 单个患者
pub async fn get_patient(
    State(engine): State<TriageEngine>,
    Path(raw): Path<String>,
) -> ApiResult<Json<PatientRecord>> {
    let id = patient_id(&raw)?;
    engine
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| TriageError::patient_not_found(id).into())
}

/// 状态更新请求
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: LifecycleStatus,
}

/// 更新患者状态
pub async fn update_status(
    State(engine): State<TriageEngine>,
    Path(raw): Path<String>,
    ApiJson(request): ApiJson<StatusUpdateRequest>,
) -> ApiResult<Json<PatientRecord>> {
    let id = patient_id(&raw)?;
    Ok(Json(engine.update_status(id, request.status).await?))
}

/// 分配请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[serde(default)]
    pub doctor_id: String,
}

/// 分配医生
pub async fn assign_patient(
    State(engine): State<TriageEngine>,
    Path(raw): Path<String>,
    ApiJson(request): ApiJson<AssignRequest>,
) -> ApiResult<Json<PatientRecord>> {
    let id = patient_id(&raw)?;
    Ok(Json(engine.assign(id, &request.doctor_id).await?))
}

/// 优先级覆盖请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRequest {
    pub triage_level: i64,
    #[serde(default)]
    pub overridden_by: String,
}

/// 覆盖分诊等级
pub async fn override_priority(
    State(engine): State<TriageEngine>,
    Path(raw): Path<String>,
    ApiJson(request): ApiJson<OverrideRequest>,
) -> ApiResult<Json<PatientRecord>> {
    let level = u8::try_from(request.triage_level).map_err(|_| {
        TriageError::InvalidArgument(format!(
            "Acuity level must be between 1 and 5, got {}",
            request.triage_level
        ))
    })?;

    // 参数错误优先于标识不存在
    let id = match Uuid::parse_str(&raw) {
        Ok(id) => id,
        Err(_) => {
            TriageEngine::validate_override(level, &request.overridden_by)?;
            return Err(TriageError::patient_not_found(&raw).into());
        }
    };

    Ok(Json(
        engine
            .override_priority(id, level, &request.overridden_by)
            .await?,
    ))
}

/// 删除患者
pub async fn remove_patient(
    State(engine): State<TriageEngine>,
    Path(raw): Path<String>,
) -> ApiResult<StatusCode> {
    let removed = match Uuid::parse_str(&raw) {
        Ok(id) => engine.remove(id).await,
        Err(_) => false,
    };

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        warn!("Remove requested for unknown patient {}", raw);
        Err(TriageError::patient_not_found(&raw).into())
    }
}

/// 当前忙碌的医生
pub async fn busy_doctors(State(engine): State<TriageEngine>) -> Json<Vec<String>> {
    Json(engine.busy_doctors().await.into_iter().collect())
}
