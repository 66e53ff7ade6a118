//! Citizen pollution reports.
//!
//! GET  /api/reports[?id=][&status=][&district_id=][&page=][&limit=]
//! GET  /api/reports?action=types
//! POST /api/reports
//! PUT  /api/reports?id=&action=verify|reject   (admin, optional `{reason}`)
//! PUT  /api/reports  `{ids, status, reason}`     (admin, bulk)

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use domain::models::{
    BulkTransitionRequest, CreateReportRequest, PollutionReport, PollutionType, ReportAction,
    ReportListQuery, ReportStatus, TransitionOutcome, TransitionReportRequest,
};
use persistence::repositories::{
    CreateReportOutcome, NewReport, ReferenceRepository, ReportFilter, ReportRepository,
    TransitionOutcome as StoredTransition,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::auth::authenticate;
use crate::extractors::{AdminUser, CurrentUser};
use crate::response::{ApiResponse, Page};

#[derive(Debug, Deserialize)]
pub struct ReportsQuery {
    pub action: Option<String>,
    pub id: Option<i64>,
    pub status: Option<ReportStatus>,
    pub district_id: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ReportsQuery {
    fn list_query(&self) -> ReportListQuery {
        ReportListQuery {
            id: self.id,
            status: self.status,
            district_id: self.district_id,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReportsData {
    Types(Vec<PollutionType>),
    One(PollutionReport),
    List(Page<PollutionReport>),
}

pub async fn get_reports(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReportsQuery>,
) -> Result<ApiResponse<ReportsData>, ApiError> {
    match query.action.as_deref() {
        None => {}
        Some("types") => {
            let types = ReferenceRepository::new(state.pool.clone())
                .list_pollution_types()
                .await?
                .into_iter()
                .map(Into::into)
                .collect();
            return Ok(ApiResponse::ok(ReportsData::Types(types)));
        }
        Some(other) => return Err(ApiError::Validation(format!("Invalid action: {}", other))),
    }

    let user = authenticate(&headers, &state).await?;
    let repo = ReportRepository::new(state.pool.clone());
    let list = query.list_query();

    if let Some(id) = list.id {
        let report: PollutionReport = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))?
            .into();
        if !user.role.is_admin() && report.user_id != user.id {
            return Err(ApiError::Forbidden(
                "You can only view your own reports".to_string(),
            ));
        }
        return Ok(ApiResponse::ok(ReportsData::One(report)));
    }

    let (limit, offset) = list.page_bounds();
    let filter = ReportFilter {
        user_id: (!user.role.is_admin()).then_some(user.id),
        status: list.status,
        district_id: list.district_id,
        limit,
        offset,
    };
    let (reports, total) = repo.list(&filter).await?;
    let items = reports.into_iter().map(Into::into).collect();

    Ok(ApiResponse::ok(ReportsData::List(Page::new(
        items, total, limit, offset,
    ))))
}

pub async fn create_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateReportRequest>,
) -> Result<ApiResponse<PollutionReport>, ApiError> {
    let request = request.normalized();
    request.validate()?;

    let reference = ReferenceRepository::new(state.pool.clone());
    let district = reference
        .find_district_by_name(&request.district)
        .await?
        .ok_or_else(|| ApiError::Validation(format!("Unknown district: {}", request.district)))?;
    let pollution_type: PollutionType = reference
        .find_pollution_type(&request.pollution_type)
        .await?
        .ok_or_else(|| {
            ApiError::Validation(format!("Unknown pollution type: {}", request.pollution_type))
        })?
        .into();
    if pollution_type.is_other() && request.custom_type.is_none() {
        return Err(ApiError::Validation(
            "Custom type is required when pollution type is other".to_string(),
        ));
    }

    let new_report = NewReport {
        user_id: user.id,
        district_id: district.id,
        pollution_type_id: pollution_type.id,
        address: &request.address,
        custom_type: request.custom_type.as_deref(),
        description: &request.description,
        media_url: request.media_url.as_deref(),
        latitude: request.latitude,
        longitude: request.longitude,
    };

    let outcome = ReportRepository::new(state.pool.clone())
        .create(&new_report, state.config.reports.duplicate_window_secs)
        .await?;

    match outcome {
        CreateReportOutcome::Created(report) => {
            tracing::info!(
                report_id = report.id,
                user_id = user.id,
                district_id = district.id,
                pollution_type = %pollution_type.code,
                "Report created"
            );
            Ok(ApiResponse::created(report.into()))
        }
        CreateReportOutcome::Duplicate { existing_id } => {
            tracing::info!(user_id = user.id, existing_id, "Duplicate report rejected");
            Err(ApiError::Conflict(format!(
                "Duplicate report: identical report #{} was just submitted",
                existing_id
            )))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub id: Option<i64>,
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReviewResult {
    Single(PollutionReport),
    Bulk(TransitionOutcome),
}

pub async fn update_reports(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(query): Query<ReviewQuery>,
    body: Bytes,
) -> Result<ApiResponse<ReviewResult>, ApiError> {
    let repo = ReportRepository::new(state.pool.clone());
    let enforce = state.config.reports.enforce_transitions;

    if let Some(id) = query.id {
        let action = query
            .action
            .as_deref()
            .ok_or_else(|| ApiError::Validation("action is required".to_string()))
            .and_then(|a| ReportAction::from_str(a).map_err(ApiError::Validation))?;
        let request: TransitionReportRequest = if body.iter().all(u8::is_ascii_whitespace) {
            TransitionReportRequest::default()
        } else {
            serde_json::from_slice(&body)
                .map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))?
        };
        request.validate()?;

        let status = action.target_status();
        let outcome = repo
            .transition(id, admin.id, status, request.reason.as_deref(), enforce)
            .await?;

        return match outcome {
            StoredTransition::Updated(report) => {
                tracing::info!(report_id = id, admin_id = admin.id, status = %status, "Report reviewed");
                Ok(ApiResponse::ok(ReviewResult::Single(report.into())))
            }
            StoredTransition::NotFound => Err(ApiError::NotFound("Report not found".to_string())),
            StoredTransition::NotPending(current) => Err(ApiError::Conflict(format!(
                "Report is already {}",
                current
            ))),
        };
    }

    let request: BulkTransitionRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))?;
    request.validate()?;
    let ids = request.validated_ids().map_err(ApiError::Validation)?;

    let updated = repo
        .bulk_transition(&ids, admin.id, request.status, request.reason.as_deref(), enforce)
        .await?;

    tracing::info!(
        admin_id = admin.id,
        requested = ids.len(),
        updated,
        status = %request.status,
        "Reports reviewed in bulk"
    );
    Ok(ApiResponse::ok(ReviewResult::Bulk(TransitionOutcome {
        updated,
        status: request.status,
    })))
}
