use axum::{
	Json, Router,
	extract::{Query, State},
	http::{HeaderMap, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use scout_service::{Error, RebuildReport, SuggestionsResponse};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/components/suggestions", get(suggestions))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new().route("/v1/admin/rebuild_index", post(rebuild_index)).with_state(state)
}

#[derive(Debug, Deserialize)]
struct SuggestionsParams {
	/// Substring of the component key or name.
	s: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidQuery { message } => json_error(
				StatusCode::BAD_REQUEST,
				"invalid_request",
				message,
				Some(vec!["$.s".to_string()]),
			),
			Error::Consistency(fault) => json_error(
				StatusCode::INTERNAL_SERVER_ERROR,
				"index_store_inconsistent",
				fault.to_string(),
				None,
			),
			Error::Storage { message } => {
				tracing::error!(error = %message, "Storage failure.");

				json_error(
					StatusCode::SERVICE_UNAVAILABLE,
					"storage_unavailable",
					"Storage is unavailable.",
					None,
				)
			},
			Error::Index { message } => {
				tracing::error!(error = %message, "Index failure.");

				json_error(
					StatusCode::SERVICE_UNAVAILABLE,
					"index_unavailable",
					"Component index is unavailable.",
					None,
				)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn suggestions(
	State(state): State<AppState>,
	Query(params): Query<SuggestionsParams>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
	let Some(query) = params.s else {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"The 's' parameter is missing.",
			Some(vec!["$.s".to_string()]),
		));
	};
	let response = state.service.suggestions(&query).await?;

	Ok(Json(response))
}

async fn rebuild_index(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<RebuildReport>, ApiError> {
	authorize_admin(&state, &headers)?;

	let report = state.service.rebuild_index().await?;

	Ok(Json(report))
}

fn authorize_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
	let Some(expected) = state.service.cfg.security.admin_auth_token.as_deref() else {
		return Ok(());
	};
	let provided = headers
		.get(header::AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.strip_prefix("Bearer "))
		.map(str::trim);

	if provided == Some(expected) {
		return Ok(());
	}

	Err(json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Admin token is required.", None))
}
