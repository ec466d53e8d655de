use axum::{
	Json, Router,
	body::Body,
	extract::{
		FromRequestParts, Path, State,
		rejection::{JsonRejection, PathRejection},
	},
	http::{HeaderMap, Request, StatusCode, header::AUTHORIZATION, request::Parts},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use uuid::Uuid;

use buybuddy_service::{AskRequest, AskResponse, Error as ServiceError, HistoryEntry};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	let assistant = Router::new()
		.route("/v1/assistant/ask", post(ask))
		.route(
			"/v1/assistant/conversations/{conversation_id}",
			get(conversation_history).delete(delete_conversation),
		)
		.route_layer(middleware::from_fn_with_state(state.clone(), require_api_token));

	Router::new().route("/health", get(health)).merge(assistant).with_state(state)
}

/// The caller's user id, read from the configured identity header.
#[derive(Debug, Clone, Copy)]
pub struct CallerId(pub Uuid);
impl FromRequestParts<AppState> for CallerId {
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
		let raw = parts
			.headers
			.get(&state.user_header)
			.and_then(|value| value.to_str().ok())
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.ok_or_else(|| {
				json_error(
					StatusCode::UNAUTHORIZED,
					"unauthenticated",
					format!("Missing {} header.", state.user_header.as_str()),
					None,
				)
			})?;
		let user_id = Uuid::parse_str(raw).map_err(|_| {
			json_error(
				StatusCode::UNAUTHORIZED,
				"unauthenticated",
				format!("{} must be a UUID.", state.user_header.as_str()),
				None,
			)
		})?;

		Ok(Self(user_id))
	}
}

#[derive(Debug, Serialize)]
pub struct DeleteConversationResponse {
	pub deleted: u64,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn ask(
	State(state): State<AppState>,
	CallerId(user_id): CallerId,
	payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
	let Json(payload) = payload.map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "invalid_request", err.body_text(), None)
	})?;
	let response = state.service.answer(user_id, payload).await?;

	Ok(Json(response))
}

async fn conversation_history(
	State(state): State<AppState>,
	CallerId(user_id): CallerId,
	conversation_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
	let conversation_id = conversation_path(conversation_id)?;
	let response = state.service.history(user_id, conversation_id).await?;

	Ok(Json(response))
}

async fn delete_conversation(
	State(state): State<AppState>,
	CallerId(user_id): CallerId,
	conversation_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DeleteConversationResponse>, ApiError> {
	let conversation_id = conversation_path(conversation_id)?;
	let deleted = state.service.delete_conversation(user_id, conversation_id).await?;

	Ok(Json(DeleteConversationResponse { deleted }))
}

async fn require_api_token(
	State(state): State<AppState>,
	req: Request<Body>,
	next: Next,
) -> Response {
	if let Some(expected) = state.auth_token.as_deref()
		&& read_bearer_token(req.headers()) != Some(expected)
	{
		return json_error(
			StatusCode::UNAUTHORIZED,
			"unauthenticated",
			"A valid Bearer token is required.",
			None,
		)
		.into_response();
	}

	next.run(req).await
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let raw = headers.get(AUTHORIZATION)?;
	let value = raw.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

fn conversation_path(raw: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
	let Path(conversation_id) = raw.map_err(|_| {
		json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"conversation_id must be a UUID.",
			Some(vec!["conversation_id".to_string()]),
		)
	})?;

	Ok(conversation_id)
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
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message, None),
			ServiceError::Retrieval { message } => {
				tracing::error!(error = %message, "Receipt retrieval failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"retrieval_failed",
					"Failed to read purchase history.",
					None,
				)
			},
			err @ ServiceError::Classification { .. } => {
				tracing::error!(error = %err, "Intent classification failed.");

				json_error(StatusCode::BAD_GATEWAY, "classification_failed", err.to_string(), None)
			},
			err @ ServiceError::Synthesis { .. } => {
				tracing::error!(error = %err, "Answer synthesis failed.");

				json_error(StatusCode::BAD_GATEWAY, "synthesis_failed", err.to_string(), None)
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
