//! Question and answer routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::models::question::{Answer, AnswerRequest, Question, QuestionDetail, QuestionRequest};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/questions", post(create_question).get(list_questions))
        .route("/questions/:uuid", get(get_question).delete(delete_question))
        .route("/questions/:uuid/answers", post(answer_question))
        .route("/answers/:uuid", delete(delete_answer))
}

pub async fn create_question(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<QuestionRequest>,
) -> ApiResult<ApiResponse<Question>> {
    let question = state
        .services
        .questions
        .create(&caller, payload)
        .await
        .map_err(|e| e.logged("Failed to create question"))?;

    Ok(ApiResponse::ok("Question created", question))
}

pub async fn list_questions(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Question>>> {
    let questions = state
        .services
        .questions
        .list()
        .await
        .map_err(|e| e.logged("Failed to list questions"))?;

    Ok(ApiResponse::ok("Questions", questions))
}

pub async fn get_question(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<QuestionDetail>> {
    let question = state
        .services
        .questions
        .get(uuid)
        .await
        .map_err(|e| e.logged("Failed to load question"))?;

    Ok(ApiResponse::ok("Question", question))
}

pub async fn delete_question(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .questions
        .delete(&caller, uuid)
        .await
        .map_err(|e| e.logged("Failed to delete question"))?;

    Ok(ApiResponse::message("Question deleted"))
}

pub async fn answer_question(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> ApiResult<ApiResponse<Answer>> {
    let answer = state
        .services
        .questions
        .answer(&caller, uuid, payload)
        .await
        .map_err(|e| e.logged("Failed to answer question"))?;

    Ok(ApiResponse::ok("Answer created", answer))
}

pub async fn delete_answer(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .questions
        .delete_answer(&caller, uuid)
        .await
        .map_err(|e| e.logged("Failed to delete answer"))?;

    Ok(ApiResponse::message("Answer deleted"))
}
