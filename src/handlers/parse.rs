use actix_web::{web, HttpResponse};

use crate::error::{AppError, AppResult};
use crate::models::{ParseRequest, ParseResponse, ProblemKey};
use crate::services::parser::{ParseInput, StatementParser};

/// Parses markup supplied by the caller. The source is never contacted.
pub async fn parse_markup(
    body: web::Json<ParseRequest>,
    parser: web::Data<StatementParser>,
) -> AppResult<HttpResponse> {
    let request = body.into_inner();
    if request.index.trim().is_empty() {
        return Err(AppError::BadRequest("problem index is empty".to_string()));
    }

    let key = ProblemKey::new(request.contest_id, request.index);
    let input = ParseInput::new(key, request.html)
        .with_tags(request.tags)
        .with_source(request.source.unwrap_or_else(|| "request".to_string()));

    let parser = parser.into_inner();
    let outcome = web::block(move || parser.parse_with_diagnostics(&input))
        .await
        .map_err(|e| AppError::Internal(format!("parse task failed: {}", e)))?;

    log::info!(
        "Parsed {} from request ({} samples)",
        outcome.statement.key,
        outcome.statement.samples.len()
    );
    Ok(HttpResponse::Ok().json(ParseResponse {
        statement: outcome.statement,
        diagnostics: outcome.diagnostics,
    }))
}
