use actix_web::{web, HttpResponse};

use crate::error::AppResult;
use crate::models::{split_tags, ParseResponse, ProblemKey, ProblemPath, ProblemQuery};
use crate::services::fetch::{fetch_and_parse, StatementSource};
use crate::services::parser::StatementParser;

/// Fetches a problem from the source and returns its parsed statement.
/// A blocked source surfaces as 503 with `retryable: true`.
pub async fn get_problem(
    path: web::Path<ProblemPath>,
    query: web::Query<ProblemQuery>,
    source: web::Data<dyn StatementSource>,
    parser: web::Data<StatementParser>,
) -> AppResult<HttpResponse> {
    let ProblemPath { contest_id, index } = path.into_inner();
    let tags = query.tags.as_deref().map(split_tags).unwrap_or_default();
    let key = ProblemKey::new(contest_id, index);

    let outcome = fetch_and_parse(source.get_ref(), parser.get_ref(), key.clone(), tags)
        .await
        .map_err(|e| {
            log::warn!("Failed to get problem {}: {}", key, e);
            e
        })?;

    Ok(HttpResponse::Ok().json(ParseResponse {
        statement: outcome.statement,
        diagnostics: outcome.diagnostics,
    }))
}
