use std::collections::HashMap;

use axum::extract::Query;
use axum::response::Html;
use axum::Json;

use crate::calculator::{self, CalculationResult};
use crate::core::errors::ApiError;

const WELCOME_HTML: &str =
    "<h2>Welcome to Math API</h2><p>Use /calculate?operation=add&num1=10&num2=5</p>";

pub async fn welcome() -> Html<&'static str> {
    Html(WELCOME_HTML)
}

pub async fn calculate(
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CalculationResult>, ApiError> {
    let request = calculator::parse_request(&params)?;
    let result = calculator::calculate(&request)?;
    tracing::debug!(
        "{} {} {} = {}",
        result.num1,
        result.operation,
        result.num2,
        result.result
    );
    Ok(Json(result))
}
