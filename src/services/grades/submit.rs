use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::GradeService;
use crate::errors::SiakadError;
use crate::middlewares::RequireJWT;
use crate::models::grades::requests::GradeBatchRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_status;

pub async fn submit_batch(
    service: &GradeService,
    batch: GradeBatchRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(teacher) = RequireJWT::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };
    let ledger = service.get_ledger(request)?;

    let teacher_id = teacher.id.to_string();
    let items = batch
        .items
        .into_iter()
        .map(|entry| entry.into_submission(&teacher_id))
        .collect::<Vec<_>>();
    let count = items.len();

    match ledger.apply_batch(items).await {
        Ok(result) => {
            info!(
                "Teacher {} submitted {} grade items ({} created, {} modified)",
                teacher.username, count, result.upserted, result.modified
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Grades saved")))
        }
        Err(e) => Ok(batch_error_response(&e)),
    }
}

fn batch_error_response(err: &SiakadError) -> HttpResponse {
    let (status, code) = error_status(err);
    let code = match err {
        SiakadError::Validation(_) => ErrorCode::GradeValidationFailed,
        e if e.is_storage() => ErrorCode::GradeWriteFailed,
        _ => code,
    };

    if status.is_server_error() {
        tracing::error!("Grade batch failed: {}", err);
        return HttpResponse::build(status).json(ApiResponse::error_empty(
            code,
            "Failed to save grades, please retry the batch",
        ));
    }
    HttpResponse::build(status).json(ApiResponse::error_empty(code, err.message()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_batch_errors_map_to_grade_codes() {
        let response = batch_error_response(&SiakadError::validation("items[0]: semester"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = batch_error_response(&SiakadError::empty_batch("empty"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = batch_error_response(&SiakadError::database_operation("1 of 2 failed"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
