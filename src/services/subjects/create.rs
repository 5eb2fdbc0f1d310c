use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{SubjectService, validate_subject_name};
use crate::models::{ApiResponse, ErrorCode, subjects::requests::CreateSubjectRequest};
use crate::services::error_response;
use crate::utils::validate::validate_subject_code;

pub async fn create_subject(
    service: &SubjectService,
    mut subject: CreateSubjectRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    subject.code = subject.code.trim().to_uppercase();
    subject.name = subject.name.trim().to_string();

    if let Err(msg) = validate_subject_code(&subject.code).and(validate_subject_name(&subject.name))
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::SubjectInvalid, msg)));
    }

    let storage = service.get_storage(request)?;

    match storage.get_subject_by_code(&subject.code).await {
        Ok(None) => {}
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::SubjectAlreadyExists,
                format!("Subject code {} already exists", subject.code),
            )));
        }
        Err(e) => return Ok(error_response(&e, "Failed to create subject")),
    }

    match storage.create_subject(subject).await {
        Ok(subject) => {
            info!("Created subject {} ({})", subject.code, subject.id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(subject, "Subject created successfully")))
        }
        Err(e) => Ok(error_response(&e, "Failed to create subject")),
    }
}
