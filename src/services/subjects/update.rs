use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{SubjectService, validate_subject_name};
use crate::models::{ApiResponse, ErrorCode, subjects::requests::UpdateSubjectRequest};
use crate::services::error_response;
use crate::utils::validate::validate_subject_code;

pub async fn update_subject(
    service: &SubjectService,
    id: &str,
    mut update: UpdateSubjectRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(code) = update.code.as_mut() {
        *code = code.trim().to_uppercase();
        if let Err(msg) = validate_subject_code(code) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::SubjectInvalid, msg)));
        }
    }
    if let Some(name) = update.name.as_mut() {
        *name = name.trim().to_string();
        if let Err(msg) = validate_subject_name(name) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::SubjectInvalid, msg)));
        }
    }

    let storage = service.get_storage(request)?;

    // 新代码不能与其他科目重复
    if let Some(code) = update.code.as_deref() {
        match storage.get_subject_by_code(code).await {
            Ok(Some(other)) if other.id != id => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::SubjectAlreadyExists,
                    format!("Subject code {code} already exists"),
                )));
            }
            Ok(_) => {}
            Err(e) => return Ok(error_response(&e, "Failed to update subject")),
        }
    }

    match storage.update_subject(id, update).await {
        Ok(Some(subject)) => {
            info!("Updated subject {}", subject.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                subject,
                "Subject updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubjectNotFound,
            "Subject not found",
        ))),
        Err(e) => Ok(error_response(&e, "Failed to update subject")),
    }
}
