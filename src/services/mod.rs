pub mod auth;
pub mod grades;
pub mod subjects;
pub mod users;

pub use auth::AuthService;
pub use grades::GradeService;
pub use subjects::SubjectService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode, web};
use std::sync::Arc;
use tracing::error;

use crate::errors::SiakadError;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

// 从 app_data 取出存储
pub(crate) fn storage_from(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Storage not found in app data"))
}

/// 领域错误对应的 HTTP 状态码与业务错误码
pub(crate) fn error_status(err: &SiakadError) -> (StatusCode, ErrorCode) {
    match err {
        SiakadError::EmptyBatch(_) => (StatusCode::BAD_REQUEST, ErrorCode::GradeBatchEmpty),
        SiakadError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadRequest),
        SiakadError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized),
        SiakadError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
        SiakadError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
        SiakadError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Conflict),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
        ),
    }
}

/// 将领域错误转换为 ApiResponse，服务端错误只返回概要信息
pub(crate) fn error_response(err: &SiakadError, context: &str) -> HttpResponse {
    let (status, code) = error_status(err);
    if status.is_server_error() {
        error!("{}: {}", context, err);
        return HttpResponse::build(status).json(ApiResponse::error_empty(code, context));
    }
    HttpResponse::build(status).json(ApiResponse::error_empty(code, err.message()))
}
