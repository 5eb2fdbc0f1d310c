use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use crate::middlewares::RequireJWT;
use crate::models::grades::{
    requests::{GradeListQuery, StudentGradeQuery},
    responses::StudentGradesResponse,
};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::storage::GradeStore;

/// 学生只能查看自己的成绩，教师与管理员不受限
pub(crate) fn can_view_student(user: &User, student_id: &str) -> bool {
    match user.role {
        UserRole::Admin | UserRole::Teacher => true,
        UserRole::Student => user.student_key() == student_id.trim(),
    }
}

pub async fn list_my_grades(
    service: &GradeService,
    query: StudentGradeQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };
    list_student_grades(service, &user.student_key(), query, request).await
}

pub async fn list_student_grades(
    service: &GradeService,
    student_id: &str,
    query: StudentGradeQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    if !can_view_student(&user, student_id) {
        tracing::info!(
            "User {} denied access to grades of student {}",
            user.id,
            student_id
        );
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::GradeAccessDenied,
            "You can only view your own grades",
        )));
    }

    let ledger = service.get_ledger(request)?;
    match ledger
        .list_for_student(student_id, query.semester, query.year)
        .await
    {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            StudentGradesResponse {
                student_id: student_id.trim().to_string(),
                items,
            },
            "Grades retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, "Failed to retrieve grades")),
    }
}

pub async fn list_grades(
    service: &GradeService,
    query: GradeListQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let ledger = service.get_ledger(request)?;

    match ledger.store().list_grades_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Grade list retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, "Failed to retrieve grade list")),
    }
}
