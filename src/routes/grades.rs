use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grades::requests::{GradeBatchRequest, GradeListQuery, StudentGradeQuery};
use crate::models::users::entities::UserRole;
use crate::services::GradeService;
use crate::utils::SafeStudentId;

static GRADE_SERVICE: Lazy<GradeService> = Lazy::new(GradeService::new_lazy);

pub async fn submit_batch(
    req: HttpRequest,
    batch: web::Json<GradeBatchRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.submit_batch(batch.into_inner(), &req).await
}

pub async fn list_grades(
    req: HttpRequest,
    query: web::Query<GradeListQuery>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.list_grades(query.into_inner(), &req).await
}

pub async fn list_my_grades(
    req: HttpRequest,
    query: web::Query<StudentGradeQuery>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.list_my_grades(query.into_inner(), &req).await
}

pub async fn list_student_grades(
    req: HttpRequest,
    student_id: SafeStudentId,
    query: web::Query<StudentGradeQuery>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .list_student_grades(&student_id.0, query.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_grade_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grades")
            .wrap(middlewares::RequireJWT)
            .route("/me", web::get().to(list_my_grades))
            .route("/students/{student_id}", web::get().to(list_student_grades))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route("", web::get().to(list_grades))
                    .route("/batch", web::post().to(submit_batch)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{test_app, user_with_token};
    use crate::storage::sea_orm_storage::test_support::memory_storage;
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_batch_then_read_back_with_roles() {
        let storage = Arc::new(memory_storage().await);
        let (_, teacher) = user_with_token(&storage, "guru_budi", UserRole::Teacher).await;
        let (student_id, student) = user_with_token(&storage, "siswa_ani", UserRole::Student).await;
        let app = test_app!(storage);

        let body = json!({
            "items": [{
                "student_id": student_id.to_string(),
                "subject_id": "math",
                "semester": 1,
                "year": 2026,
                "assignments": 80,
                "midterm": "70",
                "final": 90
            }]
        });

        let req = test::TestRequest::post()
            .uri("/api/v1/grades/batch")
            .insert_header(("Authorization", format!("Bearer {teacher}")))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["data"]["upserted"], 1);
        assert_eq!(json["data"]["modified"], 0);

        // 学生不能录入成绩
        let req = test::TestRequest::post()
            .uri("/api/v1/grades/batch")
            .insert_header(("Authorization", format!("Bearer {student}")))
            .set_json(&body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/v1/grades/me")
            .insert_header(("Authorization", format!("Bearer {student}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: Value = test::read_body_json(resp).await;
        let item = &json["data"]["items"][0];
        assert_eq!(item["total"], 80.0);
        assert_eq!(item["grade"], "B");
        assert_eq!(item["subject_name"], "math");

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/grades/students/{}", student_id + 1000))
            .insert_header(("Authorization", format!("Bearer {student}")))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_batch_rejects_bad_input() {
        let storage = Arc::new(memory_storage().await);
        let (_, teacher) = user_with_token(&storage, "guru_sari", UserRole::Teacher).await;
        let app = test_app!(storage);

        for body in [
            json!({ "items": [] }),
            json!({ "items": [{ "student_id": "1", "subject_id": "math", "semester": 3, "year": 2026 }] }),
            json!({ "items": [{ "student_id": "1", "subject_id": "math", "semester": 1, "year": 2026, "teacher_id": "9" }] }),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/v1/grades/batch")
                .insert_header(("Authorization", format!("Bearer {teacher}")))
                .set_json(&body)
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
        }

        let req = test::TestRequest::post()
            .uri("/api/v1/grades/batch")
            .set_json(json!({ "items": [] }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
