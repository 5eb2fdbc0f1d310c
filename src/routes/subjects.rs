use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, guard, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::subjects::requests::{
    CreateSubjectRequest, SubjectListQuery, UpdateSubjectRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::SubjectService;
use crate::utils::SafeSubjectId;

static SUBJECT_SERVICE: Lazy<SubjectService> = Lazy::new(SubjectService::new_lazy);

pub async fn list_subjects(
    req: HttpRequest,
    query: web::Query<SubjectListQuery>,
) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE.list_subjects(query.into_inner(), &req).await
}

pub async fn get_subject(req: HttpRequest, id: SafeSubjectId) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE.get_subject(&id.0, &req).await
}

pub async fn create_subject(
    req: HttpRequest,
    subject: web::Json<CreateSubjectRequest>,
) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE
        .create_subject(subject.into_inner(), &req)
        .await
}

pub async fn update_subject(
    req: HttpRequest,
    id: SafeSubjectId,
    update: web::Json<UpdateSubjectRequest>,
) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE
        .update_subject(&id.0, update.into_inner(), &req)
        .await
}

pub async fn delete_subject(req: HttpRequest, id: SafeSubjectId) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE.delete_subject(&id.0, &req).await
}

// 配置路由：读取对所有登录用户开放，写入仅限管理员
// 写操作的 scope 用方法 guard 区分，GET 请求会落到后面的只读路由
pub fn configure_subject_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/subjects")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .guard(guard::Any(guard::Post()).or(guard::Put()).or(guard::Delete()))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("", web::post().to(create_subject))
                    .route("/{id}", web::put().to(update_subject))
                    .route("/{id}", web::delete().to(delete_subject)),
            )
            .route("", web::get().to(list_subjects))
            .route("/{id}", web::get().to(get_subject)),
    );
}
