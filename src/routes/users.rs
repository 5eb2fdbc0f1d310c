use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::{CreateUserRequest, UserListParams};
use crate::services::UserService;
use crate::utils::SafeIDI64;

static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);

pub async fn list_users(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.list_users(query.into_inner(), &req).await
}

pub async fn create_user(
    req: HttpRequest,
    account: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.create_user(account.into_inner(), &req).await
}

pub async fn get_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.get_user(user_id.0, &req).await
}

// 教师与学生账号只由管理员开设
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_users))
            .route("", web::post().to(create_user))
            .route("/{id}", web::get().to(get_user)),
    );
}

#[cfg(test)]
mod tests {
    use crate::models::users::entities::UserRole;
    use crate::routes::test_support::{test_app, user_with_token};
    use crate::storage::sea_orm_storage::test_support::memory_storage;
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn new_student(username: &str) -> Value {
        json!({
            "username": username,
            "email": format!("{username}@SMKN1.sch.id"),
            "password": "Belajar2026",
            "role": "student"
        })
    }

    #[actix_web::test]
    async fn test_admin_creates_and_reads_accounts() {
        let storage = Arc::new(memory_storage().await);
        let (_, admin) = user_with_token(&storage, "admin_tu", UserRole::Admin).await;
        let app = test_app!(storage);

        let req = test::TestRequest::post()
            .uri("/api/v1/users")
            .insert_header(("Authorization", format!("Bearer {admin}")))
            .set_json(new_student("siswa_dewi"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json: Value = test::read_body_json(resp).await;
        let id = json["data"]["user"]["id"].as_i64().unwrap();
        assert_eq!(json["data"]["user"]["email"], "siswa_dewi@smkn1.sch.id");

        // 同名账号冲突
        let req = test::TestRequest::post()
            .uri("/api/v1/users")
            .insert_header(("Authorization", format!("Bearer {admin}")))
            .set_json(new_student("siswa_dewi"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/users/{id}"))
            .insert_header(("Authorization", format!("Bearer {admin}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["data"]["user"]["role"], "student");

        let req = test::TestRequest::get()
            .uri("/api/v1/users?role=student&page=9223372036854775807")
            .insert_header(("Authorization", format!("Bearer {admin}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["data"]["pagination"]["total"], 1);
        assert!(json["data"]["items"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_non_admin_cannot_manage_accounts() {
        let storage = Arc::new(memory_storage().await);
        let (_, teacher) = user_with_token(&storage, "guru_sari", UserRole::Teacher).await;
        let app = test_app!(storage);

        let req = test::TestRequest::post()
            .uri("/api/v1/users")
            .insert_header(("Authorization", format!("Bearer {teacher}")))
            .set_json(new_student("siswa_eko"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get().uri("/api/v1/users").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
