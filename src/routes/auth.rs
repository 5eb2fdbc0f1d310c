use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::auth::requests::LoginRequest;
use crate::services::AuthService;

static AUTH_SERVICE: Lazy<AuthService> = Lazy::new(AuthService::new_lazy);

pub async fn login(
    req: HttpRequest,
    credentials: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.login(credentials.into_inner(), &req).await
}

pub async fn refresh_token(req: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.refresh_token(&req).await
}

pub async fn verify_token(req: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.verify_token(&req).await
}

pub async fn current_user(req: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.get_user(&req).await
}

// 登录与刷新无需 access token，其余接口经过 RequireJWT
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/auth")
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh_token))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireJWT)
                    .route("/verify-token", web::get().to(verify_token))
                    .route("/me", web::get().to(current_user)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use crate::models::users::entities::UserRole;
    use crate::routes::test_support::{TEST_PASSWORD, test_app, user_with_token};
    use crate::storage::sea_orm_storage::test_support::memory_storage;
    use crate::utils::jwt::REFRESH_TOKEN_COOKIE;
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_login_then_me_and_refresh() {
        let storage = Arc::new(memory_storage().await);
        user_with_token(&storage, "guru_budi", UserRole::Teacher).await;
        let app = test_app!(storage);

        // 邮箱登录，大小写不敏感
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": "Guru_Budi@smkn1.sch.id", "password": TEST_PASSWORD }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let refresh = resp
            .response()
            .cookies()
            .find(|c| c.name() == REFRESH_TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .unwrap();
        let json: Value = test::read_body_json(resp).await;
        let access = json["data"]["access_token"].as_str().unwrap().to_string();
        assert_eq!(json["data"]["user"]["role"], "teacher");
        assert!(json["data"]["user"].get("password_hash").is_none());

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(("Authorization", format!("Bearer {access}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["data"]["user"]["username"], "guru_budi");

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .cookie(actix_web::cookie::Cookie::new(REFRESH_TOKEN_COOKIE, refresh.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // refresh token 不能当作 access token 使用
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/verify-token")
            .insert_header(("Authorization", format!("Bearer {refresh}")))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_login_rejects_wrong_password_and_missing_cookie() {
        let storage = Arc::new(memory_storage().await);
        user_with_token(&storage, "siswa_ani", UserRole::Student).await;
        let app = test_app!(storage);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": "siswa_ani", "password": "Salah12345" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get().uri("/api/v1/auth/me").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
