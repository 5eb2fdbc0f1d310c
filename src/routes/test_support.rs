//! 路由测试共用的账号与应用装配

use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
use crate::storage::sea_orm_storage::SeaOrmStorage;
use crate::utils::{jwt::JwtUtils, password::hash_password};

pub(crate) const TEST_PASSWORD: &str = "Rahasia2026";

/// 创建账号并签发 access token，返回 (用户 id, token)
pub(crate) async fn user_with_token(
    storage: &SeaOrmStorage,
    name: &str,
    role: UserRole,
) -> (i64, String) {
    let user = storage
        .create_user_impl(CreateUserRequest {
            username: name.to_string(),
            email: format!("{name}@smkn1.sch.id"),
            password: hash_password(TEST_PASSWORD).unwrap(),
            role: role.clone(),
            display_name: None,
        })
        .await
        .unwrap();
    let pair = JwtUtils::generate_token_pair(user.id, &role, None).unwrap();
    (user.id, pair.access_token)
}

/// 以给定的 `Arc<SeaOrmStorage>` 装配完整路由表
macro_rules! test_app {
    ($storage:expr) => {{
        let storage: std::sync::Arc<$crate::storage::sea_orm_storage::SeaOrmStorage> =
            $storage.clone();
        let cache: std::sync::Arc<dyn $crate::cache::ObjectCache> = std::sync::Arc::new(
            $crate::cache::MokaCacheWrapper::new(&$crate::config::AppConfig::get().cache),
        );
        let ledger = $crate::ledger::GradeLedger::new(
            storage.clone(),
            storage.clone(),
            $crate::config::MissingScorePolicy::TreatAsZero,
        );
        let dyn_storage: std::sync::Arc<dyn $crate::storage::Storage> = storage;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(dyn_storage))
                .app_data(actix_web::web::Data::new(cache))
                .app_data(actix_web::web::Data::new(ledger))
                .configure($crate::routes::configure_routes),
        )
        .await
    }};
}

pub(crate) use test_app;
