pub mod auth;

pub mod users;

pub mod subjects;

pub mod grades;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::configure_auth_routes;
pub use grades::configure_grade_routes;
pub use subjects::configure_subject_routes;
pub use users::configure_user_routes;

use actix_web::web;

// 注册全部 API 路由
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_user_routes)
        .configure(configure_subject_routes)
        .configure(configure_grade_routes);
}
