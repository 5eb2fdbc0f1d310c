//! 数据模型定义
//!
//! 与 `entity` 中的 SeaORM 实体分离，面向 HTTP 与业务层。

pub mod auth;
pub mod common;
pub mod grades;
pub mod subjects;
pub mod users;

pub use common::{ApiResponse, PaginationInfo, PaginationQuery, clamp_page};

/// API 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    InternalServerError = 1500,

    // 认证
    AuthFailed = 2000,
    UserInactive = 2001,

    // 用户
    UserNotFound = 3000,
    UserAlreadyExists = 3001,
    UserNameInvalid = 3002,
    UserEmailInvalid = 3003,
    UserPasswordInvalid = 3004,
    UserCreationFailed = 3005,

    // 科目
    SubjectNotFound = 4000,
    SubjectAlreadyExists = 4001,
    SubjectInvalid = 4002,

    // 成绩
    GradeBatchEmpty = 5000,
    GradeValidationFailed = 5001,
    GradeWriteFailed = 5002,
    GradeAccessDenied = 5003,
}
