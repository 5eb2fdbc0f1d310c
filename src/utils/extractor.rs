//! 安全的路径参数提取器
//!
//! 在进入处理程序前校验路径参数，不合法时直接返回 400 的 `ApiResponse`。

use actix_web::{
    Error, FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError,
};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

const MAX_KEY_LEN: usize = 64;

fn bad_path(message: String) -> Error {
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(message, response).into()
}

fn parse_positive_id(raw: Option<&str>, name: &str) -> Result<i64, Error> {
    raw.and_then(|value| value.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| bad_path(format!("Invalid path parameter: {name}")))
}

// 不透明字符串键：非空、不超过 64 字符、不含控制字符
fn parse_opaque_key(raw: Option<&str>, name: &str) -> Result<String, Error> {
    raw.map(str::trim)
        .filter(|key| {
            !key.is_empty()
                && key.chars().count() <= MAX_KEY_LEN
                && !key.chars().any(char::is_control)
        })
        .map(str::to_string)
        .ok_or_else(|| bad_path(format!("Invalid path parameter: {name}")))
}

/// 路径中的 `{id}`，正整数
#[derive(Debug, Clone, Copy)]
pub struct SafeIDI64(pub i64);

impl FromRequest for SafeIDI64 {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse_positive_id(req.match_info().get("id"), "id").map(SafeIDI64))
    }
}

macro_rules! define_safe_key {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub String);

        impl FromRequest for $name {
            type Error = Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                ready(parse_opaque_key(req.match_info().get($param), $param).map($name))
            }
        }
    };
}

define_safe_key!(SafeSubjectId, "id");
define_safe_key!(SafeStudentId, "student_id");
