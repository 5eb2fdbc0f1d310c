use actix_web::cookie::{Cookie, SameSite};
use chrono::TimeDelta;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, JwtConfig};
use crate::errors::{Result, SiakadError};
use crate::models::users::entities::UserRole;

pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,           // 用户ID
    pub role: String,          // 用户角色
    pub token_type: TokenType, // access 或 refresh
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse::<i64>()
            .map_err(|_| SiakadError::authentication("Invalid user ID in token"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// 签发与校验令牌所需的密钥和有效期
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: TimeDelta,
    refresh_ttl: TimeDelta,
}

impl JwtKeys {
    pub fn new(secret: &str, access_ttl: TimeDelta, refresh_ttl: TimeDelta) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(
            &config.secret,
            TimeDelta::minutes(config.access_token_expiry),
            TimeDelta::days(config.refresh_token_expiry),
        )
    }

    pub fn issue(
        &self,
        user_id: i64,
        role: &UserRole,
        token_type: TokenType,
        ttl: TimeDelta,
    ) -> Result<String> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            token_type,
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| SiakadError::authentication(format!("Failed to sign token: {e}")))
    }

    // refresh_ttl 为 None 时使用默认有效期
    pub fn token_pair(
        &self,
        user_id: i64,
        role: &UserRole,
        refresh_ttl: Option<TimeDelta>,
    ) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue(user_id, role, TokenType::Access, self.access_ttl)?,
            refresh_token: self.issue(
                user_id,
                role,
                TokenType::Refresh,
                refresh_ttl.unwrap_or(self.refresh_ttl),
            )?,
        })
    }

    /// 校验签名、有效期以及令牌类型
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims> {
        let claims = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| SiakadError::authentication(format!("Invalid token: {e}")))?;

        if claims.token_type != expected {
            return Err(SiakadError::authentication("Unexpected token type"));
        }
        Ok(claims)
    }

    // 用 refresh token 换取新的 access token
    pub fn refresh_access_token(&self, refresh_token: &str) -> Result<String> {
        let claims = self.verify(refresh_token, TokenType::Refresh)?;
        let role = claims
            .role
            .parse::<UserRole>()
            .map_err(SiakadError::authentication)?;
        self.issue(claims.user_id()?, &role, TokenType::Access, self.access_ttl)
    }
}

/// 使用全局配置的便捷入口
pub struct JwtUtils;

impl JwtUtils {
    fn keys() -> JwtKeys {
        JwtKeys::from_config(&AppConfig::get().jwt)
    }

    pub fn generate_token_pair(
        user_id: i64,
        role: &UserRole,
        refresh_token_expiry: Option<TimeDelta>,
    ) -> Result<TokenPair> {
        Self::keys().token_pair(user_id, role, refresh_token_expiry)
    }

    pub fn verify_access_token(token: &str) -> Result<Claims> {
        Self::keys().verify(token, TokenType::Access)
    }

    pub fn refresh_access_token(refresh_token: &str) -> Result<String> {
        Self::keys().refresh_access_token(refresh_token)
    }

    /// 创建 Refresh Token Cookie
    pub fn create_refresh_token_cookie(
        refresh_token: &str,
        max_age: Option<TimeDelta>,
    ) -> Cookie<'static> {
        let config = AppConfig::get();
        let max_age = max_age
            .unwrap_or_else(|| TimeDelta::days(config.jwt.refresh_token_expiry))
            .num_seconds();

        Cookie::build(REFRESH_TOKEN_COOKIE, refresh_token.to_string())
            .path("/")
            .max_age(actix_web::cookie::time::Duration::seconds(max_age))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(config.is_production()) // 生产环境下使用 HTTPS
            .finish()
    }

    pub fn extract_refresh_token_from_cookie(req: &actix_web::HttpRequest) -> Option<String> {
        req.cookie(REFRESH_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
    }
}
