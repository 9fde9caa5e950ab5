use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";
pub const TOKEN_TYPE_MALL: &str = "mall";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id (staff or mall user)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String, // "access" / "refresh" / "mall"
}

impl Claims {
    pub fn user_id(&self) -> AppResult<i64> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))
    }
}

/// 员工访问令牌携带的身份信息
pub struct AccessTokenSubject<'a> {
    pub user_id: i64,
    pub role: Option<&'a str>,
    pub partner: Option<&'a str>,
    pub permissions: &'a [String],
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    refresh_token_expires_in: i64,
    mall_token_expires_in: i64,
}

impl JwtService {
    pub fn new(
        secret: &str,
        access_expires_in: i64,
        refresh_expires_in: i64,
        mall_expires_in: i64,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access_expires_in,
            refresh_token_expires_in: refresh_expires_in,
            mall_token_expires_in: mall_expires_in,
        }
    }

    fn sign(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn generate_access_token(&self, subject: AccessTokenSubject<'_>) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_token_expires_in);

        let claims = Claims {
            sub: subject.user_id.to_string(),
            role: subject.role.map(str::to_string),
            partner: subject.partner.map(str::to_string),
            permissions: subject.permissions.to_vec(),
            email: None,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };

        self.sign(&claims)
    }

    pub fn generate_refresh_token(&self, user_id: i64) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.refresh_token_expires_in);

        let claims = Claims {
            sub: user_id.to_string(),
            role: None,
            partner: None,
            permissions: Vec::new(),
            email: None,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: TOKEN_TYPE_REFRESH.to_string(),
        };

        self.sign(&claims)
    }

    pub fn generate_mall_token(&self, mall_user_id: i64, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.mall_token_expires_in);

        let claims = Claims {
            sub: mall_user_id.to_string(),
            role: None,
            partner: None,
            permissions: Vec::new(),
            email: Some(email.to_string()),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: TOKEN_TYPE_MALL.to_string(),
        };

        self.sign(&claims)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    fn verify_typed(&self, token: &str, expected: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != expected {
            return Err(AppError::AuthError(format!(
                "Invalid {expected} token type"
            )));
        }

        Ok(claims)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        self.verify_typed(token, TOKEN_TYPE_ACCESS)
    }

    pub fn verify_refresh_token(&self, token: &str) -> AppResult<Claims> {
        self.verify_typed(token, TOKEN_TYPE_REFRESH)
    }

    pub fn verify_mall_token(&self, token: &str) -> AppResult<Claims> {
        self.verify_typed(token, TOKEN_TYPE_MALL)
    }

    pub fn get_access_token_expires_in(&self) -> i64 {
        self.access_token_expires_in
    }

    pub fn get_mall_token_expires_in(&self) -> i64 {
        self.mall_token_expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret", 3600, 7200, 604800)
    }

    #[test]
    fn test_access_token_round_trip() {
        let svc = service();
        let perms = vec!["dashboard".to_string(), "order_management".to_string()];
        let token = svc
            .generate_access_token(AccessTokenSubject {
                user_id: 42,
                role: Some("PARTNER"),
                partner: Some("coupang"),
                permissions: &perms,
            })
            .unwrap();

        let claims = svc.verify_access_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role.as_deref(), Some("PARTNER"));
        assert_eq!(claims.partner.as_deref(), Some("coupang"));
        assert_eq!(claims.permissions, perms);
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let svc = service();
        let refresh = svc.generate_refresh_token(7).unwrap();
        let mall = svc.generate_mall_token(9, "a@b.com").unwrap();

        assert!(svc.verify_access_token(&refresh).is_err());
        assert!(svc.verify_access_token(&mall).is_err());
        assert!(svc.verify_refresh_token(&mall).is_err());
        assert_eq!(svc.verify_refresh_token(&refresh).unwrap().user_id().unwrap(), 7);

        let claims = svc.verify_mall_token(&mall).unwrap();
        assert_eq!(claims.email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let other = JwtService::new("other-secret", 3600, 7200, 604800);
        let token = other.generate_refresh_token(1).unwrap();
        assert!(service().verify_refresh_token(&token).is_err());
    }
}
