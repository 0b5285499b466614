// src/services/token.rs

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::auth::Claims;

// Sessão curta por padrão; "lembrar de mim" estende para dias.
pub const SESSION_TTL_SECS: i64 = 6 * 60 * 60;
pub const REMEMBER_TTL_SECS: i64 = 3 * 24 * 60 * 60;

// Emite e verifica a credencial assinada. O segredo é simétrico e vive
// apenas no serviço; não existe refresh: expirou, faz login de novo.
#[derive(Clone)]
pub struct TokenAuthority {
    secret: String,
}

impl TokenAuthority {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    pub fn issue(
        &self,
        user_id: Uuid,
        username: &str,
        role: &str,
        permissions: Vec<String>,
        allowed_paths: Vec<String>,
        ttl_secs: i64,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(ttl_secs);

        let claims = Claims {
            sub: user_id,
            username: username.to_owned(),
            role: role.to_owned(),
            permissions,
            allowed_paths,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )?)
    }

    // Falha de verificação nunca vira erro: assinatura inválida ou token
    // expirado resolvem para "sem identidade", e o gate decide o que fazer.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let validation = Validation::default();
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map(|data| data.claims)
        .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority() -> TokenAuthority {
        TokenAuthority::new("segredo-de-teste".into())
    }

    #[test]
    fn issue_then_verify_round_trips_the_payload() {
        let auth = authority();
        let user_id = Uuid::new_v4();
        let paths = vec!["/api/contents".to_string(), "/api/logs".to_string()];

        let token = auth
            .issue(
                user_id,
                "maria",
                "editor",
                vec!["content:create".into()],
                paths.clone(),
                SESSION_TTL_SECS,
            )
            .unwrap();

        let claims = auth.verify(&token).expect("token recém-emitido deve ser válido");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "maria");
        assert_eq!(claims.role, "editor");
        assert_eq!(claims.allowed_paths, paths);
        assert_eq!(claims.permissions, vec!["content:create".to_string()]);
    }

    #[test]
    fn expired_token_resolves_to_no_identity() {
        let auth = authority();
        let token = auth
            .issue(Uuid::new_v4(), "maria", "editor", vec![], vec![], -3600)
            .unwrap();

        assert!(auth.verify(&token).is_none());
    }

    #[test]
    fn wrong_secret_resolves_to_no_identity() {
        let token = authority()
            .issue(Uuid::new_v4(), "maria", "editor", vec![], vec![], SESSION_TTL_SECS)
            .unwrap();

        let other = TokenAuthority::new("outro-segredo".into());
        assert!(other.verify(&token).is_none());
    }
}
