// SPDX-License-Identifier: Apache-2.0

use weightlog_model::Password;

use crate::error::ServiceError;

pub async fn hash_password(password: Password, cost: u32) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password.expose(), cost))
        .await
        .map_err(|e| ServiceError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| ServiceError::Internal(format!("password hashing failed: {e}")))
}

/// A stored hash that cannot be parsed counts as a mismatch.
pub async fn verify_password(password: Password, hash: String) -> Result<bool, ServiceError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password.expose(), &hash).unwrap_or(false))
        .await
        .map_err(|e| ServiceError::Internal(format!("password check task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_verify_only_the_original_password() {
        let hash = hash_password(Password::parse_new("hunter22").expect("pw"), 4)
            .await
            .expect("hash");
        assert!(hash.starts_with("$2"));
        assert!(verify_password(Password::parse_login("hunter22").expect("pw"), hash.clone())
            .await
            .expect("verify"));
        assert!(!verify_password(Password::parse_login("hunter23").expect("pw"), hash)
            .await
            .expect("verify"));
    }

    #[tokio::test]
    async fn garbage_hash_is_a_mismatch() {
        let ok = verify_password(Password::parse_login("x").expect("pw"), "not-a-hash".into())
            .await
            .expect("verify");
        assert!(!ok);
    }
}
