//! Deployment credential check (advisory).

use crate::config::OperatorEnv;
use serde::Serialize;

/// Token the deploy workflow uses to push to the Space
pub const HF_TOKEN: &str = "HF_TOKEN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    Present,
    Missing,
}

impl CredentialStatus {
    pub fn is_present(self) -> bool {
        self == CredentialStatus::Present
    }
}

/// Report whether the deploy token is available. Never fails: the real
/// deploy runs elsewhere with its own secrets.
pub fn check_credential(env: &OperatorEnv) -> CredentialStatus {
    match env.get(HF_TOKEN) {
        Some(token) if !token.trim().is_empty() => CredentialStatus::Present,
        _ => CredentialStatus::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_present() {
        let env = OperatorEnv::from_pairs([(HF_TOKEN, "hf_abc")]);
        assert_eq!(check_credential(&env), CredentialStatus::Present);
    }

    #[test]
    fn token_missing() {
        assert_eq!(
            check_credential(&OperatorEnv::default()),
            CredentialStatus::Missing
        );
    }

    #[test]
    fn blank_token_is_missing() {
        let env = OperatorEnv::from_pairs([(HF_TOKEN, "  ")]);
        assert_eq!(check_credential(&env), CredentialStatus::Missing);
    }
}
