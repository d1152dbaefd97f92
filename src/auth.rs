// 🔐 Simulated login gate
//
// Unauthenticated → Authenticated on a successful login; only logout resets it.
// Credentials are checked against the configured demo accounts.

use crate::config::DemoAccount;
use crate::error::AuthError;
use crate::validation::is_valid_email;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub authenticated: bool,
    pub user_email: Option<String>,
}

impl Session {
    pub fn restored(authenticated: bool, user_email: Option<String>) -> Self {
        Session {
            authenticated: authenticated && user_email.is_some(),
            user_email,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn login(
        &mut self,
        accounts: &[DemoAccount],
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }

        let matched = accounts
            .iter()
            .any(|a| a.email.eq_ignore_ascii_case(email) && a.password == password);
        if !matched {
            return Err(AuthError::InvalidCredentials);
        }

        info!(email, "login succeeded");
        self.authenticated = true;
        self.user_email = Some(email.to_string());
        Ok(())
    }

    pub fn logout(&mut self) {
        if let Some(email) = self.user_email.take() {
            info!(email = %email, "logged out");
        }
        self.authenticated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;

    #[test]
    fn test_login_validation_order() {
        let accounts = AuthConfig::default().accounts;
        let mut session = Session::default();

        assert_eq!(session.login(&accounts, "", "demo123"), Err(AuthError::MissingCredentials));
        assert_eq!(session.login(&accounts, "not-an-email", "demo123"), Err(AuthError::InvalidEmail));
        assert_eq!(session.login(&accounts, "demo@example.com", "abc"), Err(AuthError::PasswordTooShort));
        assert_eq!(
            session.login(&accounts, "demo@example.com", "wrong-password"),
            Err(AuthError::InvalidCredentials)
        );
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_login_then_logout() {
        let accounts = AuthConfig::default().accounts;
        let mut session = Session::default();

        session.login(&accounts, " demo@example.com ", "demo123").unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.user_email.as_deref(), Some("demo@example.com"));

        session.logout();
        assert_eq!(session, Session::default());

        println!("✅ Login gate test PASSED");
    }

    #[test]
    fn test_restored_requires_email() {
        assert!(!Session::restored(true, None).is_authenticated());
        assert!(Session::restored(true, Some("a@b.co".to_string())).is_authenticated());
    }
}
