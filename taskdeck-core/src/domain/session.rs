//! Session domain model

use serde::{Deserialize, Serialize};

/// Identity of the signed-in user, as persisted under `userData`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Authenticated user context plus the bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: UserProfile,
    pub token: String,
}

impl Session {
    pub fn new(user: UserProfile, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }

    /// Greeting shown at the top of the app view
    pub fn welcome(&self) -> String {
        format!("Welcome, {}!", self.user.username)
    }
}

/// Credentials sent to the sign-in endpoint
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Successful sign-in response body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub access_token: String,
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl SignInResponse {
    pub fn into_session(self) -> Session {
        Session::new(
            UserProfile {
                id: self.id,
                username: self.username,
                email: self.email,
            },
            self.access_token,
        )
    }
}

/// New-account request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_response_into_session() {
        let json = r#"{"accessToken":"jwt-abc","id":3,"username":"ada","email":"ada@example.com","type":"Bearer","roles":["ROLE_USER"]}"#;
        let response: SignInResponse = serde_json::from_str(json).unwrap();
        let session = response.into_session();
        assert_eq!(session.token, "jwt-abc");
        assert_eq!(session.user.id, 3);
        assert_eq!(session.welcome(), "Welcome, ada!");
    }

    #[test]
    fn test_sign_up_wire_format() {
        let request = SignUpRequest {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["firstName"], "Ada");
        assert_eq!(value["lastName"], "Lovelace");
    }
}
