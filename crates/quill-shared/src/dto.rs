//! Form payloads posted by the HTML pages.
//!
//! Missing fields decode as empty strings so the domain validation,
//! not the form decoder, decides what a bad submission looks like.

use serde::{Deserialize, Serialize};

/// Fields of the sign-up and sign-in forms.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for CredentialsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsForm")
            .field("name", &self.name)
            .field("password", &"***")
            .finish()
    }
}

/// Fields of the create and edit post forms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let form: PostForm = serde_json::from_str(r#"{"title":"Hello"}"#).unwrap();
        assert_eq!(form.title, "Hello");
        assert!(form.body.is_empty());
    }

    #[test]
    fn test_credentials_debug_masks_password() {
        let form = CredentialsForm {
            name: "alice".into(),
            password: "hunter2".into(),
        };
        let rendered = format!("{form:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }
}
