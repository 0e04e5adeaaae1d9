use serde::{Deserialize, Serialize};

// ----------------- Auth Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ----------------- Form Submissions -----------------

/// Post create/edit submission. `group` is the target group's slug and
/// `image` an opaque reference into the asset store.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct PostForm {
    pub text: String,
    pub group: Option<String>,
    pub image: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct CommentForm {
    pub text: String,
}

#[derive(Serialize, Debug)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        FieldError { field, message }
    }
}

impl PostForm {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.text.trim().is_empty() {
            errors.push(FieldError::new("text", "This field is required"));
        }
        errors
    }
}
