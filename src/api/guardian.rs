//! Guardian registration payload and the `{success: bool}` reply convention.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiError;

/// Lowest (most urgent) notification priority.
pub const MIN_PRIORITY: u8 = 1;
/// Highest notification priority accepted by the notification service.
pub const MAX_PRIORITY: u8 = 5;

/// A guardian to notify in an emergency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guardian {
    pub patient_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default = "default_relationship")]
    pub relationship: String,
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_relationship() -> String {
    "Family".to_string()
}

fn default_priority() -> u8 {
    MIN_PRIORITY
}

impl Guardian {
    pub fn new(
        patient_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            relationship: default_relationship(),
            priority: default_priority(),
        }
    }

    pub fn relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = relationship.into();
        self
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Check the fields the notification service requires.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.patient_id.trim().is_empty() {
            return Err(ApiError::Invalid("patient id is required".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(ApiError::Invalid("guardian name is required".to_string()));
        }
        if !self.email.contains('@') {
            return Err(ApiError::Invalid(format!(
                "'{}' is not an email address",
                self.email
            )));
        }
        if self.phone.trim().is_empty() {
            return Err(ApiError::Invalid("guardian phone is required".to_string()));
        }
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&self.priority) {
            return Err(ApiError::Invalid(format!(
                "priority must be {}-{}, got {}",
                MIN_PRIORITY, MAX_PRIORITY, self.priority
            )));
        }
        Ok(())
    }
}

/// Interpret a notification-service reply: `{success: true, ...}` passes,
/// anything else is rejected with the server's message when it has one.
pub fn ensure_success(body: &Value) -> Result<(), ApiError> {
    if body.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }
    let message = ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .unwrap_or("server reported failure");
    Err(ApiError::Rejected(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn guardian() -> Guardian {
        Guardian::new("P001", "Ada", "ada@example.com", "+1 555 0100")
    }

    #[test]
    fn test_defaults() {
        let g = guardian();
        assert_eq!(g.relationship, "Family");
        assert_eq!(g.priority, 1);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn test_priority_range() {
        assert!(guardian().priority(5).validate().is_ok());
        assert!(matches!(
            guardian().priority(0).validate(),
            Err(ApiError::Invalid(_))
        ));
        assert!(matches!(
            guardian().priority(6).validate(),
            Err(ApiError::Invalid(_))
        ));
    }

    #[test]
    fn test_required_fields() {
        let mut g = guardian();
        g.email = "not-an-email".to_string();
        assert!(g.validate().is_err());

        let mut g = guardian();
        g.name = "  ".to_string();
        assert!(g.validate().is_err());
    }

    #[test]
    fn test_body_serializes_flat() {
        let body = serde_json::to_value(guardian().relationship("Parent")).unwrap();
        assert_eq!(body["relationship"], "Parent");
        assert_eq!(body["priority"], 1);
        assert_eq!(body["patient_id"], "P001");
    }

    #[test]
    fn test_ensure_success() {
        assert!(ensure_success(&json!({"success": true})).is_ok());
        assert_eq!(
            ensure_success(&json!({"success": false, "message": "duplicate"})),
            Err(ApiError::Rejected("duplicate".to_string()))
        );
        assert!(ensure_success(&json!({})).is_err());
    }
}
