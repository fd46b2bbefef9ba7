//! User profile record

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Courses offered in the profile form
pub const COURSES: &[&str] = &["Computer Science", "Electronics", "Mechanical", "Civil", "Other"];

/// Roles offered in the profile form
pub const ROLES: &[&str] = &["Student", "Teacher", "Organizer"];

/// Per-user profile as stored in the document database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_profile_complete: bool,
}

impl Profile {
    /// Build a completed profile; name, course and role are required
    pub fn complete(
        name: impl Into<String>,
        course: impl Into<String>,
        role: impl Into<String>,
        email: Option<String>,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        let course = course.into().trim().to_string();
        let role = role.into().trim().to_string();

        if name.is_empty() {
            return Err(DomainError::MissingField("name"));
        }
        if course.is_empty() {
            return Err(DomainError::MissingField("course"));
        }
        if role.is_empty() {
            return Err(DomainError::MissingField("role"));
        }

        Ok(Self {
            name,
            course,
            role,
            email,
            is_profile_complete: true,
        })
    }

    /// Whether the signed-in user may enter the dashboard
    pub fn can_enter_dashboard(&self) -> bool {
        self.is_profile_complete
    }
}
