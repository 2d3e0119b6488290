use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit JSON `null` the same as an absent field.
///
/// Stored collections written by older builds contain `null` for optional
/// strings and lists; those must load as empty values rather than fail.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The editable résumé schema. Every field defaults to empty.
///
/// Dates are opaque strings and are never parsed. `description`, `topics`,
/// `skills`, `languages`, `softSkills` and `interpersonalSkills` are
/// newline-delimited free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    #[serde(deserialize_with = "nullable")]
    pub full_name: String,
    #[serde(deserialize_with = "nullable")]
    pub job_title: String,
    #[serde(deserialize_with = "nullable")]
    pub address: String,
    #[serde(deserialize_with = "nullable")]
    pub phone: String,
    #[serde(deserialize_with = "nullable")]
    pub email: String,
    #[serde(deserialize_with = "nullable")]
    pub linkedin: String,
    #[serde(deserialize_with = "nullable")]
    pub linkedin_name: String,
    #[serde(deserialize_with = "nullable")]
    pub github: String,
    #[serde(deserialize_with = "nullable")]
    pub github_name: String,
    #[serde(deserialize_with = "nullable")]
    pub portfolio: String,
    #[serde(deserialize_with = "nullable")]
    pub portfolio_name: String,
    #[serde(deserialize_with = "nullable")]
    pub objective: String,
    #[serde(deserialize_with = "nullable")]
    pub education: Vec<Education>,
    #[serde(deserialize_with = "nullable")]
    pub experience: Vec<Experience>,
    #[serde(deserialize_with = "nullable")]
    pub projects: Vec<Project>,
    #[serde(deserialize_with = "nullable")]
    pub skills: String,
    #[serde(deserialize_with = "nullable")]
    pub languages: String,
    #[serde(deserialize_with = "nullable")]
    pub soft_skills: String,
    #[serde(deserialize_with = "nullable")]
    pub interpersonal_skills: String,
    #[serde(deserialize_with = "nullable")]
    pub references: Vec<Reference>,
    #[serde(deserialize_with = "nullable")]
    pub custom_fields: Vec<CustomField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub course: String,
    #[serde(deserialize_with = "nullable")]
    pub institution: String,
    #[serde(deserialize_with = "nullable")]
    pub start_date: String,
    #[serde(deserialize_with = "nullable")]
    pub end_date: String,
    #[serde(deserialize_with = "nullable")]
    pub topics: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub role: String,
    #[serde(deserialize_with = "nullable")]
    pub company: String,
    #[serde(deserialize_with = "nullable")]
    pub start_date: String,
    #[serde(deserialize_with = "nullable")]
    pub end_date: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub technologies: String,
    #[serde(deserialize_with = "nullable")]
    pub link: String,
    #[serde(deserialize_with = "nullable")]
    pub start_date: String,
    #[serde(deserialize_with = "nullable")]
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reference {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub email: String,
    #[serde(deserialize_with = "nullable")]
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomField {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub label: String,
    #[serde(deserialize_with = "nullable")]
    pub value: String,
}

impl ResumeDocument {
    /// Placeholder content for a freshly created résumé.
    pub fn placeholder() -> Self {
        Self {
            full_name: "Your Name".to_string(),
            address: "Your Address".to_string(),
            phone: "(00) 00000-0000".to_string(),
            email: "your.email@example.com".to_string(),
            linkedin: "linkedin.com/in/your-profile".to_string(),
            objective: "Your professional objective here...".to_string(),
            skills: "Your skills...".to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_lists_deserialize_empty() {
        let doc: ResumeDocument = serde_json::from_value(json!({
            "fullName": "Ada Lovelace",
            "objective": "Engines"
        }))
        .unwrap();
        assert_eq!(doc.full_name, "Ada Lovelace");
        assert!(doc.experience.is_empty());
        assert!(doc.education.is_empty());
        assert!(doc.references.is_empty());
        assert_eq!(doc.languages, "");
    }

    #[test]
    fn test_null_fields_deserialize_empty() {
        let doc: ResumeDocument = serde_json::from_value(json!({
            "fullName": null,
            "projects": null,
            "experience": [{ "role": "Engineer", "endDate": null }]
        }))
        .unwrap();
        assert_eq!(doc.full_name, "");
        assert!(doc.projects.is_empty());
        assert_eq!(doc.experience[0].role, "Engineer");
        assert_eq!(doc.experience[0].end_date, "");
    }

    #[test]
    fn test_serializes_camel_case_keys() {
        let doc = ResumeDocument {
            soft_skills: "Listening".to_string(),
            ..ResumeDocument::default()
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["softSkills"], "Listening");
        assert!(value.get("customFields").is_some());
    }

    #[test]
    fn test_dates_are_kept_verbatim() {
        let doc: ResumeDocument = serde_json::from_value(json!({
            "education": [{ "startDate": "sometime in 2019??", "endDate": "" }]
        }))
        .unwrap();
        assert_eq!(doc.education[0].start_date, "sometime in 2019??");
    }

    #[test]
    fn test_placeholder_has_contact_and_objective() {
        let doc = ResumeDocument::placeholder();
        assert_eq!(doc.full_name, "Your Name");
        assert!(!doc.objective.is_empty());
        assert!(doc.experience.is_empty());
    }
}
