//! Section Sequencer: derives the ordered placement units of a résumé.
//!
//! Experience entries are keyed one per job so a page break can fall between
//! two jobs. Education, projects and references are single aggregate keys and
//! are never split.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::ResumeDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionName {
    Header,
    Objective,
    Experience,
    Education,
    Projects,
    Skills,
    Languages,
    SoftSkills,
    References,
}

impl SectionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Objective => "objective",
            Self::Experience => "experience",
            Self::Education => "education",
            Self::Projects => "projects",
            Self::Skills => "skills",
            Self::Languages => "languages",
            Self::SoftSkills => "softSkills",
            Self::References => "references",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "header" => Self::Header,
            "objective" => Self::Objective,
            "experience" => Self::Experience,
            "education" => Self::Education,
            "projects" => Self::Projects,
            "skills" => Self::Skills,
            "languages" => Self::Languages,
            "softSkills" => Self::SoftSkills,
            "references" => Self::References,
            _ => return None,
        })
    }
}

/// One placeable unit: a section, or one entry of a per-entry section.
///
/// Text form is `name` or `name-index`, e.g. `experience-2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionKey {
    pub name: SectionName,
    pub index: Option<usize>,
}

impl SectionKey {
    pub const fn new(name: SectionName) -> Self {
        Self { name, index: None }
    }

    pub const fn indexed(name: SectionName, index: usize) -> Self {
        Self {
            name,
            index: Some(index),
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}-{}", self.name.as_str(), i),
            None => f.write_str(self.name.as_str()),
        }
    }
}

impl FromStr for SectionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, index) = match s.split_once('-') {
            Some((name, idx)) => {
                let idx = idx
                    .parse::<usize>()
                    .map_err(|_| format!("invalid section index in '{s}'"))?;
                (name, Some(idx))
            }
            None => (s, None),
        };
        let name = SectionName::parse(name).ok_or_else(|| format!("unknown section '{s}'"))?;
        Ok(Self { name, index })
    }
}

impl Serialize for SectionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SectionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered section keys for `doc`, omitting empty sections.
pub fn sequence(doc: &ResumeDocument) -> Vec<SectionKey> {
    let mut keys = vec![SectionKey::new(SectionName::Header)];

    if !doc.objective.is_empty() {
        keys.push(SectionKey::new(SectionName::Objective));
    }
    keys.extend(
        (0..doc.experience.len()).map(|i| SectionKey::indexed(SectionName::Experience, i)),
    );
    if !doc.education.is_empty() {
        keys.push(SectionKey::new(SectionName::Education));
    }
    if !doc.projects.is_empty() {
        keys.push(SectionKey::new(SectionName::Projects));
    }
    if !doc.skills.is_empty() {
        keys.push(SectionKey::new(SectionName::Skills));
    }
    if !doc.languages.trim().is_empty() {
        keys.push(SectionKey::new(SectionName::Languages));
    }
    if !doc.soft_skills.trim().is_empty() {
        keys.push(SectionKey::new(SectionName::SoftSkills));
    }
    if !doc.references.is_empty() {
        keys.push(SectionKey::new(SectionName::References));
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Education, Experience, Project, Reference};

    fn full_document() -> ResumeDocument {
        ResumeDocument {
            full_name: "Ada".to_string(),
            objective: "Build engines".to_string(),
            experience: vec![Experience::default(), Experience::default()],
            education: vec![Education::default()],
            projects: vec![Project::default()],
            skills: "Math".to_string(),
            languages: "English".to_string(),
            soft_skills: "Patience".to_string(),
            references: vec![Reference::default()],
            ..ResumeDocument::default()
        }
    }

    fn names(keys: &[SectionKey]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_full_document_order() {
        let keys = sequence(&full_document());
        assert_eq!(
            names(&keys),
            vec![
                "header",
                "objective",
                "experience-0",
                "experience-1",
                "education",
                "projects",
                "skills",
                "languages",
                "softSkills",
                "references",
            ]
        );
    }

    #[test]
    fn test_empty_document_is_header_only() {
        let keys = sequence(&ResumeDocument::default());
        assert_eq!(keys, vec![SectionKey::new(SectionName::Header)]);
    }

    #[test]
    fn test_empty_objective_omitted_and_restored_in_place() {
        let mut doc = full_document();
        doc.objective = String::new();
        let without = sequence(&doc);
        assert!(!without.contains(&SectionKey::new(SectionName::Objective)));

        doc.objective = "Back again".to_string();
        let with = sequence(&doc);
        assert_eq!(with[1], SectionKey::new(SectionName::Objective));
        assert_eq!(with, sequence(&full_document()));
    }

    #[test]
    fn test_whitespace_only_languages_and_soft_skills_omitted() {
        let mut doc = full_document();
        doc.languages = "  \n ".to_string();
        doc.soft_skills = "\t".to_string();
        let keys = sequence(&doc);
        assert!(!keys.contains(&SectionKey::new(SectionName::Languages)));
        assert!(!keys.contains(&SectionKey::new(SectionName::SoftSkills)));
    }

    #[test]
    fn test_sequence_is_deterministic() {
        let doc = full_document();
        assert_eq!(sequence(&doc), sequence(&doc));
    }

    #[test]
    fn test_key_text_round_trips() {
        for key in sequence(&full_document()) {
            let parsed: SectionKey = key.to_string().parse().unwrap();
            assert_eq!(parsed, key);
        }
        assert!("experience-x".parse::<SectionKey>().is_err());
        assert!("footer".parse::<SectionKey>().is_err());
    }

    #[test]
    fn test_key_serializes_as_string() {
        let key = SectionKey::indexed(SectionName::Experience, 3);
        assert_eq!(serde_json::to_value(key).unwrap(), "experience-3");
    }
}
