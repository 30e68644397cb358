//! Study material model and its query parameters.

use serde::{Deserialize, Deserializer, Serialize};

use super::University;

/// The fixed set of material kinds.
///
/// Every site that branches on the kind matches exhaustively, so adding a
/// variant is a compile error until each mapping handles it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    QuestionPaper,
    Notes,
    Video,
    ImportantQuestions,
    LearningLink,
}

impl MaterialType {
    pub const ALL: [MaterialType; 5] = [
        MaterialType::Notes,
        MaterialType::QuestionPaper,
        MaterialType::ImportantQuestions,
        MaterialType::Video,
        MaterialType::LearningLink,
    ];

    /// Stored and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::QuestionPaper => "question_paper",
            MaterialType::Notes => "notes",
            MaterialType::Video => "video",
            MaterialType::ImportantQuestions => "important_questions",
            MaterialType::LearningLink => "learning_link",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "question_paper" => Some(MaterialType::QuestionPaper),
            "notes" => Some(MaterialType::Notes),
            "video" => Some(MaterialType::Video),
            "important_questions" => Some(MaterialType::ImportantQuestions),
            "learning_link" => Some(MaterialType::LearningLink),
            _ => None,
        }
    }

    /// Short slug used by the browse UI's category tabs.
    pub fn category(&self) -> &'static str {
        match self {
            MaterialType::QuestionPaper => "pyq",
            MaterialType::Notes => "notes",
            MaterialType::Video => "video",
            MaterialType::ImportantQuestions => "imp",
            MaterialType::LearningLink => "links",
        }
    }

    pub fn from_category(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.category() == slug)
    }

    pub fn label(&self) -> &'static str {
        match self {
            MaterialType::QuestionPaper => "PYQs",
            MaterialType::Notes => "Notes",
            MaterialType::Video => "Videos",
            MaterialType::ImportantQuestions => "Important",
            MaterialType::LearningLink => "Learning Links",
        }
    }

    /// Call to action shown next to a material's link.
    pub fn open_action(&self) -> &'static str {
        match self {
            MaterialType::QuestionPaper => "Download PDF",
            MaterialType::Notes => "Read Notes",
            MaterialType::Video => "Watch Now",
            MaterialType::ImportantQuestions => "View Questions",
            MaterialType::LearningLink => "Visit Link",
        }
    }
}

impl std::fmt::Display for MaterialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single catalog entry, with its university expanded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MaterialType,
    pub link: String,
    /// `None` when the referenced university no longer exists.
    pub university: Option<University>,
    pub course: String,
    pub year: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<i64>,
    pub subject: String,
    pub created_at: String,
}

impl Material {
    pub fn university_id(&self) -> Option<&str> {
        self.university.as_ref().map(|u| u.id.as_str())
    }
}

/// Request body for uploading material metadata.
///
/// Every field is optional at the serde level so that missing fields surface
/// as validation errors with a readable message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub year: Option<LenientInt>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub semester: Option<LenientInt>,
    #[serde(default)]
    pub subject: Option<String>,
}

/// An integer field that forms may submit as a number or as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LenientInt {
    Value(i64),
    Invalid(String),
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<LenientInt>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(Raw::Int(v)) => Some(LenientInt::Value(v)),
        // `as` saturates, so out-of-range floats must not reach the cast.
        Some(Raw::Float(f))
            if f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&f) =>
        {
            Some(LenientInt::Value(f as i64))
        }
        Some(Raw::Float(f)) => Some(LenientInt::Invalid(f.to_string())),
        Some(Raw::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                match trimmed.parse::<i64>() {
                    Ok(v) => Some(LenientInt::Value(v)),
                    Err(_) => Some(LenientInt::Invalid(s)),
                }
            }
        }
    })
}

/// A validated material ready to be stored.
#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub title: String,
    pub kind: MaterialType,
    pub link: String,
    pub university_id: String,
    pub course: String,
    pub year: i64,
    pub semester: Option<i64>,
    pub subject: String,
}

/// Raw query string of `GET /api/materials`.
///
/// Unknown and repeated parameters are dropped by
/// [`MaterialQueryParams::from_pairs`]; malformed ones by
/// [`MaterialQueryParams::into_filter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialQueryParams {
    pub university_id: Option<String>,
    pub course: Option<String>,
    pub year: Option<String>,
    pub semester: Option<String>,
    pub subject: Option<String>,
}

impl MaterialQueryParams {
    /// Folds decoded query pairs. The first occurrence of a key wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "universityId" => &mut params.university_id,
                "course" => &mut params.course,
                "year" => &mut params.year,
                "semester" => &mut params.semester,
                "subject" => &mut params.subject,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }

    pub fn into_filter(self) -> MaterialFilter {
        fn text(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }
        fn number(v: Option<String>) -> Option<i64> {
            v.and_then(|s| s.trim().parse().ok())
        }

        MaterialFilter {
            university_id: text(self.university_id),
            course: text(self.course),
            year: number(self.year),
            semester: number(self.semester),
            subject: text(self.subject),
        }
    }
}

/// Exact-match constraints over the material store. `None` is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialFilter {
    pub university_id: Option<String>,
    pub course: Option<String>,
    pub year: Option<i64>,
    pub semester: Option<i64>,
    pub subject: Option<String>,
}

impl MaterialFilter {
    pub fn matches(&self, material: &Material) -> bool {
        self.university_id
            .as_deref()
            .map_or(true, |id| material.university_id() == Some(id))
            && self.course.as_ref().map_or(true, |c| &material.course == c)
            && self.year.map_or(true, |y| material.year == y)
            && self
                .semester
                .map_or(true, |s| material.semester == Some(s))
            && self.subject.as_ref().map_or(true, |s| &material.subject == s)
    }
}
