//! Faceted navigation over a flat material list.
//!
//! Courses, subjects, years and semesters are not stored anywhere; they are
//! the distinct values present in the materials currently in scope.

mod navigator;

pub use navigator::*;

use std::collections::HashSet;

use serde::Serialize;

use crate::models::{Material, MaterialType};

/// Distinct values in first-seen order.
fn distinct<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

pub fn distinct_courses<'a>(materials: impl IntoIterator<Item = &'a Material>) -> Vec<String> {
    distinct(materials.into_iter().map(|m| m.course.as_str()))
}

/// Subjects taught under `course`. Comparison is exact and case-sensitive.
pub fn distinct_subjects<'a>(
    materials: impl IntoIterator<Item = &'a Material>,
    course: &str,
) -> Vec<String> {
    distinct(
        materials
            .into_iter()
            .filter(|m| m.course == course)
            .map(|m| m.subject.as_str()),
    )
}

/// Distinct years, newest first.
pub fn year_facet<'a>(materials: impl IntoIterator<Item = &'a Material>) -> Vec<i64> {
    let mut years: Vec<i64> = materials.into_iter().map(|m| m.year).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

/// Distinct semesters, ascending. Materials without a semester add nothing.
pub fn semester_facet<'a>(materials: impl IntoIterator<Item = &'a Material>) -> Vec<i64> {
    let mut semesters: Vec<i64> = materials.into_iter().filter_map(|m| m.semester).collect();
    semesters.sort_unstable();
    semesters.dedup();
    semesters
}

/// One independent predicate of the result filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Type(MaterialType),
    /// Lowercased needle, matched against the title only.
    Search(String),
    Year(String),
    Semester(String),
}

impl Predicate {
    pub fn matches(&self, material: &Material) -> bool {
        match self {
            Predicate::Type(kind) => material.kind == *kind,
            Predicate::Search(needle) => material.title.to_lowercase().contains(needle.as_str()),
            Predicate::Year(year) => material.year.to_string() == *year,
            Predicate::Semester(semester) => material
                .semester
                .is_some_and(|s| s.to_string() == *semester),
        }
    }
}

/// Filters applied once a subject has been chosen. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultFilter {
    pub kind: Option<MaterialType>,
    pub search: String,
    pub year: Option<String>,
    pub semester: Option<String>,
}

impl ResultFilter {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// The active predicates. They are ANDed, so their order is irrelevant.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::with_capacity(4);
        if let Some(kind) = self.kind {
            predicates.push(Predicate::Type(kind));
        }
        if !self.search.is_empty() {
            predicates.push(Predicate::Search(self.search.to_lowercase()));
        }
        if let Some(year) = &self.year {
            predicates.push(Predicate::Year(year.clone()));
        }
        if let Some(semester) = &self.semester {
            predicates.push(Predicate::Semester(semester.clone()));
        }
        predicates
    }

    pub fn apply<'a>(&self, materials: impl IntoIterator<Item = &'a Material>) -> Vec<&'a Material> {
        let predicates = self.predicates();
        materials
            .into_iter()
            .filter(|m| predicates.iter().all(|p| p.matches(m)))
            .collect()
    }
}

/// Facet sets for one drill-down position, as served by the facets endpoint.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FacetSummary {
    pub courses: Vec<String>,
    /// Empty until a course is given.
    pub subjects: Vec<String>,
    /// Empty until a subject is given.
    pub years: Vec<i64>,
    pub semesters: Vec<i64>,
}

/// Derive the facets visible at a drill-down position from scoped materials.
pub fn summarize(materials: &[Material], course: Option<&str>, subject: Option<&str>) -> FacetSummary {
    let courses = distinct_courses(materials);
    let Some(course) = course else {
        return FacetSummary {
            courses,
            ..Default::default()
        };
    };

    let subjects = distinct_subjects(materials, course);
    let Some(subject) = subject else {
        return FacetSummary {
            courses,
            subjects,
            ..Default::default()
        };
    };

    let in_subject: Vec<&Material> = materials
        .iter()
        .filter(|m| m.course == course && m.subject == subject)
        .collect();

    FacetSummary {
        courses,
        subjects,
        years: year_facet(in_subject.iter().copied()),
        semesters: semester_facet(in_subject.iter().copied()),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{Material, MaterialType, University};

    pub fn university(id: &str) -> University {
        University {
            id: id.to_string(),
            name: format!("University {}", id),
            description: None,
            logo_url: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    pub fn material(
        id: &str,
        university_id: &str,
        course: &str,
        subject: &str,
        kind: MaterialType,
        year: i64,
        semester: Option<i64>,
    ) -> Material {
        Material {
            id: id.to_string(),
            title: format!("{} {} {}", subject, kind.label(), year),
            kind,
            link: format!("http://example.test/{}", id),
            university: Some(university(university_id)),
            course: course.to_string(),
            year,
            semester,
            subject: subject.to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    /// A small catalog spread over two universities.
    pub fn catalog() -> Vec<Material> {
        use MaterialType::*;
        vec![
            material("m1", "u1", "BCA", "Operating Systems", Notes, 2024, Some(3)),
            material("m2", "u1", "BCA", "Operating Systems", QuestionPaper, 2023, Some(3)),
            material("m3", "u1", "BCA", "Operating Systems", Video, 2024, None),
            material("m4", "u1", "BCA", "DBMS", Notes, 2022, Some(4)),
            material("m5", "u1", "MCA", "Operating Systems", ImportantQuestions, 2024, Some(1)),
            material("m6", "u1", "bca", "Networks", LearningLink, 2021, Some(5)),
            material("m7", "u2", "BCA", "Compilers", Notes, 2024, Some(6)),
        ]
    }
}
