//! Drill-down state machine: university scope, course, subject, results.

use crate::models::{Material, MaterialFilter, MaterialType};

use super::{distinct_courses, distinct_subjects, semester_facet, year_facet, ResultFilter};

/// Issued by [`Navigator::enter_scope`]; only the newest ticket may load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    NoScope,
    NoCourseSelected,
    NoSubjectSelected,
    UnknownCourse(String),
    UnknownSubject(String),
    /// A response arrived for a scope that has since been replaced.
    StaleLoad,
}

impl std::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavigationError::NoScope => write!(f, "no university selected"),
            NavigationError::NoCourseSelected => write!(f, "no course selected"),
            NavigationError::NoSubjectSelected => write!(f, "no subject selected"),
            NavigationError::UnknownCourse(c) => write!(f, "course '{}' has no materials", c),
            NavigationError::UnknownSubject(s) => write!(f, "subject '{}' has no materials", s),
            NavigationError::StaleLoad => write!(f, "discarded materials for a previous scope"),
        }
    }
}

impl std::error::Error for NavigationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    NoScope,
    Courses,
    Subjects,
    Results,
}

/// A facet level either has choices or is structurally empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetChoices {
    Empty,
    Items(Vec<String>),
}

impl FacetChoices {
    fn from_items(items: Vec<String>) -> Self {
        if items.is_empty() {
            FacetChoices::Empty
        } else {
            FacetChoices::Items(items)
        }
    }
}

/// Outcome of the result filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSet<'a> {
    /// The subject has no materials at all.
    Empty,
    /// Materials exist but the filters exclude all of them; offer a reset.
    FilteredOut,
    Matches(Vec<&'a Material>),
}

/// Everything a renderer needs for the current level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View<'a> {
    NoScope,
    Courses(FacetChoices),
    Subjects {
        course: &'a str,
        subjects: FacetChoices,
    },
    Results {
        course: &'a str,
        subject: &'a str,
        years: Vec<i64>,
        semesters: Vec<i64>,
        filter: &'a ResultFilter,
        results: ResultSet<'a>,
    },
}

/// Navigation state for one browsing session.
#[derive(Debug, Default)]
pub struct Navigator {
    scope: Option<String>,
    generation: u64,
    materials: Vec<Material>,
    course: Option<String>,
    subject: Option<String>,
    filter: ResultFilter,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> Level {
        match (&self.scope, &self.course, &self.subject) {
            (None, _, _) => Level::NoScope,
            (Some(_), None, _) => Level::Courses,
            (Some(_), Some(_), None) => Level::Subjects,
            (Some(_), Some(_), Some(_)) => Level::Results,
        }
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn filter(&self) -> &ResultFilter {
        &self.filter
    }

    /// Switch to a university. Loads for any earlier scope become stale.
    pub fn enter_scope(&mut self, university_id: &str) -> LoadTicket {
        self.generation += 1;
        self.scope = Some(university_id.to_string());
        self.materials.clear();
        self.course = None;
        self.subject = None;
        self.filter = ResultFilter::default();
        LoadTicket(self.generation)
    }

    /// Replace the material list. Materials outside the scope are dropped.
    ///
    /// Selections that no longer have materials are cleared along with the
    /// filters below them.
    pub fn load(&mut self, ticket: LoadTicket, materials: Vec<Material>) -> Result<(), NavigationError> {
        let scope = self.scope.clone().ok_or(NavigationError::NoScope)?;
        if ticket.0 != self.generation {
            tracing::debug!("Dropping stale material load for generation {}", ticket.0);
            return Err(NavigationError::StaleLoad);
        }

        let in_scope = MaterialFilter {
            university_id: Some(scope),
            ..Default::default()
        };
        self.materials = materials
            .into_iter()
            .filter(|m| in_scope.matches(m))
            .collect();

        if let Some(course) = &self.course {
            if !self.courses().contains(course) {
                self.clear_course();
                return Ok(());
            }
        }
        if let Some(subject) = &self.subject {
            if !self.subjects().contains(subject) {
                self.clear_subject();
            }
        }
        Ok(())
    }

    pub fn courses(&self) -> Vec<String> {
        distinct_courses(&self.materials)
    }

    /// Subjects of the selected course; empty before a course is chosen.
    pub fn subjects(&self) -> Vec<String> {
        match &self.course {
            Some(course) => distinct_subjects(&self.materials, course),
            None => Vec::new(),
        }
    }

    /// Materials of the selected subject before result filters apply.
    pub fn subject_materials(&self) -> Vec<&Material> {
        let (Some(course), Some(subject)) = (&self.course, &self.subject) else {
            return Vec::new();
        };
        let narrowed = MaterialFilter {
            course: Some(course.clone()),
            subject: Some(subject.clone()),
            ..Default::default()
        };
        self.materials.iter().filter(|m| narrowed.matches(m)).collect()
    }

    pub fn years(&self) -> Vec<i64> {
        year_facet(self.subject_materials())
    }

    pub fn semesters(&self) -> Vec<i64> {
        semester_facet(self.subject_materials())
    }

    pub fn select_course(&mut self, course: &str) -> Result<(), NavigationError> {
        if self.scope.is_none() {
            return Err(NavigationError::NoScope);
        }
        if !self.courses().iter().any(|c| c == course) {
            return Err(NavigationError::UnknownCourse(course.to_string()));
        }
        self.course = Some(course.to_string());
        self.subject = None;
        self.filter = ResultFilter::default();
        Ok(())
    }

    pub fn select_subject(&mut self, subject: &str) -> Result<(), NavigationError> {
        if self.scope.is_none() {
            return Err(NavigationError::NoScope);
        }
        if self.course.is_none() {
            return Err(NavigationError::NoCourseSelected);
        }
        if !self.subjects().iter().any(|s| s == subject) {
            return Err(NavigationError::UnknownSubject(subject.to_string()));
        }
        self.subject = Some(subject.to_string());
        self.filter = ResultFilter::default();
        Ok(())
    }

    fn filters_active(&self) -> Result<(), NavigationError> {
        match self.level() {
            Level::Results => Ok(()),
            Level::NoScope => Err(NavigationError::NoScope),
            Level::Courses | Level::Subjects => Err(NavigationError::NoSubjectSelected),
        }
    }

    /// `None` shows every type.
    pub fn set_type_filter(&mut self, kind: Option<MaterialType>) -> Result<(), NavigationError> {
        self.filters_active()?;
        self.filter.kind = kind;
        Ok(())
    }

    pub fn set_search(&mut self, text: &str) -> Result<(), NavigationError> {
        self.filters_active()?;
        self.filter.search = text.to_string();
        Ok(())
    }

    pub fn set_year(&mut self, year: Option<&str>) -> Result<(), NavigationError> {
        self.filters_active()?;
        self.filter.year = year.map(str::to_string);
        Ok(())
    }

    pub fn set_semester(&mut self, semester: Option<&str>) -> Result<(), NavigationError> {
        self.filters_active()?;
        self.filter.semester = semester.map(str::to_string);
        Ok(())
    }

    pub fn reset_filters(&mut self) {
        self.filter = ResultFilter::default();
    }

    pub fn clear_subject(&mut self) {
        self.subject = None;
        self.filter = ResultFilter::default();
    }

    pub fn clear_course(&mut self) {
        self.course = None;
        self.clear_subject();
    }

    pub fn exit_scope(&mut self) {
        self.generation += 1;
        self.scope = None;
        self.materials.clear();
        self.clear_course();
    }

    /// Step one level up and report where navigation ended.
    pub fn back(&mut self) -> Level {
        match self.level() {
            Level::Results => self.clear_subject(),
            Level::Subjects => self.clear_course(),
            Level::Courses | Level::NoScope => self.exit_scope(),
        }
        self.level()
    }

    pub fn view(&self) -> View<'_> {
        let Some(_) = &self.scope else {
            return View::NoScope;
        };
        let Some(course) = self.course.as_deref() else {
            return View::Courses(FacetChoices::from_items(self.courses()));
        };
        let Some(subject) = self.subject.as_deref() else {
            return View::Subjects {
                course,
                subjects: FacetChoices::from_items(self.subjects()),
            };
        };

        let in_subject = self.subject_materials();
        let results = if in_subject.is_empty() {
            ResultSet::Empty
        } else {
            let matches = self.filter.apply(in_subject.iter().copied());
            if matches.is_empty() {
                ResultSet::FilteredOut
            } else {
                ResultSet::Matches(matches)
            }
        };

        View::Results {
            course,
            subject,
            years: year_facet(in_subject.iter().copied()),
            semesters: semester_facet(in_subject.iter().copied()),
            filter: &self.filter,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::fixtures::{catalog, material};

    fn at_subject(course: &str, subject: &str) -> Navigator {
        let mut nav = Navigator::new();
        let ticket = nav.enter_scope("u1");
        nav.load(ticket, catalog()).unwrap();
        nav.select_course(course).unwrap();
        nav.select_subject(subject).unwrap();
        nav
    }

    fn result_ids(nav: &Navigator) -> Vec<String> {
        match nav.view() {
            View::Results {
                results: ResultSet::Matches(found),
                ..
            } => {
                let mut ids: Vec<String> = found.iter().map(|m| m.id.clone()).collect();
                ids.sort();
                ids
            }
            other => panic!("expected matches, got {:?}", other),
        }
    }

    #[test]
    fn test_no_scope_is_reported() {
        let mut nav = Navigator::new();
        assert_eq!(nav.view(), View::NoScope);
        assert_eq!(nav.select_course("BCA"), Err(NavigationError::NoScope));
        assert_eq!(nav.set_search("x"), Err(NavigationError::NoScope));
    }

    #[test]
    fn test_scope_excludes_other_universities() {
        let mut nav = Navigator::new();
        let ticket = nav.enter_scope("u2");
        nav.load(ticket, catalog()).unwrap();

        assert_eq!(nav.courses(), vec!["BCA".to_string()]);
        nav.select_course("BCA").unwrap();
        assert_eq!(nav.subjects(), vec!["Compilers".to_string()]);
    }

    #[test]
    fn test_structural_empty_course_level() {
        let mut nav = Navigator::new();
        let ticket = nav.enter_scope("u3");
        nav.load(ticket, catalog()).unwrap();
        assert_eq!(nav.view(), View::Courses(FacetChoices::Empty));
    }

    #[test]
    fn test_filters_require_subject() {
        let mut nav = Navigator::new();
        let ticket = nav.enter_scope("u1");
        nav.load(ticket, catalog()).unwrap();
        assert_eq!(
            nav.set_type_filter(Some(MaterialType::Notes)),
            Err(NavigationError::NoSubjectSelected)
        );
        assert_eq!(
            nav.select_subject("DBMS"),
            Err(NavigationError::NoCourseSelected)
        );

        nav.select_course("BCA").unwrap();
        assert_eq!(
            nav.set_year(Some("2024")),
            Err(NavigationError::NoSubjectSelected)
        );
        assert_eq!(
            nav.select_subject("Compilers"),
            Err(NavigationError::UnknownSubject("Compilers".to_string()))
        );
    }

    #[test]
    fn test_unknown_course_rejected_case_sensitively() {
        let mut nav = Navigator::new();
        let ticket = nav.enter_scope("u1");
        nav.load(ticket, catalog()).unwrap();
        assert!(nav.select_course("bca").is_ok());
        assert_eq!(
            nav.select_course("Bca"),
            Err(NavigationError::UnknownCourse("Bca".to_string()))
        );
    }

    #[test]
    fn test_result_filters() {
        let mut nav = at_subject("BCA", "Operating Systems");
        assert_eq!(nav.years(), vec![2024, 2023]);
        assert_eq!(nav.semesters(), vec![3]);
        assert_eq!(result_ids(&nav), vec!["m1", "m2", "m3"]);

        nav.set_type_filter(Some(MaterialType::QuestionPaper)).unwrap();
        assert_eq!(result_ids(&nav), vec!["m2"]);

        nav.set_type_filter(None).unwrap();
        nav.set_year(Some("2024")).unwrap();
        assert_eq!(result_ids(&nav), vec!["m1", "m3"]);

        nav.set_semester(Some("3")).unwrap();
        assert_eq!(result_ids(&nav), vec!["m1"]);
    }

    #[test]
    fn test_filtered_out_is_distinct_from_empty() {
        let mut nav = at_subject("BCA", "DBMS");
        nav.set_search("calculus").unwrap();

        match nav.view() {
            View::Results { results, .. } => assert_eq!(results, ResultSet::FilteredOut),
            other => panic!("unexpected view {:?}", other),
        }

        nav.reset_filters();
        assert_eq!(result_ids(&nav), vec!["m4"]);
    }

    #[test]
    fn test_back_resets_lower_filters() {
        let mut nav = at_subject("BCA", "Operating Systems");
        nav.set_search("notes").unwrap();
        nav.set_year(Some("2024")).unwrap();

        assert_eq!(nav.back(), Level::Subjects);
        assert!(nav.filter().is_default());

        nav.select_subject("DBMS").unwrap();
        assert!(nav.filter().is_default());
        assert_eq!(result_ids(&nav), vec!["m4"]);

        assert_eq!(nav.back(), Level::Subjects);
        assert_eq!(nav.back(), Level::Courses);
        assert_eq!(nav.back(), Level::NoScope);
        assert_eq!(nav.view(), View::NoScope);
    }

    #[test]
    fn test_narrow_then_widen_restores_courses() {
        let mut nav = Navigator::new();
        let ticket = nav.enter_scope("u1");
        nav.load(ticket, catalog()).unwrap();
        let before = nav.courses();

        nav.select_course("MCA").unwrap();
        assert_eq!(nav.level(), Level::Subjects);
        nav.clear_course();

        assert_eq!(nav.courses(), before);
        assert_eq!(nav.view(), View::Courses(FacetChoices::Items(before)));
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut nav = Navigator::new();
        let first = nav.enter_scope("u1");
        let second = nav.enter_scope("u2");

        nav.load(second, catalog()).unwrap();
        assert_eq!(nav.load(first, catalog()), Err(NavigationError::StaleLoad));
        assert_eq!(nav.scope(), Some("u2"));
        assert_eq!(nav.courses(), vec!["BCA".to_string()]);

        nav.exit_scope();
        assert_eq!(nav.load(second, catalog()), Err(NavigationError::NoScope));
    }

    #[test]
    fn test_reload_clears_vanished_selection() {
        let mut nav = at_subject("BCA", "DBMS");
        nav.set_search("dbms").unwrap();

        let ticket = nav.enter_scope("u1");
        nav.load(ticket, catalog()).unwrap();
        nav.select_course("BCA").unwrap();
        nav.select_subject("DBMS").unwrap();

        // Reload under the same ticket without the DBMS material
        let without_dbms: Vec<Material> = catalog().into_iter().filter(|m| m.id != "m4").collect();
        nav.load(ticket, without_dbms).unwrap();
        assert_eq!(nav.level(), Level::Subjects);
        assert!(nav.filter().is_default());

        let extra = material(
            "m8",
            "u1",
            "BCA",
            "DBMS",
            MaterialType::Video,
            2020,
            None,
        );
        let mut with_extra = catalog();
        with_extra.push(extra);
        nav.load(ticket, with_extra).unwrap();
        nav.select_subject("DBMS").unwrap();
        assert_eq!(result_ids(&nav), vec!["m4", "m8"]);
        assert_eq!(nav.semesters(), vec![4]);
    }
}
