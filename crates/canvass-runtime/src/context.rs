//! Visitor context for segment evaluation
//!
//! Rules are tested against a [`RuleContext`]: the visitor making the
//! request plus a catalog of survey definitions, which submission rules
//! need to know how a stored answer should be compared.

use canvass_core::{Answers, FieldType, SurveyDefinition};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Outcome of looking up a visitor's submission to a survey
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubmissionLookup<'a> {
    Missing,
    Found(&'a Answers),
    /// More than one submission; rules refuse to guess which one counts
    Multiple,
}

/// What rules may ask about the visitor behind a request
pub trait VisitorContext {
    fn is_authenticated(&self) -> bool;

    fn is_member_of(&self, group: &str) -> bool;

    /// Distinct articles carrying `tag` last visited within the inclusive
    /// window; open bounds are unbounded
    fn tag_visit_count(
        &self,
        tag: &str,
        date_from: Option<NaiveDateTime>,
        date_to: Option<NaiveDateTime>,
    ) -> u32;

    fn submission(&self, survey: &str) -> SubmissionLookup<'_>;
}

/// Lookup of survey definitions by slug
pub trait SurveyCatalog {
    fn survey(&self, slug: &str) -> Option<&SurveyDefinition>;

    /// Field type of question `label` in survey `slug`
    fn field_type(&self, slug: &str, label: &str) -> Option<FieldType> {
        self.survey(slug)?
            .question(label)
            .map(|question| question.field_type)
    }
}

impl SurveyCatalog for HashMap<String, SurveyDefinition> {
    fn survey(&self, slug: &str) -> Option<&SurveyDefinition> {
        self.get(slug)
    }
}

impl SurveyCatalog for [SurveyDefinition] {
    fn survey(&self, slug: &str) -> Option<&SurveyDefinition> {
        self.iter().find(|survey| survey.slug == slug)
    }
}

impl SurveyCatalog for Vec<SurveyDefinition> {
    fn survey(&self, slug: &str) -> Option<&SurveyDefinition> {
        self.as_slice().survey(slug)
    }
}

/// Visitor plus survey catalog
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub visitor: &'a dyn VisitorContext,
    pub catalog: &'a dyn SurveyCatalog,
}

impl<'a> RuleContext<'a> {
    /// Create a new rule context
    pub fn new(visitor: &'a dyn VisitorContext, catalog: &'a dyn SurveyCatalog) -> Self {
        Self { visitor, catalog }
    }
}

/// Session-backed visitor state
///
/// Tracks page visits per tag (most recent visit per article), group
/// memberships and survey submissions. Serializable so it can live in a
/// session store between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionVisitor {
    /// Authenticated user, `None` for anonymous visitors
    pub user: Option<String>,

    #[serde(default)]
    pub groups: HashSet<String>,

    /// tag -> article path -> last visit (UTC)
    #[serde(default)]
    pub tag_visits: HashMap<String, HashMap<String, NaiveDateTime>>,

    /// survey slug -> submitted answers
    #[serde(default)]
    pub submissions: HashMap<String, Vec<Answers>>,
}

impl SessionVisitor {
    /// Create an anonymous visitor
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Create a visitor logged in as `user`
    pub fn authenticated(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            ..Self::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }

    /// Record a visit to an article; only the latest visit per article is kept
    pub fn add_page_visit<I, S>(&mut self, path: &str, tags: I, at: NaiveDateTime)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self.tag_visits
                .entry(tag.into())
                .or_default()
                .insert(path.to_string(), at);
        }
    }

    pub fn record_submission(&mut self, survey: impl Into<String>, answers: Answers) {
        self.submissions.entry(survey.into()).or_default().push(answers);
    }
}

impl VisitorContext for SessionVisitor {
    fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn is_member_of(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    fn tag_visit_count(
        &self,
        tag: &str,
        date_from: Option<NaiveDateTime>,
        date_to: Option<NaiveDateTime>,
    ) -> u32 {
        let Some(visits) = self.tag_visits.get(tag) else {
            return 0;
        };
        let in_window = visits
            .values()
            .filter(|&&at| date_from.map_or(true, |from| from <= at))
            .filter(|&&at| date_to.map_or(true, |to| at <= to))
            .count();
        u32::try_from(in_window).unwrap_or(u32::MAX)
    }

    fn submission(&self, survey: &str) -> SubmissionLookup<'_> {
        match self.submissions.get(survey).map(Vec::as_slice) {
            None | Some([]) => SubmissionLookup::Missing,
            Some([only]) => SubmissionLookup::Found(only),
            Some(_) => SubmissionLookup::Multiple,
        }
    }
}
