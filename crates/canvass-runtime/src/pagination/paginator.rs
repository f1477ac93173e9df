//! Skip-logic paginator

use crate::error::{Result, RuntimeError};
use crate::pagination::page::Page;
use canvass_core::{AnswerValue, Answers, BranchAction, FieldType, Question};
use std::collections::HashMap;
use tracing::debug;

/// Sentinel recorded for an in-range single checkbox the browser did not submit
const BLANK_CHECKBOX: &str = "off";

/// Answer recorded for an unsubmitted checkbox field: `"off"` for a
/// single box, no selected options for a group
fn blank_checkbox(field_type: FieldType) -> AnswerValue {
    match field_type {
        FieldType::Checkboxes => AnswerValue::List(Vec::new()),
        _ => AnswerValue::from(BLANK_CHECKBOX),
    }
}

/// Which answer map a lookup reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnswerSource {
    /// Answers accepted on an earlier step
    Previous,
    /// Answers of this request, then the backfill
    Current,
}

/// Pages a survey according to its page breaks and branching.
///
/// Built fresh for every request from the survey's questions, the answers
/// just submitted and the answers accepted on the step before. All
/// navigation values are computed once, in [`SkipLogicPaginator::new`].
///
/// Checkboxes on the page being submitted that are missing from the new
/// answers are recorded in a separate backfill map, as `"off"` for a
/// single checkbox and as an empty selection for a checkbox group
/// ([`SkipLogicPaginator::backfilled`]); the caller's maps are not
/// modified.
#[derive(Debug)]
pub struct SkipLogicPaginator<'a> {
    questions: &'a [Question],
    new_answers: &'a Answers,
    previous_answers: &'a Answers,
    backfill: Answers,
    positions: HashMap<&'a str, usize>,
    page_breaks: Vec<usize>,
    last_question_previous_page: Option<usize>,
    first_question_index: usize,
    current_page: usize,
    last_question_index: usize,
    next_question_index: usize,
    next_page: usize,
    previous_page: usize,
}

impl<'a> SkipLogicPaginator<'a> {
    /// Create a paginator over `questions`, which must be ordered by
    /// strictly increasing `sort_order` and carry unique labels.
    ///
    /// Fails if an answered branching question selects no branch rule or
    /// jumps to a question that does not exist.
    pub fn new(
        questions: &'a [Question],
        new_answers: &'a Answers,
        previous_answers: &'a Answers,
    ) -> Result<Self> {
        let positions = Self::index_labels(questions)?;
        let page_breaks = Self::compute_page_breaks(questions);

        let mut paginator = Self {
            questions,
            new_answers,
            previous_answers,
            backfill: Answers::new(),
            positions,
            page_breaks,
            last_question_previous_page: None,
            first_question_index: 0,
            current_page: 1,
            last_question_index: 0,
            next_question_index: 0,
            next_page: 1,
            previous_page: 1,
        };

        paginator.check_branch_answers()?;
        paginator.resolve_navigation()?;

        debug!(
            page_breaks = ?paginator.page_breaks,
            current_page = paginator.current_page,
            next_page = paginator.next_page,
            previous_page = paginator.previous_page,
            backfilled = paginator.backfill.len(),
            "Paginator ready"
        );

        Ok(paginator)
    }

    /// Map labels to positions, checking labels and ordering
    fn index_labels(questions: &'a [Question]) -> Result<HashMap<&'a str, usize>> {
        let mut positions = HashMap::with_capacity(questions.len());

        for (index, question) in questions.iter().enumerate() {
            if positions.insert(question.label.as_str(), index).is_some() {
                return Err(RuntimeError::DuplicateLabel(question.label.clone()));
            }
            if index > 0 && questions[index - 1].sort_order >= question.sort_order {
                return Err(RuntimeError::UnorderedQuestions {
                    label: question.label.clone(),
                    sort_order: question.sort_order,
                });
            }
        }

        Ok(positions)
    }

    /// Offsets at which pages start, plus the question count
    fn compute_page_breaks(questions: &[Question]) -> Vec<usize> {
        let mut breaks: Vec<usize> = questions
            .iter()
            .enumerate()
            .filter(|(_, q)| q.has_branching() || q.page_break)
            .map(|(i, _)| i + 1)
            .collect();

        if breaks.is_empty() {
            // one question per page
            return (0..=questions.len()).collect();
        }

        breaks.insert(0, 0);
        if breaks.last() != Some(&questions.len()) {
            breaks.push(questions.len());
        }
        breaks
    }

    /// Every answered branching question must select a rule, and jumps
    /// must land on an existing question
    fn check_branch_answers(&self) -> Result<()> {
        for question in self.questions.iter().filter(|q| q.has_branching()) {
            let answers = [
                self.new_answers.get(&question.label),
                self.previous_answers.get(&question.label),
            ];
            for answer in answers.into_iter().flatten() {
                if let Some(target) = self.resolve_jump(question, answer)? {
                    debug!(label = %question.label, target, "Branch resolves to a jump");
                }
            }
        }
        Ok(())
    }

    fn resolve_navigation(&mut self) -> Result<()> {
        let num_pages = self.num_pages();

        self.last_question_previous_page = self
            .previous_answers
            .labels()
            .filter_map(|label| self.positions.get(label).copied())
            .max();

        self.first_question_index = match self.last_question_previous_page {
            Some(index) => self.next_index_from(index, AnswerSource::Previous)?,
            None => 0,
        };

        let start = self
            .page_breaks
            .iter()
            .rposition(|&offset| offset <= self.first_question_index)
            .unwrap_or(0);
        // previous answers may already reach the end of the survey
        self.current_page = (start + 1).min(num_pages.max(1));

        self.last_question_index = self
            .page_breaks
            .get(self.current_page)
            .copied()
            .unwrap_or(0)
            .saturating_sub(1);

        self.backfill = self.missing_checkboxes();

        self.next_question_index = if self.has_answers() {
            self.next_index_from(self.last_question_index, AnswerSource::Current)?
        } else {
            0
        };

        self.next_page = self
            .page_breaks
            .iter()
            .position(|&offset| offset > self.next_question_index)
            .unwrap_or(num_pages)
            .max(1);

        self.previous_page = match self.last_question_previous_page {
            Some(index) => self
                .page_breaks
                .iter()
                .position(|&offset| offset > index)
                .unwrap_or(num_pages)
                .max(1),
            None => 1,
        };

        Ok(())
    }

    /// Checkboxes of the current page absent from the new answers
    fn missing_checkboxes(&self) -> Answers {
        let range = self.first_question_index..=self.last_question_index;
        self.questions
            .get(range)
            .unwrap_or(&[])
            .iter()
            .filter(|q| q.field_type.omits_when_blank() && !self.new_answers.contains(&q.label))
            .map(|q| (q.label.clone(), blank_checkbox(q.field_type)))
            .collect()
    }

    /// Index of the question that follows `index`, given its answer
    fn next_index_from(&self, index: usize, source: AnswerSource) -> Result<usize> {
        let Some(question) = self.questions.get(index) else {
            return Ok(index + 1);
        };
        let Some(answer) = self.lookup(&question.label, source) else {
            return Ok(index + 1);
        };

        if question.has_branching() {
            if let Some(target) = self.resolve_jump(question, answer)? {
                return Ok(target);
            }
        }
        Ok(index + 1)
    }

    /// Position of the jump target selected by `answer`, if it selects one
    fn resolve_jump(&self, question: &Question, answer: &AnswerValue) -> Result<Option<usize>> {
        let action = question
            .branch_action(answer)
            .ok_or_else(|| RuntimeError::UnknownChoice {
                label: question.label.clone(),
                answer: answer.to_string(),
            })?;

        let BranchAction::JumpToQuestion { question: stored } = action else {
            return Ok(None);
        };

        action
            .target_sort_order()
            .and_then(|sort_order| self.questions.iter().position(|q| q.sort_order == sort_order))
            .map(Some)
            .ok_or_else(|| RuntimeError::UnknownQuestion {
                label: question.label.clone(),
                target: *stored,
            })
    }

    fn lookup(&self, label: &str, source: AnswerSource) -> Option<&AnswerValue> {
        match source {
            AnswerSource::Previous => self.previous_answers.get(label),
            AnswerSource::Current => self
                .new_answers
                .get(label)
                .or_else(|| self.backfill.get(label)),
        }
    }

    fn has_answers(&self) -> bool {
        !self.new_answers.is_empty() || !self.backfill.is_empty()
    }

    /// Answer to `label` from this request, including backfilled checkboxes
    pub fn answer(&self, label: &str) -> Option<&AnswerValue> {
        self.lookup(label, AnswerSource::Current)
    }

    /// New answers merged with the backfill
    pub fn answers(&self) -> Answers {
        self.new_answers.merged_with(&self.backfill)
    }

    /// Checkbox answers filled in for boxes the browser did not submit
    pub fn backfilled(&self) -> &Answers {
        &self.backfill
    }

    pub fn questions(&self) -> &'a [Question] {
        self.questions
    }

    pub fn page_breaks(&self) -> &[usize] {
        &self.page_breaks
    }

    pub fn num_pages(&self) -> usize {
        self.page_breaks.len().saturating_sub(1)
    }

    /// Page holding the first question after the previous step
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// First question of the page being submitted
    pub fn first_question_index(&self) -> usize {
        self.first_question_index
    }

    /// Last question of the page being submitted
    pub fn last_question_index(&self) -> usize {
        self.last_question_index
    }

    /// Highest position answered on the previous step, if any
    pub fn last_question_previous_page(&self) -> Option<usize> {
        self.last_question_previous_page
    }

    /// First question to show after the page being submitted
    pub fn next_question_index(&self) -> usize {
        self.next_question_index
    }

    pub fn next_page(&self) -> usize {
        self.next_page
    }

    pub fn previous_page(&self) -> usize {
        self.previous_page
    }

    /// Read the `p` request parameter. Absent means page 1.
    pub fn parse_page_number(raw: Option<&str>) -> Result<usize> {
        let Some(raw) = raw else {
            return Ok(1);
        };
        let number: usize = raw
            .trim()
            .parse()
            .map_err(|_| RuntimeError::InvalidPage(format!("'{}' is not an integer", raw)))?;
        if number < 1 {
            return Err(RuntimeError::InvalidPage(
                "page number is less than 1".to_string(),
            ));
        }
        Ok(number)
    }

    fn validate_number(&self, number: usize) -> Result<usize> {
        if number < 1 {
            return Err(RuntimeError::InvalidPage(
                "page number is less than 1".to_string(),
            ));
        }
        let allow_empty_first_page = number == 1 && self.questions.is_empty();
        if number > self.num_pages() && !allow_empty_first_page {
            return Err(RuntimeError::EmptyPage {
                requested: number,
                num_pages: self.num_pages(),
            });
        }
        Ok(number)
    }

    /// The page the new answers are submitted from: the questions that
    /// follow the previous answers, up to the next page break. Depends on
    /// the previous answers only.
    pub fn submitted_page(&self) -> Page<'_> {
        let questions = self
            .questions
            .get(self.first_question_index..=self.last_question_index)
            .unwrap_or(&[]);
        Page::new(questions, self.current_page, self)
    }

    /// Questions shown on page `number`.
    ///
    /// Without answers this is the plain slice between two page breaks.
    /// When `number` is the page just submitted, the same questions are
    /// rebuilt so errors can be shown on them. Otherwise the page starts
    /// at the question the branching leads to, and takes the number of
    /// the page that question falls in.
    pub fn page(&self, number: usize) -> Result<Page<'_>> {
        let number = self.validate_number(number)?;
        if self.questions.is_empty() {
            return Ok(Page::new(&[], number, self));
        }

        let (bottom, top, number) = if !self.has_answers() {
            (self.page_breaks[number - 1], self.page_breaks[number], number)
        } else if self.previous_page == number || self.current_page == number {
            debug!(number, "Rebuilding submitted page");
            (
                self.first_question_index,
                self.last_question_index + 1,
                number,
            )
        } else {
            let top = self.page_breaks[self.next_page];
            (self.next_question_index.min(top), top, self.next_page)
        };

        let questions = self.questions.get(bottom..top).unwrap_or(&[]);
        Ok(Page::new(questions, number, self))
    }
}
