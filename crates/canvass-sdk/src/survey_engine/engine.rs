//! Core SurveyEngine implementation

use super::types::{RenderedStep, StepErrors, StepMethod, StepOutcome, StepRequest, StepResponse};
use super::validator::{invalid_choices, RequiredFieldsValidator, StepValidator};
use crate::config::EngineConfig;
use crate::error::{Result, SdkError};
use canvass_core::{Answers, Segment, SurveyDefinition};
use canvass_parser::parse_definitions;
use canvass_runtime::{
    Page, RuleContext, RuntimeError, SegmentEvaluator, SkipLogicPaginator, SkipLogicValidator,
    SurveyResults, ValidationIssue, ValidationReport, VisitorContext,
};
use std::collections::HashMap;
use tracing::{debug, info};

/// Survey engine
pub struct SurveyEngine {
    surveys: HashMap<String, SurveyDefinition>,
    segments: HashMap<String, Segment>,
    validator: Box<dyn StepValidator>,
    evaluator: SegmentEvaluator,
    config: EngineConfig,
}

impl SurveyEngine {
    /// Create a new survey engine from configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::new_with_validator(config, Box::new(RequiredFieldsValidator))
    }

    /// Create a new survey engine with a custom step validator
    pub fn new_with_validator(
        config: EngineConfig,
        validator: Box<dyn StepValidator>,
    ) -> Result<Self> {
        let mut engine = Self {
            surveys: HashMap::new(),
            segments: HashMap::new(),
            validator,
            evaluator: SegmentEvaluator::new(),
            config,
        };

        let files: Vec<_> = engine
            .config
            .survey_files
            .iter()
            .chain(&engine.config.segment_files)
            .cloned()
            .collect();
        for path in files {
            let content = std::fs::read_to_string(&path)?;
            engine.load_definitions(&path.display().to_string(), &content)?;
        }

        let contents = std::mem::take(&mut engine.config.contents);
        for (id, content) in &contents {
            engine.load_definitions(id, content)?;
        }
        engine.config.contents = contents;

        if engine.config.validate_definitions {
            engine.validate()?;
        }

        info!(
            "✓ Survey engine ready: {} survey(s), {} segment(s)",
            engine.surveys.len(),
            engine.segments.len()
        );
        Ok(engine)
    }

    fn load_definitions(&mut self, source: &str, content: &str) -> Result<()> {
        let definitions = parse_definitions(content)?;
        debug!(
            "Loaded {} survey(s) and {} segment(s) from {}",
            definitions.surveys.len(),
            definitions.segments.len(),
            source
        );

        for survey in definitions.surveys {
            if self.surveys.contains_key(&survey.slug) {
                return Err(SdkError::ConfigError(format!(
                    "Duplicate survey '{}' in {}",
                    survey.slug, source
                )));
            }
            self.surveys.insert(survey.slug.clone(), survey);
        }
        for segment in definitions.segments {
            if self.segments.contains_key(&segment.name) {
                return Err(SdkError::ConfigError(format!(
                    "Duplicate segment '{}' in {}",
                    segment.name, source
                )));
            }
            self.segments.insert(segment.name.clone(), segment);
        }
        Ok(())
    }

    /// Run skip logic and segment validation over everything loaded
    fn validate(&self) -> Result<()> {
        let validator = SkipLogicValidator::new(&self.surveys);
        let mut report = ValidationReport::new();

        let mut slugs: Vec<&String> = self.surveys.keys().collect();
        slugs.sort();
        for slug in slugs {
            let survey = &self.surveys[slug];
            report.merge(validator.validate_survey(survey));

            let referenced = survey
                .segment
                .iter()
                .map(|name| (None, name))
                .chain(
                    survey
                        .questions
                        .iter()
                        .filter_map(|q| q.segment.as_ref().map(|name| (Some(q.label.as_str()), name))),
                );
            for (field, name) in referenced {
                if !self.segments.contains_key(name) {
                    report.push(ValidationIssue::new(
                        slug.as_str(),
                        field,
                        format!("Unknown segment '{}'", name),
                    ));
                }
            }
        }

        let mut names: Vec<&String> = self.segments.keys().collect();
        names.sort();
        for name in names {
            report.merge(validator.validate_segment(&self.segments[name]));
        }

        report.into_result().map_err(|err| match err {
            RuntimeError::InvalidDefinition(message) => SdkError::InvalidDefinition(message),
            other => other.into(),
        })
    }

    /// Look up a survey by slug
    pub fn survey(&self, slug: &str) -> Result<&SurveyDefinition> {
        self.surveys
            .get(slug)
            .ok_or_else(|| SdkError::SurveyNotFound(slug.to_string()))
    }

    /// Look up a segment by name
    pub fn segment(&self, name: &str) -> Result<&Segment> {
        self.segments
            .get(name)
            .ok_or_else(|| SdkError::SegmentNotFound(name.to_string()))
    }

    /// Slugs of all loaded surveys, sorted
    pub fn survey_slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.surveys.keys().map(String::as_str).collect();
        slugs.sort_unstable();
        slugs
    }

    /// Get configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Serve one request against a survey.
    ///
    /// A GET shows the requested page and starts the answers over. A POST
    /// submits the page shown before: it is rebuilt from the answers,
    /// validated, and either shown again with errors or accepted into the
    /// session. Accepted answers lead to the requested page, or finish the
    /// survey when nothing follows.
    ///
    /// A submitted value outside a question's choices is reported on the
    /// page it was submitted from, which is rebuilt from the session.
    ///
    /// A page number that is not a positive integer falls back to page 1.
    /// A page number past the end is treated as the submission of the last
    /// page.
    pub fn step(&self, request: StepRequest) -> Result<StepResponse> {
        let survey = self.survey(&request.survey)?;
        let empty = Answers::new();
        let (data, previous) = match request.method {
            StepMethod::Post => (&request.data, &request.session),
            StepMethod::Get => (&empty, &empty),
        };

        if request.method == StepMethod::Post {
            let errors = invalid_choices(&survey.questions, &request.data);
            if !errors.is_empty() {
                // page again from the accepted answers alone
                let paginator = SkipLogicPaginator::new(&survey.questions, &empty, previous)?;
                let submitted = paginator.submitted_page();
                debug!(
                    "Step {} of {} rejected: {} invalid choice(s)",
                    submitted.number(),
                    survey.slug,
                    errors.len()
                );
                return Ok(StepResponse {
                    outcome: render(&submitted, errors),
                    session: request.session.clone(),
                });
            }
        }

        let paginator = SkipLogicPaginator::new(&survey.questions, data, previous)?;

        let mut is_last_step = false;
        let requested = SkipLogicPaginator::parse_page_number(request.page.as_deref())
            .and_then(|number| paginator.page(number));
        let step = match requested {
            Ok(page) => page,
            Err(RuntimeError::InvalidPage(reason)) => {
                debug!("Invalid page for {}: {}, showing page 1", survey.slug, reason);
                paginator.page(1)?
            }
            Err(RuntimeError::EmptyPage { .. }) => {
                is_last_step = true;
                paginator.page(paginator.num_pages().max(1))?
            }
            Err(err) => return Err(err.into()),
        };

        if request.method == StepMethod::Get {
            self.trace_step(&survey.slug, "show", step.number());
            return Ok(StepResponse {
                outcome: render(&step, StepErrors::new()),
                session: Answers::new(),
            });
        }

        // the page being submitted
        let prev_step = if is_last_step {
            step
        } else {
            paginator.page(step.previous_page_number())?
        };

        let answers = paginator.answers();
        let errors = self.validator.validate(prev_step.questions(), &answers);
        if !errors.is_empty() {
            debug!(
                "Step {} of {} rejected: {} error(s)",
                prev_step.number(),
                survey.slug,
                errors.len()
            );
            return Ok(StepResponse {
                outcome: render(&prev_step, errors),
                session: request.session.clone(),
            });
        }

        let mut session = request.session.clone();
        for question in prev_step.questions() {
            if let Some(answer) = answers.get(&question.label) {
                session.insert(question.label.clone(), answer.clone());
            }
        }

        if prev_step.has_next() {
            self.trace_step(&survey.slug, "advance", step.number());
            return Ok(StepResponse {
                outcome: render(&step, StepErrors::new()),
                session,
            });
        }

        let redirect = prev_step.success(&survey.slug);
        self.trace_step(&survey.slug, "finish", prev_step.number());
        Ok(StepResponse {
            outcome: StepOutcome::Finish {
                redirect,
                submission: session,
            },
            session: Answers::new(),
        })
    }

    fn trace_step(&self, slug: &str, action: &str, number: usize) {
        if self.config.enable_tracing {
            info!("Survey {} {} page {}", slug, action, number);
        } else {
            debug!("Survey {} {} page {}", slug, action, number);
        }
    }

    /// Test a visitor against the named segment
    pub fn matches_segment(&self, name: &str, visitor: &dyn VisitorContext) -> Result<bool> {
        let segment = self.segment(name)?;
        let ctx = RuleContext::new(visitor, &self.surveys);
        Ok(self.evaluator.test_segment(segment, &ctx)?)
    }

    /// Surveys the visitor may take: those without a segment, and those
    /// whose segment the visitor matches. Sorted by slug.
    pub fn visible_surveys(&self, visitor: &dyn VisitorContext) -> Result<Vec<&SurveyDefinition>> {
        let mut visible = Vec::new();
        for slug in self.survey_slugs() {
            let survey = &self.surveys[slug];
            let shown = match &survey.segment {
                Some(name) => self.matches_segment(name, visitor)?,
                None => true,
            };
            if shown {
                visible.push(survey);
            }
        }
        Ok(visible)
    }

    /// Aggregate submitted answers of a survey
    pub fn results(
        &self,
        slug: &str,
        submissions: &[Answers],
        as_percentage: bool,
    ) -> Result<SurveyResults> {
        let survey = self.survey(slug)?;
        Ok(SurveyResults::tally(survey, submissions, as_percentage))
    }
}

fn render(page: &Page<'_>, errors: StepErrors) -> StepOutcome {
    StepOutcome::Render(RenderedStep {
        number: page.number(),
        questions: page.questions().to_vec(),
        has_next: page.has_next(),
        is_intermediate: page.possibly_has_next(),
        errors,
    })
}
