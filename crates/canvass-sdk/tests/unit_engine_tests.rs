//! Survey engine step flow and segment tests

mod common;

use canvass_sdk::{
    AnswerValue, Answers, Redirect, SdkError, SessionVisitor, StepOutcome, StepRequest,
    SurveyEngineBuilder,
};
use common::{rendered_labels, TestEngine, Visit};

const SKIP_SURVEY: &str = r#"
survey:
  slug: test-survey
  title: Test Survey
  thank_you_text: Thank you for taking the Test Survey
  questions:
    - title: Where should we go
      type: dropdown
      required: true
      branching:
        - choice: next
          action: next
        - choice: end
          action: end
        - choice: survey
          action: survey
          survey: another-test-survey
        - choice: question
          action: question
          question: 3
    - title: Your favourite animal
      type: singleline
      required: true
    - title: Your favourite actor
      type: singleline
      required: true
"#;

const ANOTHER_SURVEY: &str = r#"
survey:
  slug: another-test-survey
  title: Another Test Survey
  questions:
    - title: Your favourite actress
      type: singleline
      required: true
"#;

fn one(label: &str, value: &str) -> Answers {
    Answers::new().with(label, value)
}

// ========== Skip logic through the step controller ==========

#[test]
fn test_skip_logic_next_question() {
    let engine = TestEngine::new()
        .with_survey(SKIP_SURVEY)
        .with_survey(ANOTHER_SURVEY)
        .build();

    let (mut visit, first) = Visit::start(&engine, "test-survey");
    assert_eq!(rendered_labels(&first), vec!["where-should-we-go"]);
    assert!(first.rendered().unwrap().is_intermediate);

    let second = visit.post("2", one("where-should-we-go", "next"));
    assert_eq!(
        rendered_labels(&second),
        vec!["your-favourite-animal", "your-favourite-actor"]
    );
    let rendered = second.rendered().unwrap();
    assert_eq!(rendered.number, 2);
    assert!(!rendered.is_intermediate);
    assert_eq!(visit.session.len(), 1);

    let done = visit.post(
        "3",
        Answers::new()
            .with("your-favourite-animal", "python")
            .with("your-favourite-actor", "Steven Seagal ;)"),
    );
    match done.outcome {
        StepOutcome::Finish {
            redirect,
            submission,
        } => {
            assert_eq!(
                redirect,
                Redirect::Complete {
                    survey: "test-survey".to_string()
                }
            );
            assert_eq!(submission.len(), 3);
        }
        other => panic!("expected the survey to finish, got {:?}", other),
    }
    assert!(done.session.is_empty());
}

#[test]
fn test_skip_logic_to_end() {
    let engine = TestEngine::new()
        .with_survey(SKIP_SURVEY)
        .with_survey(ANOTHER_SURVEY)
        .build();

    let (mut visit, _) = Visit::start(&engine, "test-survey");
    let done = visit.post("2", one("where-should-we-go", "end"));

    // remaining required questions are not asked for
    assert!(done.is_finished());
    assert_eq!(done.redirect().map(Redirect::survey), Some("test-survey"));
}

#[test]
fn test_skip_logic_to_another_survey() {
    let engine = TestEngine::new()
        .with_survey(SKIP_SURVEY)
        .with_survey(ANOTHER_SURVEY)
        .build();

    let (mut visit, _) = Visit::start(&engine, "test-survey");
    let done = visit.post("2", one("where-should-we-go", "survey"));

    assert_eq!(
        done.redirect(),
        Some(&Redirect::Survey {
            survey: "another-test-survey".to_string()
        })
    );

    let next = engine
        .step(StepRequest::get("another-test-survey"))
        .unwrap();
    assert_eq!(rendered_labels(&next), vec!["your-favourite-actress"]);
}

#[test]
fn test_skip_logic_to_another_question() {
    let engine = TestEngine::new()
        .with_survey(SKIP_SURVEY)
        .with_survey(ANOTHER_SURVEY)
        .build();

    let (mut visit, _) = Visit::start(&engine, "test-survey");
    let second = visit.post("2", one("where-should-we-go", "question"));

    assert_eq!(rendered_labels(&second), vec!["your-favourite-actor"]);
}

const CHECKBOX_SURVEY: &str = r#"
survey:
  slug: checkbox-survey
  title: Checkbox Survey
  questions:
    - title: Where should we go
      type: checkbox
      required: true
      branching:
        - choice: ""
          action: next
        - choice: ""
          action: end
    - title: Your favourite animal
      type: singleline
      required: true
    - title: Your favourite actor
      type: singleline
      required: true
"#;

#[test]
fn test_skip_logic_checkbox_with_data() {
    let engine = TestEngine::new().with_survey(CHECKBOX_SURVEY).build();

    let (mut visit, _) = Visit::start(&engine, "checkbox-survey");
    let second = visit.post("2", one("where-should-we-go", "on"));
    assert_eq!(
        rendered_labels(&second),
        vec!["your-favourite-animal", "your-favourite-actor"]
    );

    let done = visit.post(
        "3",
        Answers::new()
            .with("your-favourite-animal", "python")
            .with("your-favourite-actor", "Steven Seagal ;)"),
    );
    assert!(done.is_finished());
}

#[test]
fn test_skip_logic_checkbox_no_data() {
    let engine = TestEngine::new().with_survey(CHECKBOX_SURVEY).build();

    let (mut visit, _) = Visit::start(&engine, "checkbox-survey");
    // an unchecked box sends nothing; only the form token arrives
    let done = visit.post("2", one("csrf", "dummy"));

    match done.outcome {
        StepOutcome::Finish { submission, .. } => {
            assert_eq!(
                submission.get("where-should-we-go").map(ToString::to_string),
                Some("off".to_string())
            );
            assert!(!submission.contains("csrf"));
        }
        other => panic!("expected the survey to finish, got {:?}", other),
    }
}

#[test]
fn test_missed_required_question_shows_page_again() {
    let engine = TestEngine::new()
        .with_survey(
            r#"
survey:
  slug: checkbox-jump
  title: Checkbox Jump
  questions:
    - title: Where should we go
      type: checkbox
      required: true
      branching:
        - choice: ""
          action: question
          question: 3
        - choice: ""
          action: survey
          survey: another-test-survey
    - title: Your favourite animal
      type: singleline
      required: true
    - title: Your favourite actor
      type: singleline
      required: true
"#,
        )
        .with_survey(ANOTHER_SURVEY)
        .build();

    let (mut visit, _) = Visit::start(&engine, "checkbox-jump");
    let second = visit.post("2", one("where-should-we-go", "on"));
    assert_eq!(rendered_labels(&second), vec!["your-favourite-actor"]);

    let again = visit.post("3", one("your-favourite-actor", ""));
    assert_eq!(rendered_labels(&again), vec!["your-favourite-actor"]);
    let rendered = again.rendered().unwrap();
    assert_eq!(
        rendered.errors["your-favourite-actor"],
        vec!["This field is required."]
    );
    // the answers accepted so far are kept
    assert!(visit.session.contains("where-should-we-go"));

    let done = visit.post("3", one("your-favourite-actor", "Nicolas Cage"));
    assert!(done.is_finished());
}

// ========== Page parameter handling ==========

const MULTI_STEP: &str = r#"
survey:
  slug: multi-step
  title: Multi Step
  questions:
    - title: Your favourite animal
      type: singleline
      required: true
    - title: Your favourite actor
      type: singleline
      required: true
"#;

#[test]
fn test_multi_step_one_question_per_page() {
    let engine = TestEngine::new().with_survey(MULTI_STEP).build();

    let (mut visit, first) = Visit::start(&engine, "multi-step");
    assert_eq!(rendered_labels(&first), vec!["your-favourite-animal"]);

    let second = visit.post("2", one("your-favourite-animal", "python"));
    assert_eq!(rendered_labels(&second), vec!["your-favourite-actor"]);

    let done = visit.post("3", one("your-favourite-actor", "Steven Seagal ;)"));
    assert!(done.is_finished());
}

#[test]
fn test_bad_page_parameter_shows_first_page() {
    let engine = TestEngine::new().with_survey(MULTI_STEP).build();

    for page in ["abc", "0", "-3"] {
        let response = engine
            .step(StepRequest::get("multi-step").with_page(page))
            .unwrap();
        assert_eq!(rendered_labels(&response), vec!["your-favourite-animal"]);
    }
}

#[test]
fn test_can_submit_after_validation_error() {
    let engine = TestEngine::new()
        .with_survey(
            r#"
survey:
  slug: single
  title: Single
  questions:
    - title: Your favourite animal
      type: singleline
      required: true
"#,
        )
        .build();

    let rejected = engine
        .step(StepRequest::post("single", Answers::new()).with_page("2"))
        .unwrap();
    assert!(rejected.rendered().unwrap().errors.contains_key("your-favourite-animal"));

    let done = engine
        .step(StepRequest::post("single", one("your-favourite-animal", "python")).with_page("2"))
        .unwrap();
    assert!(done.is_finished());
}

#[test]
fn test_get_resets_session() {
    let engine = TestEngine::new().with_survey(MULTI_STEP).build();

    let response = engine
        .step(StepRequest::get("multi-step").with_session(one("your-favourite-animal", "cat")))
        .unwrap();
    assert!(response.session.is_empty());
}

#[test]
fn test_invalid_choice_shows_page_again() {
    let engine = TestEngine::new()
        .with_survey(SKIP_SURVEY)
        .with_survey(ANOTHER_SURVEY)
        .build();

    let response = engine
        .step(
            StepRequest::post("test-survey", one("where-should-we-go", "nowhere")).with_page("2"),
        )
        .unwrap();

    let rendered = response.rendered().unwrap();
    assert_eq!(rendered.number, 1);
    assert_eq!(rendered.labels(), vec!["where-should-we-go"]);
    assert_eq!(
        rendered.errors["where-should-we-go"],
        vec!["Select a valid choice. nowhere is not one of the available choices."]
    );
    assert!(response.session.is_empty());
}

#[test]
fn test_invalid_choice_after_a_jump() {
    let engine = TestEngine::new()
        .with_survey(SKIP_SURVEY)
        .with_survey(ANOTHER_SURVEY)
        .build();

    let (mut visit, _) = Visit::start(&engine, "test-survey");
    visit.post("2", one("where-should-we-go", "question"));

    // a blank branching answer on a later page keeps the jump in place
    let again = visit.post("3", one("where-should-we-go", ""));
    assert_eq!(rendered_labels(&again), vec!["your-favourite-actor"]);
    assert_eq!(
        again.rendered().unwrap().errors["where-should-we-go"],
        vec!["This field is required."]
    );
    assert_eq!(
        visit.session.get("where-should-we-go").map(ToString::to_string),
        Some("question".to_string())
    );
}

#[test]
fn test_unknown_choice_in_session_is_an_error() {
    let engine = TestEngine::new()
        .with_survey(SKIP_SURVEY)
        .with_survey(ANOTHER_SURVEY)
        .build();

    let result = engine.step(
        StepRequest::post("test-survey", one("your-favourite-actor", "Nicolas Cage"))
            .with_page("3")
            .with_session(one("where-should-we-go", "nowhere")),
    );
    assert!(matches!(result, Err(SdkError::RuntimeError(_))));
}

const FRUIT_SURVEY: &str = r#"
survey:
  slug: fruit
  title: Fruit
  questions:
    - title: Fruits
      type: checkboxes
      required: true
      choices: [apple, pear]
    - title: Name
      type: singleline
      required: true
"#;

#[test]
fn test_required_checkbox_group_left_empty() {
    let engine = TestEngine::new().with_survey(FRUIT_SURVEY).build();

    let (mut visit, first) = Visit::start(&engine, "fruit");
    assert_eq!(rendered_labels(&first), vec!["fruits"]);

    // an empty group submits nothing
    let again = visit.post("2", Answers::new());
    assert_eq!(rendered_labels(&again), vec!["fruits"]);
    assert_eq!(
        again.rendered().unwrap().errors["fruits"],
        vec!["This field is required."]
    );
    assert!(visit.session.is_empty());

    let second = visit.post("2", Answers::new().with("fruits", vec!["apple", "pear"]));
    assert_eq!(rendered_labels(&second), vec!["name"]);

    let done = visit.post("3", one("name", "Sam"));
    match done.outcome {
        StepOutcome::Finish { submission, .. } => {
            assert_eq!(
                submission.get("fruits").map(ToString::to_string),
                Some("apple, pear".to_string())
            );
        }
        other => panic!("expected the survey to finish, got {:?}", other),
    }
}

#[test]
fn test_optional_checkbox_group_left_empty_is_not_tallied() {
    let engine = TestEngine::new()
        .with_survey(&FRUIT_SURVEY.replacen("required: true", "required: false", 1))
        .build();

    let (mut visit, _) = Visit::start(&engine, "fruit");
    visit.post("2", Answers::new());
    let done = visit.post("3", one("name", "Sam"));

    let StepOutcome::Finish { submission, .. } = done.outcome else {
        panic!("expected the survey to finish");
    };
    assert_eq!(submission.get("fruits"), Some(&AnswerValue::List(Vec::new())));

    let results = engine.results("fruit", &[submission], false).unwrap();
    assert!(results.question("Fruits").is_none());
    assert_eq!(results.question("Name").unwrap().answers.get("Sam"), Some(&1));
}

#[test]
fn test_unknown_survey() {
    let engine = TestEngine::new().with_survey(MULTI_STEP).build();

    assert!(matches!(
        engine.step(StepRequest::get("missing")),
        Err(SdkError::SurveyNotFound(_))
    ));
}

// ========== Definition validation ==========

#[test]
fn test_invalid_skip_logic_rejected_at_build() {
    let result = SurveyEngineBuilder::new()
        .add_content("bad", SKIP_SURVEY)
        .build();

    // the linked survey is not loaded
    match result {
        Err(SdkError::InvalidDefinition(message)) => {
            assert!(message.contains("another-test-survey"));
        }
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("definitions should be rejected"),
    }

    let engine = SurveyEngineBuilder::new()
        .add_content("bad", SKIP_SURVEY)
        .validate_definitions(false)
        .build();
    assert!(engine.is_ok());
}

// ========== Segments ==========

const EDITORS: &str = r#"
segment:
  name: editors
  rules:
    - type: logged_in
      is_logged_in: true
    - type: group_membership
      group: editors
    - type: combination
      body:
        - type: Rule
          value: UserIsLoggedInRule_0
        - type: Operator
          value: and
        - type: Rule
          value: GroupMembershipRule_0
"#;

const EDITORS_ONLY: &str = r#"
survey:
  slug: editors-only
  title: Editors Only
  segment: editors
  questions:
    - title: Favourite section
      type: singleline
"#;

#[test]
fn test_segment_matching_and_visibility() {
    let engine = TestEngine::new()
        .with_survey(MULTI_STEP)
        .with_survey(EDITORS_ONLY)
        .with_segment(EDITORS)
        .build();

    let editor = SessionVisitor::authenticated("ed").with_group("editors");
    let reader = SessionVisitor::authenticated("rita");

    assert!(engine.matches_segment("editors", &editor).unwrap());
    assert!(!engine.matches_segment("editors", &reader).unwrap());
    assert!(matches!(
        engine.matches_segment("admins", &reader),
        Err(SdkError::SegmentNotFound(_))
    ));

    let slugs = |visitor: &SessionVisitor| -> Vec<String> {
        engine
            .visible_surveys(visitor)
            .unwrap()
            .into_iter()
            .map(|survey| survey.slug.clone())
            .collect()
    };
    assert_eq!(slugs(&editor), vec!["editors-only", "multi-step"]);
    assert_eq!(slugs(&reader), vec!["multi-step"]);
}

#[test]
fn test_unknown_segment_reference_rejected() {
    let result = SurveyEngineBuilder::new()
        .add_content("orphan", EDITORS_ONLY)
        .build();

    assert!(matches!(result, Err(SdkError::InvalidDefinition(_))));
}

#[test]
fn test_results_for_survey() {
    let engine = TestEngine::new().with_survey(MULTI_STEP).build();
    let submissions = vec![
        one("your-favourite-animal", "cat"),
        one("your-favourite-animal", "cat"),
        one("your-favourite-animal", "dog"),
    ];

    let results = engine.results("multi-step", &submissions, false).unwrap();
    let animal = results.question("Your favourite animal").unwrap();
    assert_eq!(animal.answers.get("cat"), Some(&2));
    assert_eq!(animal.total(), 3);
}

// ========== Files and serialization ==========

#[test]
fn test_engine_from_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let survey_path = dir.path().join("editors-only.yaml");
    let segment_path = dir.path().join("editors.yaml");
    std::fs::write(&survey_path, EDITORS_ONLY)?;
    std::fs::write(&segment_path, EDITORS)?;

    let engine = SurveyEngineBuilder::new()
        .add_survey_file(&survey_path)
        .add_segment_file(&segment_path)
        .build()?;

    assert_eq!(engine.survey_slugs(), vec!["editors-only"]);
    assert!(engine.segment("editors").is_ok());
    Ok(())
}

#[test]
fn test_step_response_serializes_outcome() -> anyhow::Result<()> {
    let engine = TestEngine::new().with_survey(MULTI_STEP).build();

    let first = engine.step(StepRequest::get("multi-step"))?;
    let json = serde_json::to_value(&first)?;
    assert_eq!(json["outcome"]["outcome"], "render");
    assert_eq!(json["outcome"]["number"], 1);

    let done = engine.step(
        StepRequest::post("multi-step", one("your-favourite-animal", "cat")).with_page("2"),
    )?;
    // page 2 still has the actor question
    assert!(!done.is_finished());
    Ok(())
}
