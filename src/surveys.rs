use crate::db::{Answer, Question, SaveMode, Survey, SurveyDraft, SurveyStatus};
use crate::error::SurveyError;
use crate::startup::AppState;
use axum::{
    extract::{
        Extension, Json, Path,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

// Request/Response DTOs
#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAnswerRequest {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub answer_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SurveyResponse {
    pub id: i64,
    pub title: String,
    pub opens: NaiveDate,
    pub closes: NaiveDate,
    pub status: SurveyStatus,
    pub display: String,
}

impl SurveyResponse {
    fn new(survey: Survey, today: NaiveDate) -> Self {
        SurveyResponse {
            status: survey.status(today),
            display: survey.to_string(),
            id: survey.id,
            title: survey.title,
            opens: survey.opens,
            closes: survey.closes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub completed: Vec<SurveyResponse>,
    pub active: Vec<SurveyResponse>,
    pub upcoming: Vec<SurveyResponse>,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub id: i64,
    pub question: String,
    pub answers: Vec<AnswerResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_answers: Option<Vec<AnswerResponse>>,
}

impl From<Question> for QuestionResponse {
    fn from(question: Question) -> Self {
        QuestionResponse {
            id: question.id,
            question: question.question,
            answers: Vec::new(),
            winning_answers: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub id: i64,
    pub answer: String,
    pub votes: i32,
}

impl From<Answer> for AnswerResponse {
    fn from(answer: Answer) -> Self {
        AnswerResponse {
            id: answer.id,
            answer: answer.answer,
            votes: answer.votes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SurveyDetailResponse {
    #[serde(flatten)]
    pub survey: SurveyResponse,
    pub questions: Vec<QuestionResponse>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn answer_responses(answers: Vec<Answer>) -> Vec<AnswerResponse> {
    answers.into_iter().map(AnswerResponse::from).collect()
}

/// Home listing: every active survey, plus recently completed and soon to
/// open ones.
pub async fn home(
    Extension(app_state): Extension<AppState>,
) -> Result<impl IntoResponse, SurveyError> {
    let today = today();
    let store = &app_state.store;
    let completed_since = today
        .checked_sub_days(Days::new(app_state.home.completed_days))
        .unwrap_or(NaiveDate::MIN);
    let upcoming_until = today
        .checked_add_days(Days::new(app_state.home.upcoming_days))
        .unwrap_or(NaiveDate::MAX);

    let completed = store
        .surveys_near(SurveyStatus::Completed, today, completed_since)
        .await?
        .into_iter()
        .map(|s| SurveyResponse::new(s, today))
        .collect();

    let active = store
        .surveys_with_status(SurveyStatus::Active, today)
        .await?
        .into_iter()
        .map(|s| SurveyResponse::new(s, today))
        .collect();

    let upcoming = store
        .surveys_near(SurveyStatus::Upcoming, today, upcoming_until)
        .await?
        .into_iter()
        .map(|s| SurveyResponse::new(s, today))
        .collect();

    let response = HomeResponse {
        completed,
        active,
        upcoming,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Get a survey with its questions. Upcoming surveys are hidden; completed
/// ones also report each question's winning answers.
pub async fn survey_detail(
    Extension(app_state): Extension<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, SurveyError> {
    let Path(survey_id) = path?;
    let today = today();
    let store = &app_state.store;

    let survey = store
        .get_survey(survey_id)
        .await?
        .ok_or(SurveyError::SurveyNotFound)?;

    let status = survey.status(today);
    if status == SurveyStatus::Upcoming {
        return Err(SurveyError::SurveyNotFound);
    }

    let mut questions = Vec::new();
    for question in store.questions_for(survey_id).await? {
        let answers = store.answers_for(question.id).await?;
        let winning_answers = if status == SurveyStatus::Completed {
            Some(answer_responses(store.winning_answers(question.id).await?))
        } else {
            None
        };

        let mut response = QuestionResponse::from(question);
        response.answers = answer_responses(answers);
        response.winning_answers = winning_answers;
        questions.push(response);
    }

    let response = SurveyDetailResponse {
        survey: SurveyResponse::new(survey, today),
        questions,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Cast a vote for one answer of an active survey
pub async fn vote(
    Extension(app_state): Extension<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, SurveyError> {
    let Path(survey_id) = path?;
    let Json(payload) = payload?;
    let store = &app_state.store;

    let survey = store
        .get_survey(survey_id)
        .await?
        .ok_or(SurveyError::SurveyNotFound)?;

    if survey.status(today()) != SurveyStatus::Active {
        return Err(SurveyError::SurveyNotActive);
    }

    let answer = store
        .get_answer(payload.answer_id)
        .await?
        .ok_or(SurveyError::AnswerNotFound)?;

    // The answer must hang off one of this survey's questions.
    let owner = store.get_question(answer.question_id).await?;
    if owner.map(|q| q.survey_id) != Some(survey_id) {
        return Err(SurveyError::AnswerNotFound);
    }

    let answer = store
        .record_vote(answer.id)
        .await?
        .ok_or(SurveyError::AnswerNotFound)?;

    info!(survey_id, answer_id = answer.id, votes = answer.votes, "vote recorded");

    Ok((StatusCode::OK, Json(AnswerResponse::from(answer))))
}

pub async fn create_survey(
    Extension(app_state): Extension<AppState>,
    payload: Result<Json<SurveyDraft>, JsonRejection>,
) -> Result<impl IntoResponse, SurveyError> {
    let Json(payload) = payload?;
    let survey = app_state.store.save_survey(payload, SaveMode::Insert).await?;
    info!(survey_id = survey.id, "created survey {}", survey);

    Ok((StatusCode::CREATED, Json(SurveyResponse::new(survey, today()))))
}

/// Re-save an existing survey. No close-date default is applied here.
pub async fn update_survey(
    Extension(app_state): Extension<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<SurveyDraft>, JsonRejection>,
) -> Result<impl IntoResponse, SurveyError> {
    let Path(survey_id) = path?;
    let Json(payload) = payload?;
    let survey = app_state
        .store
        .save_survey(payload, SaveMode::Update(survey_id))
        .await?;

    Ok((StatusCode::OK, Json(SurveyResponse::new(survey, today()))))
}

pub async fn delete_survey(
    Extension(app_state): Extension<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, SurveyError> {
    let Path(survey_id) = path?;
    if !app_state.store.delete_survey(survey_id).await? {
        return Err(SurveyError::SurveyNotFound);
    }
    info!(survey_id, "deleted survey");

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Survey deleted"
        })),
    ))
}

pub async fn add_question(
    Extension(app_state): Extension<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CreateQuestionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, SurveyError> {
    let Path(survey_id) = path?;
    let Json(payload) = payload?;
    let store = &app_state.store;
    if store.get_survey(survey_id).await?.is_none() {
        return Err(SurveyError::SurveyNotFound);
    }

    let question = store.add_question(survey_id, &payload.question).await?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from(question))))
}

pub async fn delete_question(
    Extension(app_state): Extension<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, SurveyError> {
    let Path(question_id) = path?;
    if !app_state.store.delete_question(question_id).await? {
        return Err(SurveyError::QuestionNotFound);
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Question deleted"
        })),
    ))
}

pub async fn add_answer(
    Extension(app_state): Extension<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CreateAnswerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, SurveyError> {
    let Path(question_id) = path?;
    let Json(payload) = payload?;
    let store = &app_state.store;
    if store.get_question(question_id).await?.is_none() {
        return Err(SurveyError::QuestionNotFound);
    }

    let answer = store.add_answer(question_id, &payload.answer).await?;

    Ok((StatusCode::CREATED, Json(AnswerResponse::from(answer))))
}
