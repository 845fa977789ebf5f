use crate::db::connection::DbPool;
use crate::db::models::{Answer, Question, SaveMode, Survey, SurveyDraft, SurveyStatus};
use crate::db::repositories as repo;
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Persistence operations the HTTP layer relies on.
///
/// Implementations must enforce the schema constraints themselves: required
/// fields, column lengths, parent existence and cascading deletes.
#[async_trait]
pub trait SurveyStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Writes a survey. The close-date default is applied for
    /// [`SaveMode::Insert`] only.
    async fn save_survey(&self, draft: SurveyDraft, mode: SaveMode) -> Result<Survey, StoreError>;

    async fn get_survey(&self, survey_id: i64) -> Result<Option<Survey>, StoreError>;

    /// Surveys in `status` relative to `today`, ordered by open date.
    async fn surveys_with_status(
        &self,
        status: SurveyStatus,
        today: NaiveDate,
    ) -> Result<Vec<Survey>, StoreError>;

    /// Like [`SurveyStore::surveys_with_status`], limited to completed surveys
    /// that closed on or after `horizon` and upcoming surveys that open on or
    /// before it. Active surveys are not limited.
    async fn surveys_near(
        &self,
        status: SurveyStatus,
        today: NaiveDate,
        horizon: NaiveDate,
    ) -> Result<Vec<Survey>, StoreError>;

    async fn delete_survey(&self, survey_id: i64) -> Result<bool, StoreError>;

    async fn add_question(&self, survey_id: i64, question: &str) -> Result<Question, StoreError>;

    async fn get_question(&self, question_id: i64) -> Result<Option<Question>, StoreError>;

    async fn questions_for(&self, survey_id: i64) -> Result<Vec<Question>, StoreError>;

    async fn delete_question(&self, question_id: i64) -> Result<bool, StoreError>;

    async fn add_answer(&self, question_id: i64, answer: &str) -> Result<Answer, StoreError>;

    async fn get_answer(&self, answer_id: i64) -> Result<Option<Answer>, StoreError>;

    async fn answers_for(&self, question_id: i64) -> Result<Vec<Answer>, StoreError>;

    async fn winning_answers(&self, question_id: i64) -> Result<Vec<Answer>, StoreError>;

    /// Adds one vote atomically. `None` when the answer does not exist.
    async fn record_vote(&self, answer_id: i64) -> Result<Option<Answer>, StoreError>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl SurveyStore for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn save_survey(&self, draft: SurveyDraft, mode: SaveMode) -> Result<Survey, StoreError> {
        let draft = draft.prepare(mode);
        let survey = match mode {
            SaveMode::Insert => repo::insert_survey(&self.pool, &draft).await?,
            SaveMode::Update(survey_id) => {
                repo::update_survey(&self.pool, survey_id, &draft).await?
            }
        };
        Ok(survey)
    }

    async fn get_survey(&self, survey_id: i64) -> Result<Option<Survey>, StoreError> {
        Ok(repo::get_survey(&self.pool, survey_id).await?)
    }

    async fn surveys_with_status(
        &self,
        status: SurveyStatus,
        today: NaiveDate,
    ) -> Result<Vec<Survey>, StoreError> {
        Ok(repo::get_surveys_with_status(&self.pool, status, today).await?)
    }

    async fn surveys_near(
        &self,
        status: SurveyStatus,
        today: NaiveDate,
        horizon: NaiveDate,
    ) -> Result<Vec<Survey>, StoreError> {
        Ok(repo::get_surveys_near(&self.pool, status, today, horizon).await?)
    }

    async fn delete_survey(&self, survey_id: i64) -> Result<bool, StoreError> {
        Ok(repo::delete_survey(&self.pool, survey_id).await?)
    }

    async fn add_question(&self, survey_id: i64, question: &str) -> Result<Question, StoreError> {
        Ok(repo::add_question(&self.pool, survey_id, question).await?)
    }

    async fn get_question(&self, question_id: i64) -> Result<Option<Question>, StoreError> {
        Ok(repo::get_question(&self.pool, question_id).await?)
    }

    async fn questions_for(&self, survey_id: i64) -> Result<Vec<Question>, StoreError> {
        Ok(repo::get_survey_questions(&self.pool, survey_id).await?)
    }

    async fn delete_question(&self, question_id: i64) -> Result<bool, StoreError> {
        Ok(repo::delete_question(&self.pool, question_id).await?)
    }

    async fn add_answer(&self, question_id: i64, answer: &str) -> Result<Answer, StoreError> {
        Ok(repo::add_answer(&self.pool, question_id, answer).await?)
    }

    async fn get_answer(&self, answer_id: i64) -> Result<Option<Answer>, StoreError> {
        Ok(repo::get_answer(&self.pool, answer_id).await?)
    }

    async fn answers_for(&self, question_id: i64) -> Result<Vec<Answer>, StoreError> {
        Ok(repo::get_question_answers(&self.pool, question_id).await?)
    }

    async fn winning_answers(&self, question_id: i64) -> Result<Vec<Answer>, StoreError> {
        Ok(repo::get_winning_answers(&self.pool, question_id).await?)
    }

    async fn record_vote(&self, answer_id: i64) -> Result<Option<Answer>, StoreError> {
        Ok(repo::increment_votes(&self.pool, answer_id).await?)
    }
}
