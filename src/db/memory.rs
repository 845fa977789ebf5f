use crate::db::models::{
    Answer, Question, SaveMode, Survey, SurveyDraft, SurveyStatus, TEXT_MAX_CHARS,
    TITLE_MAX_CHARS, winning_answers,
};
use crate::db::store::SurveyStore;
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// In-process store with the same constraints as the Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    surveys: BTreeMap<i64, Survey>,
    questions: BTreeMap<i64, Question>,
    answers: BTreeMap<i64, Answer>,
    survey_seq: i64,
    question_seq: i64,
    answer_seq: i64,
}

fn next_id(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

fn require<T>(value: Option<T>, table: &str, column: &str) -> Result<T, StoreError> {
    value.ok_or_else(|| {
        StoreError::Integrity(format!(
            "null value in column \"{column}\" of relation \"{table}\" \
             violates not-null constraint"
        ))
    })
}

fn check_len(value: &str, max: usize) -> Result<(), StoreError> {
    if value.chars().count() > max {
        return Err(StoreError::ValueTooLong(format!(
            "value too long for type character varying({max})"
        )));
    }
    Ok(())
}

fn missing_parent(table: &str, column: &str) -> StoreError {
    StoreError::Integrity(format!(
        "insert or update on table \"{table}\" violates foreign key constraint \
         \"{table}_{column}_fkey\""
    ))
}

impl Tables {
    fn delete_question_cascade(&mut self, question_id: i64) -> bool {
        let removed = self.questions.remove(&question_id).is_some();
        if removed {
            self.answers.retain(|_, a| a.question_id != question_id);
        }
        removed
    }
}

#[async_trait]
impl SurveyStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn save_survey(&self, draft: SurveyDraft, mode: SaveMode) -> Result<Survey, StoreError> {
        let mut tables = self.tables.lock().await;
        // An UPDATE that matches no row never reaches the column constraints.
        if let SaveMode::Update(id) = mode {
            if !tables.surveys.contains_key(&id) {
                return Err(StoreError::NotFound);
            }
        }

        let draft = draft.prepare(mode);
        let title = require(draft.title, "surveys", "title")?;
        check_len(&title, TITLE_MAX_CHARS)?;
        let opens = require(draft.opens, "surveys", "opens")?;
        let closes = require(draft.closes, "surveys", "closes")?;

        let id = match mode {
            SaveMode::Insert => next_id(&mut tables.survey_seq),
            SaveMode::Update(id) => id,
        };

        let survey = Survey {
            id,
            title,
            opens,
            closes,
        };
        tables.surveys.insert(id, survey.clone());
        Ok(survey)
    }

    async fn get_survey(&self, survey_id: i64) -> Result<Option<Survey>, StoreError> {
        Ok(self.tables.lock().await.surveys.get(&survey_id).cloned())
    }

    async fn surveys_with_status(
        &self,
        status: SurveyStatus,
        today: NaiveDate,
    ) -> Result<Vec<Survey>, StoreError> {
        let tables = self.tables.lock().await;
        let mut surveys: Vec<Survey> = tables
            .surveys
            .values()
            .filter(|s| s.status(today) == status)
            .cloned()
            .collect();
        surveys.sort_by_key(|s| (s.opens, s.id));
        Ok(surveys)
    }

    async fn surveys_near(
        &self,
        status: SurveyStatus,
        today: NaiveDate,
        horizon: NaiveDate,
    ) -> Result<Vec<Survey>, StoreError> {
        let mut surveys = self.surveys_with_status(status, today).await?;
        surveys.retain(|s| status.within(s, horizon));
        Ok(surveys)
    }

    async fn delete_survey(&self, survey_id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.surveys.remove(&survey_id).is_none() {
            return Ok(false);
        }

        let owned: Vec<i64> = tables
            .questions
            .values()
            .filter(|q| q.survey_id == survey_id)
            .map(|q| q.id)
            .collect();
        for question_id in owned {
            tables.delete_question_cascade(question_id);
        }
        Ok(true)
    }

    async fn add_question(&self, survey_id: i64, question: &str) -> Result<Question, StoreError> {
        check_len(question, TEXT_MAX_CHARS)?;

        let mut tables = self.tables.lock().await;
        if !tables.surveys.contains_key(&survey_id) {
            return Err(missing_parent("questions", "survey_id"));
        }

        let question = Question {
            id: next_id(&mut tables.question_seq),
            survey_id,
            question: question.to_string(),
        };
        tables.questions.insert(question.id, question.clone());
        Ok(question)
    }

    async fn get_question(&self, question_id: i64) -> Result<Option<Question>, StoreError> {
        Ok(self.tables.lock().await.questions.get(&question_id).cloned())
    }

    async fn questions_for(&self, survey_id: i64) -> Result<Vec<Question>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .questions
            .values()
            .filter(|q| q.survey_id == survey_id)
            .cloned()
            .collect())
    }

    async fn delete_question(&self, question_id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.lock().await.delete_question_cascade(question_id))
    }

    async fn add_answer(&self, question_id: i64, answer: &str) -> Result<Answer, StoreError> {
        check_len(answer, TEXT_MAX_CHARS)?;

        let mut tables = self.tables.lock().await;
        if !tables.questions.contains_key(&question_id) {
            return Err(missing_parent("answers", "question_id"));
        }

        let answer = Answer {
            id: next_id(&mut tables.answer_seq),
            question_id,
            answer: answer.to_string(),
            votes: 0,
        };
        tables.answers.insert(answer.id, answer.clone());
        Ok(answer)
    }

    async fn get_answer(&self, answer_id: i64) -> Result<Option<Answer>, StoreError> {
        Ok(self.tables.lock().await.answers.get(&answer_id).cloned())
    }

    async fn answers_for(&self, question_id: i64) -> Result<Vec<Answer>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .answers
            .values()
            .filter(|a| a.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn winning_answers(&self, question_id: i64) -> Result<Vec<Answer>, StoreError> {
        let answers = self.answers_for(question_id).await?;
        Ok(winning_answers(&answers))
    }

    async fn record_vote(&self, answer_id: i64) -> Result<Option<Answer>, StoreError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.answers.get_mut(&answer_id).map(|answer| {
            answer.votes += 1;
            answer.clone()
        }))
    }
}
