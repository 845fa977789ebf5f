use crate::db::connection::DbPool;
use crate::db::models::{Survey, SurveyDraft, SurveyStatus};
use chrono::NaiveDate;
use sqlx::Error;

pub async fn insert_survey(pool: &DbPool, draft: &SurveyDraft) -> Result<Survey, Error> {
    sqlx::query_as::<_, Survey>(
        "INSERT INTO surveys (title, opens, closes) VALUES ($1, $2, $3) \
         RETURNING id, title, opens, closes",
    )
    .bind(draft.title.as_deref())
    .bind(draft.opens)
    .bind(draft.closes)
    .fetch_one(pool)
    .await
}

pub async fn update_survey(
    pool: &DbPool,
    survey_id: i64,
    draft: &SurveyDraft,
) -> Result<Survey, Error> {
    sqlx::query_as::<_, Survey>(
        "UPDATE surveys SET title = $1, opens = $2, closes = $3 WHERE id = $4 \
         RETURNING id, title, opens, closes",
    )
    .bind(draft.title.as_deref())
    .bind(draft.opens)
    .bind(draft.closes)
    .bind(survey_id)
    .fetch_one(pool)
    .await
}

pub async fn get_survey(pool: &DbPool, survey_id: i64) -> Result<Option<Survey>, Error> {
    sqlx::query_as::<_, Survey>("SELECT id, title, opens, closes FROM surveys WHERE id = $1")
        .bind(survey_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_surveys_with_status(
    pool: &DbPool,
    status: SurveyStatus,
    today: NaiveDate,
) -> Result<Vec<Survey>, Error> {
    let sql = match status {
        SurveyStatus::Completed => {
            "SELECT id, title, opens, closes FROM surveys WHERE closes < $1 ORDER BY opens, id"
        }
        SurveyStatus::Active => {
            "SELECT id, title, opens, closes FROM surveys \
             WHERE opens <= $1 AND closes >= $1 ORDER BY opens, id"
        }
        SurveyStatus::Upcoming => {
            "SELECT id, title, opens, closes FROM surveys WHERE opens > $1 ORDER BY opens, id"
        }
    };

    sqlx::query_as::<_, Survey>(sql)
        .bind(today)
        .fetch_all(pool)
        .await
}

pub async fn get_surveys_near(
    pool: &DbPool,
    status: SurveyStatus,
    today: NaiveDate,
    horizon: NaiveDate,
) -> Result<Vec<Survey>, Error> {
    let sql = match status {
        SurveyStatus::Completed => {
            "SELECT id, title, opens, closes FROM surveys \
             WHERE closes < $1 AND closes >= $2 ORDER BY opens, id"
        }
        SurveyStatus::Active => return get_surveys_with_status(pool, status, today).await,
        SurveyStatus::Upcoming => {
            "SELECT id, title, opens, closes FROM surveys \
             WHERE opens > $1 AND opens <= $2 ORDER BY opens, id"
        }
    };

    sqlx::query_as::<_, Survey>(sql)
        .bind(today)
        .bind(horizon)
        .fetch_all(pool)
        .await
}

pub async fn delete_survey(pool: &DbPool, survey_id: i64) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM surveys WHERE id = $1")
        .bind(survey_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
