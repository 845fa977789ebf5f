use crate::db::connection::DbPool;
use crate::db::models::Question;
use sqlx::Error;

pub async fn add_question(
    pool: &DbPool,
    survey_id: i64,
    question: &str,
) -> Result<Question, Error> {
    sqlx::query_as::<_, Question>(
        "INSERT INTO questions (survey_id, question) VALUES ($1, $2) \
         RETURNING id, survey_id, question",
    )
    .bind(survey_id)
    .bind(question)
    .fetch_one(pool)
    .await
}

pub async fn get_question(pool: &DbPool, question_id: i64) -> Result<Option<Question>, Error> {
    sqlx::query_as::<_, Question>("SELECT id, survey_id, question FROM questions WHERE id = $1")
        .bind(question_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_survey_questions(pool: &DbPool, survey_id: i64) -> Result<Vec<Question>, Error> {
    sqlx::query_as::<_, Question>(
        "SELECT id, survey_id, question FROM questions WHERE survey_id = $1 ORDER BY id",
    )
    .bind(survey_id)
    .fetch_all(pool)
    .await
}

pub async fn delete_question(pool: &DbPool, question_id: i64) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(question_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
