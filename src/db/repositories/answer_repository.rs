use crate::db::connection::DbPool;
use crate::db::models::Answer;
use sqlx::Error;

pub async fn add_answer(pool: &DbPool, question_id: i64, answer: &str) -> Result<Answer, Error> {
    sqlx::query_as::<_, Answer>(
        "INSERT INTO answers (question_id, answer) VALUES ($1, $2) \
         RETURNING id, question_id, answer, votes",
    )
    .bind(question_id)
    .bind(answer)
    .fetch_one(pool)
    .await
}

pub async fn get_answer(pool: &DbPool, answer_id: i64) -> Result<Option<Answer>, Error> {
    sqlx::query_as::<_, Answer>("SELECT id, question_id, answer, votes FROM answers WHERE id = $1")
        .bind(answer_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_question_answers(pool: &DbPool, question_id: i64) -> Result<Vec<Answer>, Error> {
    sqlx::query_as::<_, Answer>(
        "SELECT id, question_id, answer, votes FROM answers WHERE question_id = $1 ORDER BY id",
    )
    .bind(question_id)
    .fetch_all(pool)
    .await
}

/// Answers sharing the top vote count. The `votes > 0` filter keeps
/// all-zero questions winnerless.
pub async fn get_winning_answers(pool: &DbPool, question_id: i64) -> Result<Vec<Answer>, Error> {
    sqlx::query_as::<_, Answer>(
        r#"
        SELECT id, question_id, answer, votes FROM answers
        WHERE question_id = $1
          AND votes > 0
          AND votes = (SELECT MAX(votes) FROM answers WHERE question_id = $1)
        ORDER BY id
        "#,
    )
    .bind(question_id)
    .fetch_all(pool)
    .await
}

pub async fn increment_votes(pool: &DbPool, answer_id: i64) -> Result<Option<Answer>, Error> {
    sqlx::query_as::<_, Answer>(
        "UPDATE answers SET votes = votes + 1 WHERE id = $1 \
         RETURNING id, question_id, answer, votes",
    )
    .bind(answer_id)
    .fetch_optional(pool)
    .await
}
