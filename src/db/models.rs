use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TITLE_MAX_CHARS: usize = 60;
pub const TEXT_MAX_CHARS: usize = 200;

/// Days added to `opens` when a survey is created without a close date.
pub const DEFAULT_SURVEY_DAYS: u64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Survey {
    pub id: i64,
    pub title: String,
    pub opens: NaiveDate,
    pub closes: NaiveDate,
}

impl Survey {
    pub fn status(&self, today: NaiveDate) -> SurveyStatus {
        SurveyStatus::classify(self.opens, self.closes, today)
    }

    /// Draft carrying this survey's current values, for re-saving.
    pub fn to_draft(&self) -> SurveyDraft {
        SurveyDraft {
            title: Some(self.title.clone()),
            opens: Some(self.opens),
            closes: Some(self.closes),
        }
    }
}

impl fmt::Display for Survey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Opens {}, closes {})", self.title, self.opens, self.closes)
    }
}

/// Survey values as submitted by an administrator, before they are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub opens: Option<NaiveDate>,
    #[serde(default)]
    pub closes: Option<NaiveDate>,
}

impl SurveyDraft {
    pub fn new(
        title: impl Into<String>,
        opens: Option<NaiveDate>,
        closes: Option<NaiveDate>,
    ) -> Self {
        SurveyDraft {
            title: Some(title.into()),
            opens,
            closes,
        }
    }

    /// Fills in `closes` on insert only. An update with a cleared `closes`
    /// is left alone so the store rejects it.
    pub fn prepare(mut self, mode: SaveMode) -> Self {
        if mode == SaveMode::Insert && self.closes.is_none() {
            self.closes = self.opens.and_then(default_closes);
        }
        self
    }
}

/// Whether a survey save creates a new row or rewrites an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Insert,
    Update(i64),
}

pub fn default_closes(opens: NaiveDate) -> Option<NaiveDate> {
    opens.checked_add_days(Days::new(DEFAULT_SURVEY_DAYS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyStatus {
    Completed,
    Active,
    Upcoming,
}

impl SurveyStatus {
    pub fn classify(opens: NaiveDate, closes: NaiveDate, today: NaiveDate) -> Self {
        if closes < today {
            SurveyStatus::Completed
        } else if opens > today {
            SurveyStatus::Upcoming
        } else {
            SurveyStatus::Active
        }
    }

    /// Whether `survey` falls inside `horizon`: closed on or after it when
    /// completed, opening on or before it when upcoming. Active surveys
    /// always do.
    pub fn within(self, survey: &Survey, horizon: NaiveDate) -> bool {
        match self {
            SurveyStatus::Completed => survey.closes >= horizon,
            SurveyStatus::Active => true,
            SurveyStatus::Upcoming => survey.opens <= horizon,
        }
    }
}

impl fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SurveyStatus::Completed => "completed",
            SurveyStatus::Active => "active",
            SurveyStatus::Upcoming => "upcoming",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub survey_id: i64,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub answer: String,
    pub votes: i32,
}

/// Answers tied at the highest vote count. Zero votes never win.
pub fn winning_answers(answers: &[Answer]) -> Vec<Answer> {
    let max = match answers.iter().map(|a| a.votes).max() {
        Some(max) if max > 0 => max,
        _ => return Vec::new(),
    };

    answers
        .iter()
        .filter(|a| a.votes == max)
        .cloned()
        .collect()
}
