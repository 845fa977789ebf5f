pub mod answer_repository;
pub mod question_repository;
pub mod survey_repository;

pub use answer_repository::*;
pub use question_repository::*;
pub use survey_repository::*;
