pub mod builder;
pub mod quota;
mod survey;

pub use survey::SurveyId;
