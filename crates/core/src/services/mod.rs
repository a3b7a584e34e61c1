pub mod attribution;
pub mod survey;

pub use attribution::repair;
pub use survey::{
    run_survey, FileKind, LogArtifact, ReadFailure, RunMetadata, SurveyError, SurveyInputs,
    SurveyOutcome, SurveyRunner,
};
