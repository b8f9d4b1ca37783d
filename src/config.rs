//! Source locations for the three datasets.

use serde::Serialize;

pub const DEFAULT_CURRENT_QUIZ_URL: &str = "https://jsonkeeper.com/b/LLQT";
pub const DEFAULT_SUBMISSIONS_URL: &str = "http://api.jsonserve.com/rJvd7g";
pub const DEFAULT_HISTORICAL_QUIZ_URL: &str = "http://api.jsonserve.com/XgAgFJ";

/// The datasets every run needs, in retrieval order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    CurrentQuiz,
    Submissions,
    HistoricalQuiz,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [
        Dataset::CurrentQuiz,
        Dataset::Submissions,
        Dataset::HistoricalQuiz,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dataset::CurrentQuiz => "Current Quiz Data",
            Dataset::Submissions => "Submission Data",
            Dataset::HistoricalQuiz => "Historical Quiz Data",
        }
    }
}

/// Where each dataset is read from: an `http(s)` URL or a local file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoints {
    pub current_quiz: String,
    pub submissions: String,
    pub historical_quiz: String,
}

impl Endpoints {
    pub fn get(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::CurrentQuiz => &self.current_quiz,
            Dataset::Submissions => &self.submissions,
            Dataset::HistoricalQuiz => &self.historical_quiz,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            current_quiz: DEFAULT_CURRENT_QUIZ_URL.to_string(),
            submissions: DEFAULT_SUBMISSIONS_URL.to_string(),
            historical_quiz: DEFAULT_HISTORICAL_QUIZ_URL.to_string(),
        }
    }
}
