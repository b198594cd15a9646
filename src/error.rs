use thiserror::Error;

/// Failures while pulling a schedule out of a team-info page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("the venue URL {0:?} can't have path segments appended")]
    InvalidBaseUrl(String),
    #[error("couldn't find the {0} on the team page")]
    MissingField(&'static str),
    #[error("unable to parse {what} record ({raw:?})")]
    Record { what: &'static str, raw: String },
    #[error("unable to parse court number ({0:?})")]
    Court(String),
    #[error("unable to parse match date and time ({date:?} {time:?})")]
    Datetime { date: String, time: String },
}
