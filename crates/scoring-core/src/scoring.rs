//! Score and interest lookups
//!
//! The handlers only see the [`Scoring`] trait. [`LocalScoring`] is the
//! in-process implementation the server runs with.

use rand::seq::SliceRandom;
use thiserror::Error;

use crate::error::ApiError;
use crate::requests::OnlineScoreRequest;

/// Interests a client can be tagged with
pub const INTERESTS: [&str; 11] = [
    "cars", "pets", "travel", "hi-tech", "sport", "music", "books", "tv", "cinema", "geek",
    "otus",
];

/// Interests returned per client
pub const INTERESTS_PER_CLIENT: usize = 2;

/// Errors raised by a lookup backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// The backend could not be reached
    #[error("Scoring backend unavailable: {0}")]
    Unavailable(String),

    /// The backend failed while computing
    #[error("Scoring lookup failed: {0}")]
    Lookup(String),
}

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        ApiError::internal(err.to_string())
    }
}

/// Synchronous score and interest lookups
#[cfg_attr(test, mockall::automock)]
pub trait Scoring: Send + Sync {
    /// Score for one validated client profile
    fn get_score(&self, profile: &OnlineScoreRequest) -> Result<f64, ScoringError>;

    /// Interests of one client
    fn get_interests(&self, client_id: u64) -> Result<Vec<String>, ScoringError>;
}

/// In-process scoring with fixed weights and sampled interests
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalScoring;

impl LocalScoring {
    pub fn new() -> Self {
        Self
    }
}

impl Scoring for LocalScoring {
    fn get_score(&self, profile: &OnlineScoreRequest) -> Result<f64, ScoringError> {
        let mut score = 0.0;
        if profile.phone.is_some() {
            score += 1.5;
        }
        if profile.email.is_some() {
            score += 1.5;
        }
        if profile.birthday.is_some() && profile.gender.is_some() {
            score += 1.5;
        }
        if profile.first_name.is_some() && profile.last_name.is_some() {
            score += 0.5;
        }
        Ok(score)
    }

    fn get_interests(&self, _client_id: u64) -> Result<Vec<String>, ScoringError> {
        let mut rng = rand::thread_rng();
        Ok(INTERESTS
            .choose_multiple(&mut rng, INTERESTS_PER_CLIENT)
            .map(|s| s.to_string())
            .collect())
    }
}
