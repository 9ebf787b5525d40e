//! Registration form validation
//!
//! Raw form strings are checked here before anything reaches the session.

use thiserror::Error;

/// Rejected registration input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Please enter a valid number of players.")]
    InvalidPlayerCount,
    #[error("Please enter a nickname.")]
    EmptyNickname,
}

/// Parse the player-count field (a positive integer)
pub fn parse_player_count(input: &str) -> Result<usize, RegistrationError> {
    match input.trim().parse::<usize>() {
        Ok(count) if count >= 1 => Ok(count),
        _ => Err(RegistrationError::InvalidPlayerCount),
    }
}

/// Trim a nickname and reject it if empty
pub fn validate_nickname(input: &str) -> Result<&str, RegistrationError> {
    let name = input.trim();
    if name.is_empty() {
        Err(RegistrationError::EmptyNickname)
    } else {
        Ok(name)
    }
}

/// Format seconds for the scoreboard ("12.34s")
pub fn format_time(seconds: f64) -> String {
    format!("{:.2}s", seconds)
}
