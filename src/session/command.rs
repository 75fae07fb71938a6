use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;

/// Active detection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Landmark detector
    Ml,
    /// Colour segmentation and contour geometry
    Classical,
}

impl Strategy {
    /// Label used on the wire and in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ml => "AI",
            Self::Classical => "MANUAL",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Control message from the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start (or restart) skin calibration
    Calibrate,
    /// Abort any calibration and switch strategy
    Switch(Strategy),
}

impl Command {
    pub const PREFIX: &'static str = "MODE:";

    /// Whether a text message is meant as a command rather than frame data
    pub fn is_command(text: &str) -> bool {
        text.starts_with(Self::PREFIX)
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = s
            .trim()
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| CommandError::MissingPrefix(s.to_string()))?;

        // Anything after a second separator is ignored
        match mode.split(':').next().unwrap_or_default() {
            "CALIBRATE" => Ok(Command::Calibrate),
            "AI" => Ok(Command::Switch(Strategy::Ml)),
            "MANUAL" => Ok(Command::Switch(Strategy::Classical)),
            other => Err(CommandError::UnknownMode(other.to_string())),
        }
    }
}
