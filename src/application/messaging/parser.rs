//! Roll command parser - Turns `/roll XdY` text into a validated request

use crate::domain::entities::RollRequest;
use crate::application::errors::RollError;

/// Command prefix the bot answers to
pub const ROLL_PREFIX: &str = "/roll ";

pub const DEFAULT_MAX_COUNT: i64 = 100;
pub const DEFAULT_MAX_SIDES: i64 = 1000;

/// Parses and bounds `/roll` commands
#[derive(Debug, Clone)]
pub struct RollParser {
    max_count: i64,
    max_sides: i64,
}

impl RollParser {
    pub fn new(max_count: i64, max_sides: i64) -> Self {
        Self { max_count, max_sides }
    }

    /// Returns `None` when the text is not a roll command at all.
    pub fn parse(&self, text: &str) -> Option<Result<RollRequest, RollError>> {
        let body = text.strip_prefix(ROLL_PREFIX)?;
        Some(self.parse_body(&body.to_lowercase()))
    }

    /// Parse a lowercased `XdY` body. Segments after the second `d` are ignored.
    fn parse_body(&self, body: &str) -> Result<RollRequest, RollError> {
        let mut parts = body.split('d');
        let (Some(count), Some(sides)) = (parts.next(), parts.next()) else {
            return Err(RollError::InvalidFormat);
        };

        let count = count.parse::<i32>().map_err(|_| RollError::InvalidFormat)?;
        let sides = sides.parse::<i32>().map_err(|_| RollError::InvalidFormat)?;
        let request = RollRequest::new(i64::from(count), i64::from(sides));

        if request.count > self.max_count {
            return Err(RollError::TooManyDice { max: self.max_count });
        }
        if request.sides > self.max_sides {
            return Err(RollError::DiceTooLarge { max: self.max_sides });
        }
        if request.count < 1 {
            return Err(RollError::TooFewDice);
        }
        if request.sides < 1 {
            return Err(RollError::TooFewSides);
        }

        Ok(request)
    }
}

impl Default for RollParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COUNT, DEFAULT_MAX_SIDES)
    }
}
