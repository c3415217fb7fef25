/// A validated `XdY` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollRequest {
    pub count: i64,
    pub sides: i64,
}

impl RollRequest {
    pub fn new(count: i64, sides: i64) -> Self {
        Self { count, sides }
    }
}

/// Outcomes of one roll, in draw order. Each outcome lies in `[0, sides)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RollResult {
    pub outcomes: Vec<i64>,
    pub sum: i64,
}

impl RollResult {
    pub fn with_capacity(count: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(count),
            sum: 0,
        }
    }

    pub fn push(&mut self, outcome: i64) {
        self.outcomes.push(outcome);
        self.sum += outcome;
    }

    /// Outcomes joined as `a, b, c`
    pub fn joined(&self) -> String {
        self.outcomes
            .iter()
            .map(|o| o.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
