use std::sync::Arc;
use crate::domain::entities::{RollRequest, RollResult};
use crate::domain::traits::RandomSource;
use crate::application::errors::RollError;

/// Draws dice outcomes from a secure random source.
///
/// Callers validate the request bounds; the service only requires `sides >= 1`.
#[derive(Clone)]
pub struct DiceService {
    random: Arc<dyn RandomSource>,
}

impl DiceService {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Roll `request.count` dice of `request.sides` sides.
    ///
    /// Aborts on the first failed draw; no partial result is returned.
    pub fn roll(&self, request: RollRequest) -> Result<RollResult, RollError> {
        let count = usize::try_from(request.count).unwrap_or(0);
        if request.sides < 1 {
            return Err(RollError::TooFewSides);
        }
        let bound = u32::try_from(request.sides)
            .map_err(|_| RollError::DiceTooLarge { max: i64::from(u32::MAX) })?;

        let mut result = RollResult::with_capacity(count);
        for _ in 0..count {
            let outcome = self.draw_below(bound)?;
            result.push(i64::from(outcome));
        }
        Ok(result)
    }

    /// Uniform draw in `[0, bound)` by rejection sampling.
    ///
    /// Words at or above the largest multiple of `bound` are discarded so every
    /// residue is equally likely.
    fn draw_below(&self, bound: u32) -> Result<u32, RollError> {
        let zone = u32::MAX - (u32::MAX % bound + 1) % bound;
        loop {
            let word = self.random.next_u32()?;
            if word <= zone {
                return Ok(word % bound);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use crate::application::errors::RandomError;
    use crate::infrastructure::random::OsRandom;

    /// Replays a fixed list of words, failing once it runs dry
    struct ScriptedRandom {
        words: Mutex<VecDeque<u32>>,
    }

    impl ScriptedRandom {
        fn new(words: &[u32]) -> Self {
            Self { words: Mutex::new(words.iter().copied().collect()) }
        }
    }

    impl RandomSource for ScriptedRandom {
        fn next_u32(&self) -> Result<u32, RandomError> {
            self.words
                .lock()
                .map_err(|_| RandomError("lock poisoned".to_string()))?
                .pop_front()
                .ok_or_else(|| RandomError("exhausted".to_string()))
        }
    }

    fn os_dice() -> DiceService {
        DiceService::new(Arc::new(OsRandom::new()))
    }

    #[test]
    fn test_roll_shape_and_sum() {
        let dice = os_dice();
        for &(count, sides) in &[(1, 1), (3, 6), (100, 1000), (17, 2)] {
            let result = dice.roll(RollRequest::new(count, sides)).unwrap();
            assert_eq!(result.outcomes.len(), count as usize);
            assert!(result.outcomes.iter().all(|&o| (0..sides).contains(&o)));
            assert_eq!(result.sum, result.outcomes.iter().sum::<i64>());
        }
    }

    #[test]
    fn test_outcomes_keep_draw_order() {
        let dice = DiceService::new(Arc::new(ScriptedRandom::new(&[5, 0, 3])));
        let result = dice.roll(RollRequest::new(3, 6)).unwrap();
        assert_eq!(result.outcomes, vec![5, 0, 3]);
        assert_eq!(result.sum, 8);
        assert_eq!(result.joined(), "5, 0, 3");
    }

    #[test]
    fn test_words_in_biased_tail_are_rejected() {
        // 2^32 % 6 == 4, so the top four words must be redrawn
        let dice = DiceService::new(Arc::new(ScriptedRandom::new(&[u32::MAX, u32::MAX - 3, 7])));
        let result = dice.roll(RollRequest::new(1, 6)).unwrap();
        assert_eq!(result.outcomes, vec![1]);
    }

    #[test]
    fn test_largest_accepted_word() {
        // u32::MAX - 4 is the last word of the final full block of six
        let dice = DiceService::new(Arc::new(ScriptedRandom::new(&[u32::MAX - 4])));
        let result = dice.roll(RollRequest::new(1, 6)).unwrap();
        assert_eq!(result.outcomes, vec![((u32::MAX - 4) % 6) as i64]);
    }

    #[test]
    fn test_power_of_two_sides_accept_every_word() {
        let dice = DiceService::new(Arc::new(ScriptedRandom::new(&[u32::MAX])));
        let result = dice.roll(RollRequest::new(1, 8)).unwrap();
        assert_eq!(result.outcomes, vec![7]);
    }

    #[test]
    fn test_failure_aborts_without_partial_result() {
        let dice = DiceService::new(Arc::new(ScriptedRandom::new(&[1, 2])));
        let err = dice.roll(RollRequest::new(3, 6)).unwrap_err();
        assert!(matches!(err, RollError::Generation(_)));
    }

    #[test]
    fn test_zero_dice_is_empty() {
        let dice = DiceService::new(Arc::new(ScriptedRandom::new(&[])));
        let result = dice.roll(RollRequest::new(0, 6)).unwrap();
        assert!(result.outcomes.is_empty());
        assert_eq!(result.sum, 0);
    }

    #[test]
    fn test_outcomes_are_uniform() {
        // Chi-square goodness of fit over a side count that does not divide 2^32.
        // Critical value for 6 degrees of freedom at p = 0.001 is 22.46.
        let sides = 7i64;
        let dice = os_dice();
        let mut counts = vec![0u64; sides as usize];
        let rolls = 700;
        for _ in 0..rolls {
            let result = dice.roll(RollRequest::new(100, sides)).unwrap();
            for o in result.outcomes {
                counts[o as usize] += 1;
            }
        }

        let expected = (rolls * 100) as f64 / sides as f64;
        let chi_square: f64 = counts
            .iter()
            .map(|&c| {
                let d = c as f64 - expected;
                d * d / expected
            })
            .sum();
        assert!(chi_square < 22.46, "chi-square {} counts {:?}", chi_square, counts);
    }
}
