//! Token accounting for model calls.

use serde::{Deserialize, Serialize};

/// Token usage accumulated over one or more model requests.
///
/// A default `Usage` is all zeroes, including `requests`; that is what a
/// provider reply without an accounting object maps to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Number of requests made to the provider.
    pub requests: u64,
    /// Tokens in the input/prompt.
    pub input_tokens: u64,
    /// Tokens in the output/completion.
    pub output_tokens: u64,
    /// Total tokens, as reported by the provider.
    pub total_tokens: u64,
}

impl Usage {
    /// Usage for a single request with the given token counts.
    #[must_use]
    pub const fn single_request(input_tokens: u64, output_tokens: u64, total_tokens: u64) -> Self {
        Self {
            requests: 1,
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }

    /// Check if no tokens were recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.input_tokens == 0 && self.output_tokens == 0 && self.total_tokens == 0
    }
}

impl std::ops::Add for Usage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            requests: self.requests.saturating_add(rhs.requests),
            input_tokens: self.input_tokens.saturating_add(rhs.input_tokens),
            output_tokens: self.output_tokens.saturating_add(rhs.output_tokens),
            total_tokens: self.total_tokens.saturating_add(rhs.total_tokens),
        }
    }
}

impl std::ops::AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Usage {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, x| acc + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_default_is_zero() {
        let usage = Usage::default();
        assert_eq!(usage.requests, 0);
        assert!(usage.is_empty());
    }

    #[test]
    fn test_usage_add() {
        let sum = Usage::single_request(10, 20, 30) + Usage::single_request(1, 2, 3);
        assert_eq!(sum, Usage {
            requests: 2,
            input_tokens: 11,
            output_tokens: 22,
            total_tokens: 33,
        });
    }

    #[test]
    fn test_usage_saturating_add() {
        let mut usage = Usage::single_request(u64::MAX, 0, u64::MAX);
        usage += Usage::single_request(1, 1, 1);
        assert_eq!(usage.input_tokens, u64::MAX);
        assert_eq!(usage.output_tokens, 1);
        assert_eq!(usage.requests, 2);
    }

    #[test]
    fn test_usage_sum() {
        let total: Usage = vec![
            Usage::single_request(10, 5, 15),
            Usage::single_request(20, 10, 30),
        ]
        .into_iter()
        .sum();
        assert_eq!(total.requests, 2);
        assert_eq!(total.total_tokens, 45);
    }
}
