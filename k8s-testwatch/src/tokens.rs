use super::Verdict;

/// Sentinel strings a test container prints to report its own outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tokens {
    success: String,
    failure: String,
}

impl Tokens {
    pub fn new(success: impl ToString, failure: impl ToString) -> Self {
        Self {
            success: success.to_string(),
            failure: failure.to_string(),
        }
    }

    pub fn success(&self) -> &str {
        &self.success
    }

    pub fn failure(&self) -> &str {
        &self.failure
    }

    /// Case sensitive substring match. Success is checked first, so a line
    /// carrying both tokens passes.
    pub fn match_line(&self, line: &str) -> Option<Verdict> {
        if line.contains(&self.success) {
            Some(Verdict::Passed)
        } else if line.contains(&self.failure) {
            Some(Verdict::Failed)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Tokens {
        Tokens::new("SUCCESS", "FAILURE")
    }

    #[test]
    fn success_substring() {
        assert_eq!(
            tokens().match_line("2024/01/01 all tests SUCCESS!\n"),
            Some(Verdict::Passed)
        );
    }

    #[test]
    fn failure_substring() {
        assert_eq!(
            tokens().match_line("--- FAILURE: TestSomething"),
            Some(Verdict::Failed)
        );
    }

    #[test]
    fn success_wins_over_failure() {
        assert_eq!(
            tokens().match_line("FAILURE count 0, SUCCESS"),
            Some(Verdict::Passed)
        );
    }

    #[test]
    fn case_sensitive() {
        assert_eq!(tokens().match_line("success failure"), None);
    }

    #[test]
    fn unrelated_line() {
        assert_eq!(tokens().match_line("running 12 tests"), None);
    }
}
