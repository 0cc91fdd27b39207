use std::time::Instant;

use crate::api::models::{ReviewCard, ReviewOutcome, ReviewSummary};

/// State for the graded-review screen. Scheduling lives server-side; this
/// only tracks what is on screen and how long the answer took.
pub struct ReviewSession {
    pub due_count: Option<u32>,
    pub card: Option<ReviewCard>,
    pub revealed: bool,
    pub last_outcome: Option<ReviewOutcome>,
    pub reviewed: usize,
    shown_at: Option<Instant>,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self {
            due_count: None,
            card: None,
            revealed: false,
            last_outcome: None,
            reviewed: 0,
            shown_at: None,
        }
    }

    pub fn apply_summary(&mut self, summary: ReviewSummary) {
        self.due_count = Some(summary.due_count);
    }

    pub fn show_card(&mut self, card: Option<ReviewCard>, now: Instant) {
        self.shown_at = card.is_some().then_some(now);
        self.card = card;
        self.revealed = false;
    }

    pub fn reveal(&mut self) {
        if self.card.is_some() {
            self.revealed = true;
        }
    }

    /// Milliseconds the current card has been on screen; reported with the
    /// answer so the backend can log review durations.
    pub fn duration_ms(&self, now: Instant) -> u64 {
        self.shown_at
            .map(|t0| now.saturating_duration_since(t0).as_millis() as u64)
            .unwrap_or(0)
    }

    pub fn record_outcome(&mut self, outcome: ReviewOutcome) {
        self.last_outcome = Some(outcome);
        self.reviewed += 1;
    }

    /// All caught up: summary loaded, nothing due, nothing on screen.
    pub fn all_done(&self) -> bool {
        self.card.is_none() && self.due_count == Some(0)
    }
}

impl Default for ReviewSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use chrono::NaiveDate;

    fn review_card(id: i64) -> ReviewCard {
        ReviewCard {
            card_id: id,
            deck_id: 1,
            front: "f".to_string(),
            back: "b".to_string(),
            source_id: None,
            source_chunk_id: None,
            due: NaiveDate::from_ymd_opt(2026, 8, 5).unwrap(),
            interval: 1,
            ease_factor: 2.5,
            repetitions: 0,
            lapses: 0,
        }
    }

    #[test]
    fn reveal_requires_a_card() {
        let mut session = ReviewSession::new();
        session.reveal();
        assert!(!session.revealed);

        session.show_card(Some(review_card(1)), Instant::now());
        session.reveal();
        assert!(session.revealed);
    }

    #[test]
    fn showing_a_card_resets_reveal_and_timer() {
        let t0 = Instant::now();
        let mut session = ReviewSession::new();
        session.show_card(Some(review_card(1)), t0);
        session.reveal();
        session.show_card(Some(review_card(2)), t0 + Duration::from_secs(5));
        assert!(!session.revealed);
        assert_eq!(session.duration_ms(t0 + Duration::from_secs(7)), 2000);
    }

    #[test]
    fn duration_is_zero_without_a_card() {
        let mut session = ReviewSession::new();
        session.show_card(None, Instant::now());
        assert_eq!(session.duration_ms(Instant::now()), 0);
    }

    #[test]
    fn all_done_only_when_summary_confirms_empty() {
        let mut session = ReviewSession::new();
        assert!(!session.all_done(), "unknown due count is not done");
        session.apply_summary(ReviewSummary { due_count: 0 });
        assert!(session.all_done());
        session.show_card(Some(review_card(1)), Instant::now());
        assert!(!session.all_done());
    }
}
