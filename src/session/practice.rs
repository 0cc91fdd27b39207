use std::collections::VecDeque;

use thiserror::Error;

use crate::api::models::PracticeCard;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    /// Wire rating used by the review endpoint (1 = Again .. 4 = Easy).
    pub fn rating(self) -> u8 {
        match self {
            Grade::Again => 1,
            Grade::Hard => 2,
            Grade::Good => 3,
            Grade::Easy => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::Again => "Again",
            Grade::Hard => "Hard",
            Grade::Good => "Good",
            Grade::Easy => "Easy",
        }
    }

    pub fn from_key(ch: char) -> Option<Self> {
        match ch {
            '1' => Some(Grade::Again),
            '2' => Some(Grade::Hard),
            '3' => Some(Grade::Good),
            '4' => Some(Grade::Easy),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no card to grade: the practice queue is empty")]
    EmptyQueue,
}

struct HistoryEntry {
    card: PracticeCard,
    requeued: bool,
}

/// In-memory scheduler for one ungraded drill session.
///
/// Cards are presented front-to-back in pool order. Grading `Again` moves
/// the card to the back of the queue so it comes around again this session;
/// any other grade retires it. `step_back` undoes the most recent grade.
/// Undo works off an explicit history log rather than reversing the queue
/// transformation: `Again` duplicates the card instead of moving it, and
/// fronts/backs are not unique by value, so each history entry records
/// whether its grade created a duplicate so exactly that copy can be
/// removed (located by id from the tail).
pub struct PracticeQueue {
    deck_name: String,
    queue: VecDeque<PracticeCard>,
    history: Vec<HistoryEntry>,
    seen: usize,
    revealed: bool,
}

impl PracticeQueue {
    pub fn new(deck_name: &str, cards: Vec<PracticeCard>) -> Self {
        Self {
            deck_name: deck_name.to_string(),
            queue: cards.into(),
            history: Vec::new(),
            seen: 0,
            revealed: false,
        }
    }

    pub fn current(&self) -> Option<&PracticeCard> {
        self.queue.front()
    }

    pub fn reveal(&mut self) {
        if !self.queue.is_empty() {
            self.revealed = true;
        }
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }

    pub fn grade(&mut self, grade: Grade) -> Result<(), SessionError> {
        let card = self.queue.pop_front().ok_or(SessionError::EmptyQueue)?;
        let requeued = grade == Grade::Again;
        if requeued {
            // Missed: see it again after everything currently queued.
            self.queue.push_back(card.clone());
        }
        self.history.push(HistoryEntry { card, requeued });
        self.seen += 1;
        self.revealed = false;
        Ok(())
    }

    /// Undo the most recent grade. No-op when nothing has been graded yet.
    pub fn step_back(&mut self) {
        let Some(entry) = self.history.pop() else {
            return;
        };
        if entry.requeued {
            // The grade left a duplicate of this card at the back of the
            // queue; remove that copy, not some same-looking card.
            if let Some(pos) = self.queue.iter().rposition(|c| c.id == entry.card.id) {
                self.queue.remove(pos);
            }
        }
        self.queue.push_front(entry.card);
        self.seen = self.seen.saturating_sub(1);
        self.revealed = false;
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn seen_count(&self) -> usize {
        self.seen
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Position line denominator: cards seen so far plus cards still queued
    /// (requeues count twice, matching what the user will actually flip).
    pub fn total(&self) -> usize {
        self.seen + self.queue.len()
    }

    pub fn deck_name(&self) -> &str {
        &self.deck_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: i64, front: &str) -> PracticeCard {
        PracticeCard {
            id,
            deck_id: 1,
            front: front.to_string(),
            back: format!("back of {front}"),
            source_id: None,
            source_chunk_id: None,
        }
    }

    fn queue_ids(q: &PracticeQueue) -> Vec<i64> {
        q.queue.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_empty_pool_is_finished() {
        let q = PracticeQueue::new("deck", Vec::new());
        assert!(q.is_finished());
        assert!(q.current().is_none());
        assert_eq!(q.total(), 0);
    }

    #[test]
    fn test_grade_on_empty_queue_fails() {
        let mut q = PracticeQueue::new("deck", Vec::new());
        assert!(matches!(q.grade(Grade::Good), Err(SessionError::EmptyQueue)));
    }

    #[test]
    fn test_good_retires_card() {
        let mut q = PracticeQueue::new("deck", vec![card(1, "a")]);
        q.grade(Grade::Good).unwrap();
        assert!(q.is_finished());
        assert_eq!(q.seen_count(), 1);
    }

    #[test]
    fn test_again_requeues_at_tail() {
        let mut q = PracticeQueue::new("deck", vec![card(1, "a"), card(2, "b")]);
        q.grade(Grade::Again).unwrap();
        assert_eq!(queue_ids(&q), vec![2, 1]);
        assert!(!q.is_finished());
        // The missed card comes around after everything else.
        q.grade(Grade::Good).unwrap();
        assert_eq!(q.current().unwrap().id, 1);
    }

    #[test]
    fn test_again_on_single_card_keeps_session_alive() {
        let mut q = PracticeQueue::new("deck", vec![card(1, "a")]);
        q.grade(Grade::Again).unwrap();
        assert!(!q.is_finished());
        assert_eq!(q.current().unwrap().id, 1);
        assert_eq!(q.total(), 2);
        q.grade(Grade::Hard).unwrap();
        assert!(q.is_finished());
    }

    #[test]
    fn test_reveal_cleared_by_grade() {
        let mut q = PracticeQueue::new("deck", vec![card(1, "a"), card(2, "b")]);
        q.reveal();
        q.reveal();
        assert!(q.revealed());
        q.grade(Grade::Good).unwrap();
        assert!(!q.revealed());
    }

    #[test]
    fn test_step_back_on_empty_history_is_noop() {
        let mut q = PracticeQueue::new("deck", vec![card(1, "a")]);
        q.step_back();
        assert_eq!(queue_ids(&q), vec![1]);
        assert_eq!(q.seen_count(), 0);
    }

    #[test]
    fn test_step_back_restores_retired_card_at_front() {
        let mut q = PracticeQueue::new("deck", vec![card(1, "a"), card(2, "b")]);
        q.grade(Grade::Good).unwrap();
        assert_eq!(queue_ids(&q), vec![2]);
        q.step_back();
        assert_eq!(queue_ids(&q), vec![1, 2]);
        assert_eq!(q.current().unwrap().id, 1);
        assert_eq!(q.seen_count(), 0);
    }

    #[test]
    fn test_step_back_after_again_removes_the_duplicate() {
        // Pool [A, B]: again(A) -> [B, A]; good(B) -> [A]; step_back
        // must restore [B, A] with B current and one grade on record.
        let mut q = PracticeQueue::new("deck", vec![card(1, "a"), card(2, "b")]);
        q.grade(Grade::Again).unwrap();
        assert_eq!(queue_ids(&q), vec![2, 1]);
        q.grade(Grade::Good).unwrap();
        assert_eq!(queue_ids(&q), vec![1]);
        q.step_back();
        assert_eq!(queue_ids(&q), vec![2, 1]);
        assert_eq!(q.current().unwrap().id, 2);
        assert_eq!(q.seen_count(), 1);
    }

    #[test]
    fn test_step_back_after_again_on_single_card_leaves_no_duplicate() {
        // Pool [A]: again(A) -> [A]; step_back -> [A], not [A, A].
        let mut q = PracticeQueue::new("deck", vec![card(1, "a")]);
        q.grade(Grade::Again).unwrap();
        assert_eq!(queue_ids(&q), vec![1]);
        q.step_back();
        assert_eq!(queue_ids(&q), vec![1]);
        assert_eq!(q.current().unwrap().id, 1);
        assert_eq!(q.seen_count(), 0);
    }

    #[test]
    fn test_step_back_to_start_restores_original_order() {
        let pool = vec![card(1, "a"), card(2, "b"), card(3, "c")];
        let mut q = PracticeQueue::new("deck", pool);
        q.grade(Grade::Again).unwrap();
        q.grade(Grade::Good).unwrap();
        q.grade(Grade::Easy).unwrap();
        q.step_back();
        q.step_back();
        q.step_back();
        q.step_back(); // extra press at the start is a no-op
        assert_eq!(queue_ids(&q), vec![1, 2, 3]);
        assert_eq!(q.current().unwrap().id, 1);
        assert_eq!(q.seen_count(), 0);
    }

    #[test]
    fn test_duplicate_fronts_are_not_confused_on_undo() {
        // Two cards with identical text; only ids tell them apart.
        let mut a = card(1, "same");
        let b = card(2, "same");
        a.back = b.back.clone();
        let mut q = PracticeQueue::new("deck", vec![a, b]);

        q.grade(Grade::Again).unwrap(); // [2, 1]
        q.grade(Grade::Again).unwrap(); // [1, 2]
        q.step_back();
        // Card 2's duplicate is removed, not card 1's entry.
        assert_eq!(queue_ids(&q), vec![2, 1]);
        assert_eq!(q.seen_count(), 1);
    }

    #[test]
    fn test_position_line_counts_requeues() {
        let mut q = PracticeQueue::new("deck", vec![card(1, "a"), card(2, "b")]);
        assert_eq!(q.total(), 2);
        q.grade(Grade::Again).unwrap();
        // One seen, two still queued (b plus the requeued a).
        assert_eq!(q.seen_count(), 1);
        assert_eq!(q.total(), 3);
    }

    #[test]
    fn test_grade_ratings_match_wire_values() {
        assert_eq!(Grade::Again.rating(), 1);
        assert_eq!(Grade::Hard.rating(), 2);
        assert_eq!(Grade::Good.rating(), 3);
        assert_eq!(Grade::Easy.rating(), 4);
        assert_eq!(Grade::from_key('1'), Some(Grade::Again));
        assert_eq!(Grade::from_key('4'), Some(Grade::Easy));
        assert_eq!(Grade::from_key('5'), None);
    }
}
