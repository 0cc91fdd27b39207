use std::time::{Duration, Instant};

use studywire::api::models::PracticeCard;
use studywire::session::practice::{Grade, PracticeQueue};
use studywire::ui::disclosure::Disclosure;

fn card(id: i64, front: &str, back: &str) -> PracticeCard {
    PracticeCard {
        id,
        deck_id: 1,
        front: front.to_string(),
        back: back.to_string(),
        source_id: None,
        source_chunk_id: None,
    }
}

fn pool() -> Vec<PracticeCard> {
    vec![
        card(1, "What is an interval?", "Days until the card is due again."),
        card(2, "What is a lapse?", "A failed review of a learned card."),
        card(3, "What is ease?", "The interval growth multiplier."),
    ]
}

/// Drive a full session the way the practice screen does: reveal, grade,
/// occasionally miss, occasionally undo. The queue must drain and the
/// bookkeeping must stay consistent at every step.
#[test]
fn full_practice_session_with_misses_and_undo() {
    let mut queue = PracticeQueue::new("Concepts", pool());
    assert_eq!(queue.current().unwrap().id, 1);
    assert_eq!(queue.total(), 3);

    // Miss the first card; it moves behind the other two.
    queue.reveal();
    queue.grade(Grade::Again).unwrap();
    assert_eq!(queue.current().unwrap().id, 2);
    assert_eq!(queue.total(), 4);

    // Second thoughts: undo the miss. Card 1 is current again and its
    // requeued copy is gone.
    queue.step_back();
    assert_eq!(queue.current().unwrap().id, 1);
    assert_eq!(queue.total(), 3);
    assert_eq!(queue.seen_count(), 0);

    // Grade through the whole pool, missing card 2 once.
    queue.reveal();
    queue.grade(Grade::Good).unwrap();
    queue.reveal();
    queue.grade(Grade::Again).unwrap();
    queue.reveal();
    queue.grade(Grade::Easy).unwrap();
    assert_eq!(queue.current().unwrap().id, 2, "missed card comes around");
    assert!(!queue.is_finished());

    queue.reveal();
    queue.grade(Grade::Hard).unwrap();
    assert!(queue.is_finished());
    assert_eq!(queue.seen_count(), 4);
}

#[test]
fn undo_all_the_way_back_restores_initial_order() {
    let mut queue = PracticeQueue::new("Concepts", pool());

    queue.grade(Grade::Again).unwrap();
    queue.grade(Grade::Good).unwrap();
    queue.grade(Grade::Again).unwrap();
    queue.grade(Grade::Good).unwrap();

    for _ in 0..10 {
        queue.step_back();
    }

    assert_eq!(queue.seen_count(), 0);
    let ids: Vec<i64> = std::iter::from_fn({
        let mut q = queue;
        move || {
            let id = q.current()?.id;
            q.grade(Grade::Good).unwrap();
            Some(id)
        }
    })
    .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

/// The reveal flow as the practice screen runs it: the answer panel is a
/// fresh disclosure per card, opened on reveal, and rapid hide/show
/// requests coalesce to the last one.
#[test]
fn answer_reveal_settles_to_last_request() {
    let t0 = Instant::now();
    let dur = Duration::from_millis(200);
    let mut panel = Disclosure::new(false, 6, dur);

    // Reveal, then immediately hide, then reveal again while the first
    // animation is still running.
    panel.set_open(true, t0);
    panel.set_open(false, t0 + Duration::from_millis(30));
    panel.set_open(true, t0 + Duration::from_millis(60));

    let mut settles = Vec::new();
    for ms in [100u64, 200, 300, 400, 500, 600] {
        if let Some(s) = panel.tick(t0 + Duration::from_millis(ms)) {
            settles.push(s);
        }
    }
    assert_eq!(settles, vec![true]);
    assert!(panel.is_open());
    assert_eq!(panel.extent(t0 + Duration::from_millis(700)), 6);
}

#[test]
fn answer_hidden_before_settle_never_reports_open() {
    let t0 = Instant::now();
    let mut panel = Disclosure::new(false, 6, Duration::from_millis(200));

    panel.set_open(true, t0);
    panel.set_open(false, t0 + Duration::from_millis(50));

    let mut settles = Vec::new();
    for ms in (0..1000).step_by(33) {
        if let Some(s) = panel.tick(t0 + Duration::from_millis(ms)) {
            settles.push(s);
        }
    }
    assert_eq!(settles, vec![false]);
    assert!(!panel.is_mounted());
}

/// Async content growth while the reveal is animating: the target follows
/// the measured extent, the deadline does not move.
#[test]
fn content_loading_during_reveal_does_not_clip() {
    let t0 = Instant::now();
    let mut panel = Disclosure::new(false, 2, Duration::from_millis(200));

    panel.set_open(true, t0);
    panel.content_resized(5);
    panel.content_resized(9);

    assert_eq!(panel.tick(t0 + Duration::from_millis(200)), Some(true));
    assert_eq!(panel.extent(t0 + Duration::from_millis(200)), 9);
}
