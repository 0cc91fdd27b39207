use std::collections::HashSet;
use std::time::{Duration, Instant};

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use ratatui::layout::Rect;

use crate::api::models::{
    Card, Deck, GenerateRequest, GeneratedCard, NewCard, PracticePool, Source, SourceChunk,
};
use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::session::practice::{Grade, PracticeQueue};
use crate::session::review::ReviewSession;
use crate::ui::components::card_panel::CardPanel;
use crate::ui::components::menu::Menu;
use crate::ui::disclosure::Disclosure;
use crate::ui::layout::{self, AppLayout, wrapped_line_count};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Review,
    PracticeSetup,
    Practice,
    PracticeDone,
    Cards,
    Generate,
    Settings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratePane {
    Sources,
    Chunks,
    Candidates,
}

pub struct Status {
    pub text: String,
    pub error: bool,
    at: Instant,
}

const STATUS_TTL: Duration = Duration::from_secs(5);

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub api: ApiClient,
    pub menu: Menu<'static>,
    pub should_quit: bool,
    pub status: Option<Status>,

    // Review ("Today")
    pub review: ReviewSession,
    pub review_panel: Disclosure,

    // Practice setup + session
    pub decks: Vec<Deck>,
    pub deck_selected: usize,
    pub setup_pool: PracticePool,
    pub setup_shuffle: bool,
    pub setup_limit: usize,
    pub practice: Option<PracticeQueue>,
    pub practice_panel: Disclosure,

    // Cards browser
    pub cards: Vec<Card>,
    pub card_selected: usize,
    pub card_confirm_delete: bool,
    pub deck_input: Option<LineInput>,

    // Generate workspace
    pub gen_pane: GeneratePane,
    pub sources: Vec<Source>,
    pub source_selected: usize,
    pub source_filter: String,
    pub filter_input: Option<LineInput>,
    pub chunks: Vec<SourceChunk>,
    pub chunks_source_id: Option<i64>,
    pub chunk_selected: usize,
    pub chunk_marked: HashSet<i64>,
    pub chunk_expanded: Option<usize>,
    pub chunk_panel: Disclosure,
    pub candidates: Vec<(GeneratedCard, bool)>,
    pub candidate_selected: usize,
    pub gen_deck_selected: usize,

    // Settings
    pub settings_selected: usize,
    pub server_input: Option<LineInput>,

    rng: SmallRng,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let menu = Menu::new(theme);
        let api = ApiClient::new(&config.server_url)?;
        let reveal = Duration::from_millis(config.reveal_ms);
        let setup_pool = config.pool();
        let setup_shuffle = config.practice_shuffle;
        let setup_limit = config.practice_limit;

        Ok(Self {
            screen: AppScreen::Menu,
            config,
            theme,
            api,
            menu,
            should_quit: false,
            status: None,
            review: ReviewSession::new(),
            review_panel: Disclosure::new(false, 1, reveal),
            decks: Vec::new(),
            deck_selected: 0,
            setup_pool,
            setup_shuffle,
            setup_limit,
            practice: None,
            practice_panel: Disclosure::new(false, 1, reveal),
            cards: Vec::new(),
            card_selected: 0,
            card_confirm_delete: false,
            deck_input: None,
            gen_pane: GeneratePane::Sources,
            sources: Vec::new(),
            source_selected: 0,
            source_filter: String::new(),
            filter_input: None,
            chunks: Vec::new(),
            chunks_source_id: None,
            chunk_selected: 0,
            chunk_marked: HashSet::new(),
            chunk_expanded: None,
            chunk_panel: Disclosure::new(false, 1, reveal),
            candidates: Vec::new(),
            candidate_selected: 0,
            gen_deck_selected: 0,
            settings_selected: 0,
            server_input: None,
            rng: SmallRng::from_entropy(),
        })
    }

    fn reveal_duration(&self) -> Duration {
        Duration::from_millis(self.config.reveal_ms)
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            error: false,
            at: Instant::now(),
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            error: true,
            at: Instant::now(),
        });
    }

    fn report(&mut self, context: &str, err: ApiError) {
        self.set_error(format!("{context}: {err}"));
    }

    /// Advance animations and expire the status line. Settle notifications
    /// from the chunk popup tear down the expanded view once the collapse
    /// has finished.
    pub fn on_tick(&mut self, now: Instant) {
        let _ = self.review_panel.tick(now);
        let _ = self.practice_panel.tick(now);
        if self.chunk_panel.tick(now) == Some(false) {
            self.chunk_expanded = None;
        }
        if let Some(status) = &self.status {
            if now.saturating_duration_since(status.at) >= STATUS_TTL {
                self.status = None;
            }
        }
    }

    /// Report measured natural extents to whichever disclosure is on
    /// screen. Called before each draw with the current terminal size, so
    /// resizes and content changes mid-animation retarget smoothly.
    pub fn sync_extents(&mut self, width: u16, height: u16) {
        let area = Rect::new(0, 0, width, height);
        let app_layout = AppLayout::new(area);
        match self.screen {
            AppScreen::Review => {
                if let Some(card) = &self.review.card {
                    self.review_panel
                        .content_resized(CardPanel::back_rows(&card.back, app_layout.main.width));
                }
            }
            AppScreen::Practice => {
                if let Some(card) = self.practice.as_ref().and_then(|q| q.current()) {
                    let rows = CardPanel::back_rows(&card.back, app_layout.main.width);
                    self.practice_panel.content_resized(rows);
                }
            }
            AppScreen::Generate => {
                if let Some(chunk) = self.chunk_expanded.and_then(|i| self.chunks.get(i)) {
                    let popup = layout::centered_rect(70, 60, area);
                    let text_width = popup.width.saturating_sub(2) as usize;
                    let rows = (wrapped_line_count(&chunk.text, text_width) as u16)
                        .min(popup.height.saturating_sub(2));
                    self.chunk_panel.content_resized(rows);
                }
            }
            _ => {}
        }
    }

    pub fn go_to_menu(&mut self) {
        self.screen = AppScreen::Menu;
    }

    // ---- Review ----

    pub fn go_to_review(&mut self) {
        self.screen = AppScreen::Review;
        self.review = ReviewSession::new();
        self.review_panel = Disclosure::new(false, 1, self.reveal_duration());
        match self.api.review_summary() {
            Ok(summary) => self.review.apply_summary(summary),
            Err(e) => self.report("Failed to load summary", e),
        }
    }

    pub fn review_next_card(&mut self, now: Instant) {
        match self.api.next_review_card() {
            Ok(card) => {
                self.review.show_card(card, now);
                self.review_panel = Disclosure::new(false, 1, self.reveal_duration());
                match self.api.review_summary() {
                    Ok(summary) => self.review.apply_summary(summary),
                    Err(e) => self.report("Failed to load summary", e),
                }
            }
            Err(e) => self.report("Failed to load next card", e),
        }
    }

    pub fn review_toggle_answer(&mut self, now: Instant) {
        if self.review.card.is_none() {
            return;
        }
        if self.review_panel.desired_open() {
            self.review_panel.set_open(false, now);
        } else {
            self.review.reveal();
            self.review_panel.set_open(true, now);
        }
    }

    pub fn review_grade(&mut self, grade: Grade, now: Instant) {
        let Some(card) = &self.review.card else {
            return;
        };
        if !self.review.revealed {
            return;
        }
        let card_id = card.card_id;
        let duration_ms = self.review.duration_ms(now);
        match self.api.answer_review(card_id, grade.rating(), duration_ms) {
            Ok(outcome) => {
                self.set_status(format!("{}: next due {}", grade.label(), outcome.next_due));
                self.review.record_outcome(outcome);
                self.review_next_card(now);
            }
            Err(e) => self.report("Failed to submit review", e),
        }
    }

    // ---- Practice ----

    pub fn go_to_practice_setup(&mut self) {
        self.screen = AppScreen::PracticeSetup;
        self.practice = None;
        if self.decks.is_empty() {
            self.load_decks();
        }
    }

    pub fn load_decks(&mut self) {
        match self.api.list_decks() {
            Ok(decks) => {
                self.decks = decks;
                self.deck_selected = self.deck_selected.min(self.decks.len().saturating_sub(1));
                self.gen_deck_selected =
                    self.gen_deck_selected.min(self.decks.len().saturating_sub(1));
            }
            Err(e) => self.report("Failed to load decks", e),
        }
    }

    pub fn cycle_setup_pool(&mut self) {
        self.setup_pool = self.setup_pool.next();
    }

    pub fn adjust_setup_limit(&mut self, delta: isize) {
        let limit = self.setup_limit as isize + delta * 5;
        self.setup_limit = limit.clamp(0, 500) as usize;
    }

    pub fn start_practice(&mut self) {
        let Some(deck) = self.decks.get(self.deck_selected) else {
            self.set_error("Select a deck to practice.");
            return;
        };
        let deck_id = deck.id;
        let deck_name = deck.name.clone();
        let limit = (self.setup_limit > 0).then_some(self.setup_limit);
        match self.api.practice_cards(deck_id, self.setup_pool, limit) {
            Ok(mut cards) => {
                if cards.is_empty() {
                    self.set_error("No cards available for this practice selection.");
                    return;
                }
                if self.setup_shuffle {
                    cards.shuffle(&mut self.rng);
                }
                self.practice = Some(PracticeQueue::new(&deck_name, cards));
                self.practice_panel = Disclosure::new(false, 1, self.reveal_duration());
                self.screen = AppScreen::Practice;
            }
            Err(e) => self.report("Failed to load practice cards", e),
        }
    }

    pub fn practice_toggle_answer(&mut self, now: Instant) {
        let Some(queue) = &mut self.practice else {
            return;
        };
        if queue.current().is_none() {
            return;
        }
        if self.practice_panel.desired_open() {
            self.practice_panel.set_open(false, now);
        } else {
            queue.reveal();
            self.practice_panel.set_open(true, now);
        }
    }

    pub fn practice_grade(&mut self, grade: Grade) {
        let Some(queue) = &mut self.practice else {
            return;
        };
        if !queue.revealed() {
            return;
        }
        match queue.grade(grade) {
            Ok(()) => {
                let finished = queue.is_finished();
                // Next card starts hidden; no closing animation on advance.
                self.practice_panel = Disclosure::new(false, 1, self.reveal_duration());
                if finished {
                    self.screen = AppScreen::PracticeDone;
                }
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub fn practice_step_back(&mut self) {
        let Some(queue) = &mut self.practice else {
            return;
        };
        queue.step_back();
        self.practice_panel = Disclosure::new(false, 1, self.reveal_duration());
    }

    pub fn end_practice(&mut self) {
        self.practice = None;
        self.screen = AppScreen::PracticeSetup;
    }

    // ---- Cards ----

    pub fn go_to_cards(&mut self) {
        self.screen = AppScreen::Cards;
        self.card_confirm_delete = false;
        if self.decks.is_empty() {
            self.load_decks();
        }
        self.load_cards();
    }

    pub fn load_cards(&mut self) {
        let deck_id = self.decks.get(self.deck_selected).map(|d| d.id);
        if deck_id.is_none() {
            self.cards.clear();
            return;
        }
        match self.api.list_cards(deck_id) {
            Ok(cards) => {
                self.cards = cards;
                self.card_selected = self.card_selected.min(self.cards.len().saturating_sub(1));
            }
            Err(e) => self.report("Failed to load cards", e),
        }
    }

    pub fn cycle_cards_deck(&mut self, forward: bool) {
        if self.decks.is_empty() {
            return;
        }
        let len = self.decks.len();
        self.deck_selected = if forward {
            (self.deck_selected + 1) % len
        } else {
            (self.deck_selected + len - 1) % len
        };
        self.card_selected = 0;
        self.load_cards();
    }

    pub fn delete_selected_card(&mut self) {
        let Some(card) = self.cards.get(self.card_selected) else {
            return;
        };
        let card_id = card.id;
        match self.api.delete_card(card_id) {
            Ok(()) => {
                self.cards.retain(|c| c.id != card_id);
                self.card_selected = self.card_selected.min(self.cards.len().saturating_sub(1));
                self.set_status(format!("Deleted card {card_id}."));
            }
            Err(e) => self.report("Failed to delete card", e),
        }
    }

    pub fn create_deck(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            self.set_error("Deck name cannot be empty.");
            return;
        }
        match self.api.create_deck(name, "") {
            Ok(deck) => {
                self.set_status(format!("Created deck \"{}\".", deck.name));
                self.decks.push(deck);
                self.deck_selected = self.decks.len() - 1;
                self.load_cards();
            }
            Err(e) => self.report("Failed to create deck", e),
        }
    }

    // ---- Generate ----

    pub fn go_to_generate(&mut self) {
        self.screen = AppScreen::Generate;
        self.gen_pane = GeneratePane::Sources;
        if self.decks.is_empty() {
            self.load_decks();
        }
        if self.sources.is_empty() {
            self.load_sources();
        }
    }

    pub fn load_sources(&mut self) {
        match self.api.list_sources() {
            Ok(sources) => {
                self.sources = sources;
                self.source_selected = 0;
            }
            Err(e) => self.report("Failed to load sources", e),
        }
    }

    /// Sources matching the current filter, by title or path.
    pub fn filtered_sources(&self) -> Vec<&Source> {
        let filter = self.source_filter.to_lowercase();
        self.sources
            .iter()
            .filter(|s| {
                filter.is_empty()
                    || s.title.to_lowercase().contains(&filter)
                    || s.path.to_lowercase().contains(&filter)
            })
            .collect()
    }

    pub fn open_selected_source(&mut self) {
        let Some(source) = self.filtered_sources().get(self.source_selected).copied() else {
            return;
        };
        let source_id = source.id;
        match self.api.source_chunks(source_id) {
            Ok(chunks) => {
                // Preselect the first few chunks for convenience.
                self.chunk_marked = chunks.iter().take(3).map(|c| c.id).collect();
                self.chunks = chunks;
                self.chunks_source_id = Some(source_id);
                self.chunk_selected = 0;
                self.chunk_expanded = None;
                self.candidates.clear();
                self.gen_pane = GeneratePane::Chunks;
            }
            Err(e) => self.report("Failed to load chunks", e),
        }
    }

    pub fn toggle_chunk_mark(&mut self) {
        if let Some(chunk) = self.chunks.get(self.chunk_selected) {
            if !self.chunk_marked.insert(chunk.id) {
                self.chunk_marked.remove(&chunk.id);
            }
        }
    }

    pub fn mark_all_chunks(&mut self) {
        self.chunk_marked = self.chunks.iter().map(|c| c.id).collect();
    }

    pub fn clear_chunk_marks(&mut self) {
        self.chunk_marked.clear();
    }

    /// Expand/collapse the selected chunk's full text in an animated popup.
    pub fn toggle_chunk_expand(&mut self, now: Instant) {
        if self.chunks.is_empty() {
            return;
        }
        match self.chunk_expanded {
            Some(idx) if idx == self.chunk_selected => {
                // Collapse; the popup unmounts when the close settles.
                self.chunk_panel.set_open(false, now);
            }
            _ => {
                self.chunk_expanded = Some(self.chunk_selected);
                self.chunk_panel = Disclosure::new(false, 1, self.reveal_duration());
                self.chunk_panel.set_open(true, now);
            }
        }
    }

    pub fn generate_candidates(&mut self) {
        let Some(source_id) = self.chunks_source_id else {
            self.set_error("Open a source first.");
            return;
        };
        if self.decks.is_empty() {
            self.set_error("Create a deck first.");
            return;
        }
        let chunk_ids: Vec<i64> = self
            .chunks
            .iter()
            .filter(|c| self.chunk_marked.contains(&c.id))
            .map(|c| c.id)
            .collect();
        let req = GenerateRequest {
            source_id,
            chunk_ids: (!chunk_ids.is_empty()).then_some(chunk_ids),
            num_cards: self.config.generate_cards,
            temperature: self.config.generate_temperature,
        };
        match self.api.generate_cards(&req) {
            Ok(cards) => {
                self.set_status(format!("Generated {} cards.", cards.len()));
                self.candidates = cards.into_iter().map(|c| (c, true)).collect();
                self.candidate_selected = 0;
                if !self.candidates.is_empty() {
                    self.gen_pane = GeneratePane::Candidates;
                }
            }
            Err(e) => self.report("Failed to generate cards", e),
        }
    }

    pub fn toggle_candidate(&mut self) {
        if let Some((_, keep)) = self.candidates.get_mut(self.candidate_selected) {
            *keep = !*keep;
        }
    }

    pub fn cycle_gen_deck(&mut self, forward: bool) {
        if self.decks.is_empty() {
            return;
        }
        let len = self.decks.len();
        self.gen_deck_selected = if forward {
            (self.gen_deck_selected + 1) % len
        } else {
            (self.gen_deck_selected + len - 1) % len
        };
    }

    pub fn save_candidates(&mut self) {
        let Some(deck) = self.decks.get(self.gen_deck_selected) else {
            self.set_error("Select a deck first.");
            return;
        };
        let deck_id = deck.id;
        let source_id = self.chunks_source_id;
        let first_chunk_id = self
            .chunks
            .iter()
            .find(|c| self.chunk_marked.contains(&c.id))
            .map(|c| c.id);
        let kept: Vec<NewCard> = self
            .candidates
            .iter()
            .filter(|(_, keep)| *keep)
            .map(|(c, _)| NewCard {
                front: c.front.clone(),
                back: c.back.clone(),
                card_type: "basic".to_string(),
                tags: vec!["auto".to_string()],
                source_id,
                source_chunk_id: first_chunk_id,
            })
            .collect();
        if kept.is_empty() {
            self.set_error("No generated cards selected to save.");
            return;
        }
        let count = kept.len();
        match self.api.bulk_create_cards(deck_id, kept) {
            Ok(_) => {
                self.set_status(format!("Saved {count} cards to deck {deck_id}."));
                self.candidates.clear();
                self.gen_pane = GeneratePane::Chunks;
            }
            Err(e) => self.report("Failed to save cards", e),
        }
    }

    // ---- Settings ----

    pub fn go_to_settings(&mut self) {
        self.screen = AppScreen::Settings;
        self.settings_selected = 0;
    }

    pub const SETTINGS_FIELDS: usize = 8;

    pub fn settings_cycle(&mut self, forward: bool) {
        match self.settings_selected {
            0 => {
                // Server URL is edited, not cycled.
                self.server_input = Some(LineInput::new(&self.config.server_url));
            }
            1 => {
                let themes = Theme::available_themes();
                if themes.is_empty() {
                    return;
                }
                let current = themes
                    .iter()
                    .position(|t| *t == self.config.theme)
                    .unwrap_or(0);
                let next = if forward {
                    (current + 1) % themes.len()
                } else {
                    (current + themes.len() - 1) % themes.len()
                };
                self.config.theme = themes[next].clone();
                self.apply_theme();
            }
            2 => {
                let pool = if forward {
                    self.config.pool().next()
                } else {
                    self.config.pool().next().next()
                };
                self.config.practice_pool = pool.as_str().to_string();
                self.setup_pool = pool;
            }
            3 => {
                const LIMITS: [usize; 5] = [0, 10, 20, 50, 100];
                let current = LIMITS
                    .iter()
                    .position(|l| *l == self.config.practice_limit)
                    .unwrap_or(0);
                let next = if forward {
                    (current + 1) % LIMITS.len()
                } else {
                    (current + LIMITS.len() - 1) % LIMITS.len()
                };
                self.config.practice_limit = LIMITS[next];
                self.setup_limit = LIMITS[next];
            }
            4 => {
                self.config.practice_shuffle = !self.config.practice_shuffle;
                self.setup_shuffle = self.config.practice_shuffle;
            }
            5 => {
                const DURATIONS: [u64; 5] = [0, 100, 200, 300, 500];
                let current = DURATIONS
                    .iter()
                    .position(|d| *d == self.config.reveal_ms)
                    .unwrap_or(2);
                let next = if forward {
                    (current + 1) % DURATIONS.len()
                } else {
                    (current + DURATIONS.len() - 1) % DURATIONS.len()
                };
                self.config.reveal_ms = DURATIONS[next];
            }
            6 => {
                let n = self.config.generate_cards as isize + if forward { 1 } else { -1 };
                self.config.generate_cards = n.clamp(1, 50) as usize;
            }
            7 => {
                let t = self.config.generate_temperature + if forward { 0.1 } else { -0.1 };
                self.config.generate_temperature = (t * 10.0).round() / 10.0;
                self.config.generate_temperature = self.config.generate_temperature.clamp(0.0, 1.5);
            }
            _ => {}
        }
    }

    pub fn apply_server_url(&mut self, url: &str) {
        let url = url.trim();
        if url.is_empty() {
            self.set_error("Server URL cannot be empty.");
            return;
        }
        match ApiClient::new(url) {
            Ok(api) => {
                self.api = api;
                self.config.server_url = url.to_string();
                self.set_status("Server URL updated.");
            }
            Err(e) => self.report("Failed to build client", e),
        }
    }

    fn apply_theme(&mut self) {
        if let Some(theme) = Theme::load(&self.config.theme) {
            let theme: &'static Theme = Box::leak(Box::new(theme));
            self.theme = theme;
            self.menu.theme = theme;
        }
    }

    pub fn save_settings(&mut self) {
        self.config.validate();
        if let Err(e) = self.config.save() {
            self.set_error(format!("Failed to save config: {e}"));
        }
    }
}
