use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize)]
pub struct Deck {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Card {
    pub id: i64,
    pub deck_id: i64,
    pub front: String,
    pub back: String,
    #[serde(default = "default_card_type")]
    pub card_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source_id: Option<i64>,
    #[serde(default)]
    pub source_chunk_id: Option<i64>,
    // The backend serializes naive UTC timestamps (no offset).
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

fn default_card_type() -> String {
    "basic".to_string()
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ReviewSummary {
    pub due_count: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReviewCard {
    pub card_id: i64,
    pub deck_id: i64,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub source_id: Option<i64>,
    #[serde(default)]
    pub source_chunk_id: Option<i64>,
    pub due: NaiveDate,
    pub interval: i64,
    pub ease_factor: f64,
    pub repetitions: i64,
    pub lapses: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReviewAnswer {
    pub card_id: i64,
    pub rating: u8,
    pub duration_ms: u64,
}

/// Opaque result of the server-side schedule update. Displayed, never
/// interpreted.
#[derive(Clone, Debug, Deserialize)]
pub struct ReviewOutcome {
    pub status: String,
    pub card_id: i64,
    pub next_due: NaiveDate,
    pub interval: i64,
    pub ease_factor: f64,
    pub repetitions: i64,
    pub lapses: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PracticeCard {
    pub id: i64,
    pub deck_id: i64,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub source_id: Option<i64>,
    #[serde(default)]
    pub source_chunk_id: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PracticePool {
    DueRecent,
    All,
    NewOnly,
}

impl PracticePool {
    /// Query-string value understood by the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            PracticePool::DueRecent => "due_recent",
            PracticePool::All => "all",
            PracticePool::NewOnly => "new_only",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PracticePool::DueRecent => "Due + recent",
            PracticePool::All => "All cards in deck",
            PracticePool::NewOnly => "Only new cards",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "due_recent" => Some(PracticePool::DueRecent),
            "all" => Some(PracticePool::All),
            "new_only" => Some(PracticePool::NewOnly),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            PracticePool::DueRecent => PracticePool::All,
            PracticePool::All => PracticePool::NewOnly,
            PracticePool::NewOnly => PracticePool::DueRecent,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Source {
    pub id: i64,
    pub path: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SourceChunk {
    pub id: i64,
    pub kind: String,
    pub loc: String,
    pub text: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GeneratedCard {
    pub front: String,
    pub back: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct NewCard {
    pub front: String,
    pub back: String,
    pub card_type: String,
    pub tags: Vec<String>,
    pub source_id: Option<i64>,
    pub source_chunk_id: Option<i64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GenerateRequest {
    pub source_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_ids: Option<Vec<i64>>,
    pub num_cards: usize,
    pub temperature: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GenerateResponse {
    pub cards: Vec<GeneratedCard>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CreateDeckRequest {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct BulkCreateRequest {
    pub deck_id: i64,
    pub cards: Vec<NewCard>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_parses_backend_timestamps() {
        // FastAPI emits naive isoformat timestamps with microseconds.
        let json = r#"{
            "id": 7,
            "deck_id": 2,
            "front": "What is ease factor?",
            "back": "The multiplier applied to the interval.",
            "card_type": "basic",
            "tags": ["auto"],
            "source_id": 3,
            "source_chunk_id": null,
            "created_at": "2026-08-01T09:15:30.123456",
            "updated_at": "2026-08-02T10:00:00"
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.id, 7);
        assert_eq!(card.tags, vec!["auto"]);
        assert_eq!(card.source_id, Some(3));
        assert_eq!(card.source_chunk_id, None);
    }

    #[test]
    fn test_card_defaults_for_omitted_fields() {
        let json = r#"{
            "id": 1,
            "deck_id": 1,
            "front": "f",
            "back": "b",
            "created_at": "2026-08-01T00:00:00",
            "updated_at": "2026-08-01T00:00:00"
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.card_type, "basic");
        assert!(card.tags.is_empty());
        assert!(card.source_id.is_none());
    }

    #[test]
    fn test_review_card_parses_date_due() {
        let json = r#"{
            "card_id": 4,
            "deck_id": 1,
            "front": "f",
            "back": "b",
            "source_id": null,
            "source_chunk_id": null,
            "due": "2026-08-05",
            "interval": 6,
            "ease_factor": 2.5,
            "repetitions": 2,
            "lapses": 0
        }"#;
        let card: ReviewCard = serde_json::from_str(json).unwrap();
        assert_eq!(card.due, NaiveDate::from_ymd_opt(2026, 8, 5).unwrap());
        assert_eq!(card.interval, 6);
    }

    #[test]
    fn test_source_type_field_renamed() {
        let json = r#"{"id": 1, "path": "notes/algo.md", "title": "Algorithms", "type": "markdown"}"#;
        let source: Source = serde_json::from_str(json).unwrap();
        assert_eq!(source.kind, "markdown");
    }

    #[test]
    fn test_generate_request_omits_empty_chunk_ids() {
        let req = GenerateRequest {
            source_id: 5,
            chunk_ids: None,
            num_cards: 5,
            temperature: 0.7,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("chunk_ids"));

        let req = GenerateRequest {
            chunk_ids: Some(vec![1, 2]),
            ..req
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"chunk_ids\":[1,2]"));
    }

    #[test]
    fn test_practice_pool_round_trip() {
        for pool in [
            PracticePool::DueRecent,
            PracticePool::All,
            PracticePool::NewOnly,
        ] {
            assert_eq!(PracticePool::from_str(pool.as_str()), Some(pool));
        }
        assert_eq!(PracticePool::from_str("bogus"), None);
        // Cycling visits every pool and wraps.
        let start = PracticePool::DueRecent;
        assert_eq!(start.next().next().next(), start);
    }
}
