use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;
use crate::api::models::{
    BulkCreateRequest, Card, CreateDeckRequest, Deck, GenerateRequest, GenerateResponse,
    GeneratedCard, NewCard, PracticeCard, PracticePool, ReviewAnswer, ReviewCard, ReviewOutcome,
    ReviewSummary, Source, SourceChunk,
};

/// Blocking client for the Study Wire backend. One instance lives on the
/// app for the whole run; calls happen inline between draws.
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn review_summary(&self) -> Result<ReviewSummary, ApiError> {
        self.get_json("/review/summary")
    }

    /// The next due card, or None when nothing is due (backend replies 404).
    pub fn next_review_card(&self) -> Result<Option<ReviewCard>, ApiError> {
        let resp = self
            .http
            .get(format!("{}/review/next", self.base_url))
            .send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check_status(resp)?;
        Ok(Some(resp.json()?))
    }

    pub fn answer_review(
        &self,
        card_id: i64,
        rating: u8,
        duration_ms: u64,
    ) -> Result<ReviewOutcome, ApiError> {
        let body = ReviewAnswer {
            card_id,
            rating,
            duration_ms,
        };
        self.post_json("/review/answer", &body)
    }

    pub fn list_decks(&self) -> Result<Vec<Deck>, ApiError> {
        self.get_json("/decks")
    }

    pub fn create_deck(&self, name: &str, description: &str) -> Result<Deck, ApiError> {
        let body = CreateDeckRequest {
            name: name.to_string(),
            description: description.to_string(),
        };
        self.post_json("/decks", &body)
    }

    pub fn list_cards(&self, deck_id: Option<i64>) -> Result<Vec<Card>, ApiError> {
        let mut req = self.http.get(format!("{}/cards", self.base_url));
        if let Some(id) = deck_id {
            req = req.query(&[("deck_id", id)]);
        }
        let resp = Self::check_status(req.send()?)?;
        Ok(resp.json()?)
    }

    pub fn delete_card(&self, card_id: i64) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(format!("{}/cards/{card_id}", self.base_url))
            .send()?;
        Self::check_status(resp)?;
        Ok(())
    }

    pub fn bulk_create_cards(
        &self,
        deck_id: i64,
        cards: Vec<NewCard>,
    ) -> Result<Vec<Card>, ApiError> {
        let body = BulkCreateRequest { deck_id, cards };
        self.post_json("/cards/bulk_create", &body)
    }

    pub fn list_sources(&self) -> Result<Vec<Source>, ApiError> {
        self.get_json("/sources")
    }

    pub fn source_chunks(&self, source_id: i64) -> Result<Vec<SourceChunk>, ApiError> {
        self.get_json(&format!("/sources/{source_id}/chunks"))
    }

    pub fn generate_cards(&self, req: &GenerateRequest) -> Result<Vec<GeneratedCard>, ApiError> {
        let resp: GenerateResponse = self.post_json("/generate_cards", req)?;
        Ok(resp.cards)
    }

    pub fn practice_cards(
        &self,
        deck_id: i64,
        pool: PracticePool,
        limit: Option<usize>,
    ) -> Result<Vec<PracticeCard>, ApiError> {
        let mut req = self
            .http
            .get(format!("{}/practice/cards", self.base_url))
            .query(&[("deck_id", deck_id.to_string()), ("pool", pool.as_str().to_string())]);
        if let Some(limit) = limit {
            req = req.query(&[("limit", limit)]);
        }
        let resp = Self::check_status(req.send()?)?;
        Ok(resp.json()?)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self
            .http
            .get(format!("{}{path}", self.base_url))
            .send()?;
        let resp = Self::check_status(resp)?;
        Ok(resp.json()?)
    }

    fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()?;
        let resp = Self::check_status(resp)?;
        Ok(resp.json()?)
    }

    fn check_status(resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                body: resp.text().unwrap_or_default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://127.0.0.1:8000/api/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8000/api");
    }
}
