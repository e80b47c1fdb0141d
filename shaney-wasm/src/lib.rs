//! WASM bindings for shaney: powers the browser quote page.

use wasm_bindgen::prelude::*;

use shaney::core::quote::ShaneyBot;
use shaney::schema::order::Order;

// ---------------------------------------------------------------------------
// Embedded sample corpus, compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const HARBOR_CORPUS: &str = include_str!("../../corpus/harbor.txt");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct StatsInfo {
    order: u8,
    windows: usize,
    followers: usize,
    endings: usize,
    mean_followers: f64,
    verdict: &'static str,
}

fn parse_order(order: u8) -> Result<Order, JsError> {
    Order::try_from(order).map_err(|e| JsError::new(&e.to_string()))
}

// ---------------------------------------------------------------------------
// ShaneyDemo: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct ShaneyDemo {
    bot: ShaneyBot,
}

#[wasm_bindgen]
impl ShaneyDemo {
    /// Train on `corpus` (or the built-in sample when empty).
    #[wasm_bindgen(constructor)]
    pub fn new(corpus: &str, order: u8, seed: u64) -> Result<ShaneyDemo, JsError> {
        let text = if corpus.trim().is_empty() {
            data::HARBOR_CORPUS
        } else {
            corpus
        };
        let bot = ShaneyBot::new(text, parse_order(order)?, seed)
            .map_err(|e| JsError::new(&format!("Training error: {e}")))?;
        Ok(ShaneyDemo { bot })
    }

    /// Limit quotes to `limit` words; 0 removes the limit.
    pub fn set_word_limit(&mut self, limit: usize) {
        self.bot.set_word_limit(Some(limit));
    }

    /// One generated sentence. Never fails; falls back to a fixed message.
    pub fn quote(&mut self) -> String {
        self.bot.quote()
    }

    /// Generate `count` sentences. Returns a JSON array of strings.
    pub fn sentences(&mut self, count: usize) -> Result<String, JsError> {
        let sentences = self
            .bot
            .sentences(count)
            .map_err(|e| JsError::new(&format!("Generation error: {e}")))?;
        serde_json::to_string(&sentences)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Return a JSON description of the trained model.
    pub fn stats(&self) -> Result<String, JsError> {
        let model = self.bot.model();
        let stats = model.stats();
        let info = StatsInfo {
            order: model.order().into(),
            windows: stats.windows,
            followers: stats.followers,
            endings: stats.endings,
            mean_followers: stats.mean_followers,
            verdict: stats.quality().describe(),
        };
        serde_json::to_string(&info)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Retrain on new text, keeping the current model if training fails.
    pub fn retrain(&mut self, corpus: &str, order: u8) -> Result<(), JsError> {
        self.bot
            .retrain(corpus, parse_order(order)?)
            .map_err(|e| JsError::new(&format!("Training error: {e}")))
    }

    /// Return JSON array of supported orders.
    pub fn orders() -> String {
        serde_json::to_string(&[2u8, 3u8]).unwrap_or_else(|_| "[]".to_string())
    }
}
