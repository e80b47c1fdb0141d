/// Single-sentence quote generation over a shared, immutable model.

use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use crate::core::markov::{MarkovError, MarkovTrainer, Model};
use crate::schema::config::{ShaneyConfig, DEFAULT_MAX_STEPS};
use crate::schema::order::Order;

/// Returned by [`ShaneyBot::quote`] when generation fails.
pub const FALLBACK_QUOTE: &str = "oops. I failed to generate a quote. Try again?";

/// Keep at most `limit` whitespace-separated words of `text`. A limit of 0
/// keeps every word.
pub fn truncate_words(text: &str, limit: usize) -> String {
    if limit == 0 {
        return text.to_string();
    }
    text.split_whitespace()
        .take(limit)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A trained model plus a seeded generator that hands out one sentence at a time.
///
/// The model sits behind an `Arc` so that retraining swaps in a complete new
/// model rather than mutating the one readers hold.
#[derive(Debug, Clone)]
pub struct ShaneyBot {
    model: Arc<Model>,
    seed: u64,
    generation_count: u64,
    word_limit: Option<usize>,
    max_steps: usize,
}

impl ShaneyBot {
    /// Train a bot on `text`.
    pub fn new(text: &str, order: Order, seed: u64) -> Result<Self, MarkovError> {
        let model = MarkovTrainer::train(text, order)?;
        Ok(Self::from_model(Arc::new(model), seed))
    }

    /// Train a bot using the order, seed, limit and budget from `config`.
    pub fn from_config(text: &str, config: &ShaneyConfig) -> Result<Self, MarkovError> {
        let model = MarkovTrainer::train(text, config.order)?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut bot = Self::from_model(Arc::new(model), seed);
        bot.set_word_limit(config.word_limit);
        bot.max_steps = config.max_steps;
        Ok(bot)
    }

    pub fn from_model(model: Arc<Model>, seed: u64) -> Self {
        Self {
            model,
            seed,
            generation_count: 0,
            word_limit: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Limit quotes to `limit` words; 0 removes the limit.
    pub fn with_word_limit(mut self, limit: usize) -> Self {
        self.set_word_limit(Some(limit));
        self
    }

    pub fn set_word_limit(&mut self, limit: Option<usize>) {
        self.word_limit = limit.filter(|&n| n > 0);
    }

    pub fn word_limit(&self) -> Option<usize> {
        self.word_limit
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Replace the model, returning the previous one.
    pub fn replace_model(&mut self, model: Arc<Model>) -> Arc<Model> {
        std::mem::replace(&mut self.model, model)
    }

    /// Retrain on new text. On failure the current model stays in place.
    pub fn retrain(&mut self, text: &str, order: Order) -> Result<(), MarkovError> {
        let model = MarkovTrainer::train(text, order)?;
        self.replace_model(Arc::new(model));
        Ok(())
    }

    fn next_rng(&mut self) -> StdRng {
        let rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.generation_count));
        self.generation_count += 1;
        rng
    }

    /// Generate `count` sentences, trimmed.
    pub fn sentences(&mut self, count: usize) -> Result<Vec<String>, MarkovError> {
        let mut rng = self.next_rng();
        let sentences = self
            .model
            .generate_with_budget(count, self.max_steps, &mut rng)?;
        Ok(sentences.into_iter().map(|s| s.trim().to_string()).collect())
    }

    /// Generate one sentence, truncated to the word limit if set.
    pub fn try_quote(&mut self) -> Result<String, MarkovError> {
        let quote = self
            .sentences(1)?
            .into_iter()
            .next()
            .unwrap_or_default();
        Ok(match self.word_limit {
            Some(limit) => truncate_words(&quote, limit),
            None => quote,
        })
    }

    /// Like [`try_quote`](Self::try_quote), but never fails.
    pub fn quote(&mut self) -> String {
        self.try_quote().unwrap_or_else(|e| {
            warn!("quote generation failed: {}", e);
            FALLBACK_QUOTE.to_string()
        })
    }
}
