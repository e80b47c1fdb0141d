/// Markov chain sentence generator: training, statistics, and the random walk.

use log::{debug, info, trace, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::hash_map::Entry;
use std::fmt;
use thiserror::Error;

use crate::core::ending::is_ending;
use crate::core::tokenizer::tokenize;
use crate::schema::config::DEFAULT_MAX_STEPS;
use crate::schema::order::{InvalidOrder, Order};

#[derive(Debug, Error)]
pub enum MarkovError {
    #[error("no sentence boundaries found in the corpus")]
    NoSentences,
    #[error("{0}")]
    InvalidOrder(#[from] InvalidOrder),
    #[error("generation stalled: no sentence completed within {steps} steps")]
    Stalled { steps: usize },
}

/// `N` consecutive corpus tokens, oldest first. Keys the transition table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Window<const N: usize>([String; N]);

impl<const N: usize> Window<N> {
    pub fn new(tokens: [String; N]) -> Self {
        Self(tokens)
    }

    /// Build a window from exactly `N` tokens.
    pub fn from_slice(tokens: &[String]) -> Option<Self> {
        if tokens.len() != N {
            return None;
        }
        Some(Self(std::array::from_fn(|i| tokens[i].clone())))
    }

    pub fn tokens(&self) -> &[String; N] {
        &self.0
    }

    /// The newest token, the one the ending classifier looks at.
    pub fn last(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    /// Drop the oldest token and append `next`.
    pub fn shift(&self, next: &str) -> Self {
        Self(std::array::from_fn(|i| {
            if i + 1 < N {
                self.0[i + 1].clone()
            } else {
                next.to_string()
            }
        }))
    }
}

impl<const N: usize> From<[&str; N]> for Window<N> {
    fn from(tokens: [&str; N]) -> Self {
        Self(tokens.map(str::to_string))
    }
}

impl<const N: usize> fmt::Display for Window<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

/// A trained model of fixed order `N`.
///
/// Followers are stored with repetition, so sampling uniformly from a
/// window's list is already weighted by observed frequency. Only
/// [`MarkovTrainer`] constructs models, which guarantees at least one ending.
#[derive(Debug, Clone)]
pub struct MarkovModel<const N: usize> {
    transitions: FxHashMap<Window<N>, Vec<String>>,
    /// Ending windows in first-seen order; uniform restart choices index this.
    endings: Vec<Window<N>>,
    ending_set: FxHashSet<Window<N>>,
}

impl<const N: usize> MarkovModel<N> {
    fn empty() -> Self {
        Self {
            transitions: FxHashMap::default(),
            endings: Vec::new(),
            ending_set: FxHashSet::default(),
        }
    }

    /// Record one observation of `window`, optionally followed by `follower`.
    ///
    /// Ending membership is decided once, when the window is first seen.
    fn observe(&mut self, window: Window<N>, follower: Option<String>) {
        match self.transitions.entry(window) {
            Entry::Occupied(mut entry) => {
                if let Some(follower) = follower {
                    entry.get_mut().push(follower);
                }
            }
            Entry::Vacant(entry) => {
                if is_ending(entry.key().last()) {
                    self.endings.push(entry.key().clone());
                    self.ending_set.insert(entry.key().clone());
                }
                entry.insert(follower.into_iter().collect());
            }
        }
    }

    pub fn order(&self) -> usize {
        N
    }

    /// Followers observed after `window`, with repetition.
    pub fn followers(&self, window: &Window<N>) -> Option<&[String]> {
        self.transitions.get(window).map(Vec::as_slice)
    }

    pub fn contains(&self, window: &Window<N>) -> bool {
        self.transitions.contains_key(window)
    }

    pub fn endings(&self) -> &[Window<N>] {
        &self.endings
    }

    pub fn is_ending_window(&self, window: &Window<N>) -> bool {
        self.ending_set.contains(window)
    }

    /// Number of distinct windows.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn windows(&self) -> impl Iterator<Item = &Window<N>> {
        self.transitions.keys()
    }

    pub fn stats(&self) -> ModelStats {
        let followers = self.transitions.values().map(Vec::len).sum();
        ModelStats::new(self.transitions.len(), followers, self.endings.len())
    }

    /// Sample one follower of `window`. `None` marks a dead end.
    pub fn next_token<R: Rng + ?Sized>(&self, window: &Window<N>, rng: &mut R) -> Option<&str> {
        self.transitions
            .get(window)?
            .choose(rng)
            .map(String::as_str)
    }

    fn restart<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Window<N>, MarkovError> {
        self.endings
            .choose(rng)
            .cloned()
            .ok_or(MarkovError::NoSentences)
    }

    /// Generate `count` sentences with the default step budget.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<String>, MarkovError> {
        self.generate_with_budget(count, DEFAULT_MAX_STEPS, rng)
    }

    /// Generate `count` sentences by walking the chain.
    ///
    /// The walk restarts from a random ending window whenever the current
    /// window has no recorded continuation, discarding any unfinished
    /// sentence. A sentence closes as soon as the walk lands on an ending
    /// window. `max_steps` bounds the iterations spent on any one sentence.
    pub fn generate_with_budget<R: Rng + ?Sized>(
        &self,
        count: usize,
        max_steps: usize,
        rng: &mut R,
    ) -> Result<Vec<String>, MarkovError> {
        let mut sentences = Vec::with_capacity(count);
        let mut output: Vec<&str> = Vec::new();
        let mut current: Option<Window<N>> = None;
        let mut steps = 0usize;

        while sentences.len() < count {
            if steps >= max_steps {
                return Err(MarkovError::Stalled { steps });
            }
            steps += 1;

            let next = match current.as_ref() {
                Some(window) => self.next_token(window, rng),
                None => None,
            };

            current = match (current, next) {
                (Some(window), Some(token)) => {
                    output.push(token);
                    let advanced = window.shift(token);
                    if self.ending_set.contains(&advanced) {
                        sentences.push(output.join(" "));
                        output.clear();
                        steps = 0;
                        Some(self.restart(rng)?)
                    } else {
                        Some(advanced)
                    }
                }
                _ => {
                    if !output.is_empty() {
                        trace!("dead end after {} tokens, discarding", output.len());
                        output.clear();
                    }
                    Some(self.restart(rng)?)
                }
            };
        }

        Ok(sentences)
    }
}

/// Builds models from corpus text or pre-tokenized input.
pub struct MarkovTrainer;

impl MarkovTrainer {
    /// Tokenize `text` and train a model of the requested order.
    pub fn train(text: &str, order: Order) -> Result<Model, MarkovError> {
        let tokens = tokenize(text);
        debug!("read {} tokens", tokens.len());
        Self::train_tokens(&tokens, order)
    }

    /// Train a model of the requested order from tokens.
    pub fn train_tokens(tokens: &[String], order: Order) -> Result<Model, MarkovError> {
        let model = match order {
            Order::Second => Model::Second(Self::train_fixed::<2>(tokens)?),
            Order::Third => Model::Third(Self::train_fixed::<3>(tokens)?),
        };
        Ok(model)
    }

    /// Train a model whose order is fixed at compile time.
    ///
    /// Every run of `N` tokens becomes a window; the token after it, when
    /// there is one, is recorded as a follower. Fails when no window ends a
    /// sentence, since generation would have nowhere to start.
    pub fn train_fixed<const N: usize>(tokens: &[String]) -> Result<MarkovModel<N>, MarkovError> {
        Order::try_from(N)?;

        let mut model = MarkovModel::<N>::empty();
        for run in tokens.windows(N + 1) {
            if let Some(window) = Window::from_slice(&run[..N]) {
                model.observe(window, Some(run[N].clone()));
            }
        }

        // The corpus tail has no follower but is still an observed window.
        if let Some(tail) = tokens
            .len()
            .checked_sub(N)
            .and_then(|start| Window::from_slice(&tokens[start..]))
        {
            model.observe(tail, None);
        }

        if model.endings.is_empty() {
            return Err(MarkovError::NoSentences);
        }

        debug!(
            "trained order-{} model: {} windows, {} endings",
            N,
            model.len(),
            model.endings.len()
        );
        Ok(model)
    }
}

/// A trained model tagged with its order.
#[derive(Debug, Clone)]
pub enum Model {
    Second(MarkovModel<2>),
    Third(MarkovModel<3>),
}

impl Model {
    pub fn order(&self) -> Order {
        match self {
            Self::Second(_) => Order::Second,
            Self::Third(_) => Order::Third,
        }
    }

    pub fn stats(&self) -> ModelStats {
        match self {
            Self::Second(model) => model.stats(),
            Self::Third(model) => model.stats(),
        }
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<String>, MarkovError> {
        self.generate_with_budget(count, DEFAULT_MAX_STEPS, rng)
    }

    pub fn generate_with_budget<R: Rng + ?Sized>(
        &self,
        count: usize,
        max_steps: usize,
        rng: &mut R,
    ) -> Result<Vec<String>, MarkovError> {
        match self {
            Self::Second(model) => model.generate_with_budget(count, max_steps, rng),
            Self::Third(model) => model.generate_with_budget(count, max_steps, rng),
        }
    }

    pub fn as_second(&self) -> Option<&MarkovModel<2>> {
        match self {
            Self::Second(model) => Some(model),
            Self::Third(_) => None,
        }
    }

    pub fn as_third(&self) -> Option<&MarkovModel<3>> {
        match self {
            Self::Third(model) => Some(model),
            Self::Second(_) => None,
        }
    }
}

/// Rough verdict on how much branching the corpus gives the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleQuality {
    Small,
    Good,
    Decent,
}

impl SampleQuality {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Small => "This is a small sample size, likely poor at generating text.",
            Self::Good => "This looks like a good sample size.",
            Self::Decent => "This looks like a decent sample size.",
        }
    }
}

/// Summary counts for a trained model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelStats {
    pub windows: usize,
    /// Total follower occurrences across all windows.
    pub followers: usize,
    pub endings: usize,
    pub mean_followers: f64,
}

impl ModelStats {
    fn new(windows: usize, followers: usize, endings: usize) -> Self {
        let mean_followers = if windows == 0 {
            0.0
        } else {
            followers as f64 / windows as f64
        };
        Self {
            windows,
            followers,
            endings,
            mean_followers,
        }
    }

    pub fn quality(&self) -> SampleQuality {
        if self.mean_followers < 2.0 {
            SampleQuality::Small
        } else if self.mean_followers > 2.0 {
            SampleQuality::Decent
        } else {
            SampleQuality::Good
        }
    }

    /// Log the average sample size and its verdict.
    pub fn report(&self) {
        info!("Average Sample Size: {}", self.mean_followers);
        match self.quality() {
            SampleQuality::Small => warn!("{}", SampleQuality::Small.describe()),
            quality => info!("{}", quality.describe()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TINY_CORPUS: &str = "The cat sat. The dog ran. The cat ran.";

    fn tokens(text: &str) -> Vec<String> {
        tokenize(text)
    }

    fn tiny_model() -> MarkovModel<2> {
        MarkovTrainer::train_fixed::<2>(&tokens(TINY_CORPUS)).unwrap()
    }

    fn followers<'a>(model: &'a MarkovModel<2>, window: [&str; 2]) -> Option<&'a [String]> {
        model.followers(&Window::from(window))
    }

    #[test]
    fn window_shift_drops_oldest() {
        let window = Window::from(["a", "b", "c"]);
        assert_eq!(window.shift("d"), Window::from(["b", "c", "d"]));
        assert_eq!(window.last(), "c");
    }

    #[test]
    fn window_from_slice_requires_exact_width() {
        let toks = tokens("one two three");
        assert!(Window::<2>::from_slice(&toks).is_none());
        assert!(Window::<3>::from_slice(&toks).is_some());
    }

    #[test]
    fn train_builds_transition_table() {
        let model = tiny_model();
        assert_eq!(model.len(), 7);
        assert_eq!(
            followers(&model, ["The", "cat"]).unwrap(),
            &["sat.".to_string(), "ran.".to_string()]
        );
        assert_eq!(followers(&model, ["cat", "sat."]).unwrap(), &["The".to_string()]);
        assert_eq!(followers(&model, ["sat.", "The"]).unwrap(), &["dog".to_string()]);
        assert_eq!(followers(&model, ["The", "dog"]).unwrap(), &["ran.".to_string()]);
        assert_eq!(followers(&model, ["dog", "ran."]).unwrap(), &["The".to_string()]);
        assert_eq!(followers(&model, ["ran.", "The"]).unwrap(), &["cat".to_string()]);
        assert!(followers(&model, ["cat", "ran."]).unwrap().is_empty());
    }

    #[test]
    fn train_collects_endings() {
        let model = tiny_model();
        let endings: FxHashSet<Window<2>> = model.endings().iter().cloned().collect();
        let expected: FxHashSet<Window<2>> = [
            Window::from(["cat", "sat."]),
            Window::from(["dog", "ran."]),
            Window::from(["cat", "ran."]),
        ]
        .into_iter()
        .collect();
        assert_eq!(endings, expected);
        assert!(!model.is_ending_window(&Window::from(["The", "cat"])));
    }

    #[test]
    fn train_without_boundaries_fails() {
        let result = MarkovTrainer::train_fixed::<2>(&tokens("no punctuation at all here"));
        assert!(matches!(result, Err(MarkovError::NoSentences)));

        let result = MarkovTrainer::train("", Order::Third);
        assert!(matches!(result, Err(MarkovError::NoSentences)));
    }

    #[test]
    fn abbreviation_windows_are_not_endings() {
        let corpus = tokens("I met Dr. Who today. Fine.");
        let model = MarkovTrainer::train_fixed::<2>(&corpus).unwrap();
        assert!(!model.is_ending_window(&Window::from(["met", "Dr."])));
        assert!(model.is_ending_window(&Window::from(["Who", "today."])));
    }

    #[test]
    fn unsupported_order_is_rejected() {
        let result = MarkovTrainer::train_fixed::<4>(&tokens(TINY_CORPUS));
        assert!(matches!(
            result,
            Err(MarkovError::InvalidOrder(InvalidOrder::OutOfRange(4)))
        ));
    }

    #[test]
    fn generate_returns_exact_count() {
        let model = tiny_model();
        let mut rng = StdRng::seed_from_u64(42);
        for count in [1, 3, 25] {
            let sentences = model.generate(count, &mut rng).unwrap();
            assert_eq!(sentences.len(), count);
        }
    }

    #[test]
    fn generate_zero_is_empty() {
        let model = tiny_model();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(model.generate(0, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn generate_deterministic() {
        let model = tiny_model();
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        assert_eq!(
            model.generate(5, &mut rng1).unwrap(),
            model.generate(5, &mut rng2).unwrap()
        );
    }

    #[test]
    fn sentences_end_on_ending_windows() {
        let model = tiny_model();
        let ending_tokens: FxHashSet<&str> = model.endings().iter().map(|w| w.last()).collect();
        let vocabulary: FxHashSet<String> = tokens(TINY_CORPUS).into_iter().collect();

        let mut rng = StdRng::seed_from_u64(7);
        for sentence in model.generate(50, &mut rng).unwrap() {
            let words: Vec<&str> = sentence.split(' ').collect();
            let last = words.last().unwrap();
            assert!(ending_tokens.contains(last), "bad ending in {:?}", sentence);
            assert!(words.iter().all(|w| vocabulary.contains(*w)));
        }
    }

    #[test]
    fn dead_ends_discard_partial_sentences() {
        // (why., zed) has no continuation, so a walk through "zed" must be dropped.
        let corpus = tokens("ex why. pe queue. ex why. zed");
        let model = MarkovTrainer::train_fixed::<2>(&corpus).unwrap();
        assert!(followers(&model, ["why.", "zed"]).unwrap().is_empty());

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            for sentence in model.generate(10, &mut rng).unwrap() {
                assert!(
                    sentence == "pe queue." || sentence == "ex why.",
                    "unexpected sentence {:?}",
                    sentence
                );
            }
        }
    }

    #[test]
    fn unreachable_endings_stall_within_budget() {
        let model = MarkovTrainer::train_fixed::<2>(&tokens("ab cd. ef gh ij")).unwrap();
        assert_eq!(model.endings().len(), 1);
        let mut rng = StdRng::seed_from_u64(3);
        let result = model.generate_with_budget(1, 50, &mut rng);
        assert!(matches!(result, Err(MarkovError::Stalled { steps: 50 })));
    }

    #[test]
    fn single_ending_always_restarts_there() {
        let model = MarkovTrainer::train_fixed::<2>(&tokens("ab cd. ab cd.")).unwrap();
        assert_eq!(model.endings(), &[Window::from(["ab", "cd."])]);

        let mut rng = StdRng::seed_from_u64(8);
        let sentences = model.generate(3, &mut rng).unwrap();
        assert_eq!(sentences, vec!["ab cd.", "ab cd.", "ab cd."]);
    }

    #[test]
    fn follower_choice_tracks_frequency() {
        let corpus = tokens("ab cd xy. ab cd xy. ab cd xy. ab cd yz.");
        let model = MarkovTrainer::train_fixed::<2>(&corpus).unwrap();
        let window = Window::from(["ab", "cd"]);
        assert_eq!(model.followers(&window).unwrap().len(), 4);

        let mut rng = StdRng::seed_from_u64(99);
        let trials = 20_000;
        let hits = (0..trials)
            .filter(|_| model.next_token(&window, &mut rng) == Some("xy."))
            .count();
        let ratio = hits as f64 / trials as f64;
        assert!((ratio - 0.75).abs() < 0.02, "ratio was {}", ratio);
    }

    #[test]
    fn next_token_on_unknown_window_is_none() {
        let model = tiny_model();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(model.next_token(&Window::from(["zebra", "crossing"]), &mut rng).is_none());
    }

    #[test]
    fn trigram_model() {
        let corpus = "The cat sat on the mat. The dog sat on the rug. The cat sat on the rug.";
        let model = MarkovTrainer::train(corpus, Order::Third).unwrap();
        assert_eq!(model.order(), Order::Third);
        assert!(model.as_second().is_none());

        let trigram = model.as_third().unwrap();
        assert_eq!(trigram.order(), 3);
        assert_eq!(
            trigram
                .followers(&Window::from(["cat", "sat", "on"]))
                .unwrap()
                .len(),
            2
        );

        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(model.generate(4, &mut rng).unwrap().len(), 4);
    }

    #[test]
    fn stats_mean_followers() {
        let stats = tiny_model().stats();
        assert_eq!(stats.windows, 7);
        assert_eq!(stats.followers, 7);
        assert_eq!(stats.endings, 3);
        assert!((stats.mean_followers - 1.0).abs() < f64::EPSILON);
        assert_eq!(stats.quality(), SampleQuality::Small);
    }

    #[test]
    fn sample_quality_thresholds() {
        assert_eq!(ModelStats::new(2, 4, 1).quality(), SampleQuality::Good);
        assert_eq!(ModelStats::new(2, 5, 1).quality(), SampleQuality::Decent);
        assert_eq!(ModelStats::new(0, 0, 0).mean_followers, 0.0);
    }
}
