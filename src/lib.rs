//! Shaney: a Mark V. Shaney style Markov chain sentence generator.
//!
//! Learns which words follow each run of two or three words in a corpus,
//! then random-walks that table to produce new, plausible-sounding
//! sentences.

pub mod core;
pub mod schema;

pub use crate::core::markov::{
    MarkovError, MarkovModel, MarkovTrainer, Model, ModelStats, Window,
};
pub use crate::core::quote::ShaneyBot;
pub use crate::schema::config::ShaneyConfig;
pub use crate::schema::order::Order;
