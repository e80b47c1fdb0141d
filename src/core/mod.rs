pub mod ending;
pub mod markov;
pub mod quote;
pub mod tokenizer;
