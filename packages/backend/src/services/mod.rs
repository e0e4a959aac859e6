pub mod llm_provider;
pub mod word_generation;
