pub mod generation;
pub mod llm;
pub mod persona;
pub mod token;
