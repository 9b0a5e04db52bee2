pub mod models;

pub use models::{create_summarizer, DeepSeekModel, DummyModel};
