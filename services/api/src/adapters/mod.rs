pub mod db;
pub mod memory;
pub mod tutor_llm;

pub use db::PgStore;
pub use memory::InMemoryStore;
pub use tutor_llm::{OpenAiTutorAdapter, UnconfiguredGenerator};
