pub mod bargain;
pub mod history;
pub mod models;
pub mod recommend;

pub use bargain::{BargainEngine, BargainError, RespondOutcome};
pub use history::ViewHistory;
pub use models::{BargainRequest, BargainStatus, Party};
pub use recommend::Recommender;
