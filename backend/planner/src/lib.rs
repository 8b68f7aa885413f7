pub mod planner;
pub mod providers;

pub use planner::{ModelPlanner, PlannerSettings};
pub use providers::openrouter::{ChunkDecoder, OpenRouterProvider};
pub use providers::scripted::{ScriptedProvider, ScriptedTurn};
pub use providers::ProviderRegistry;
