mod accumulator;
mod assistant;
mod classifier;
mod client_utils;
mod errors;
mod sources;
mod store;
pub mod testing;
mod types;

pub use accumulator::TurnAccumulator;
pub use assistant::{
    AssistantEndpoint, AssistantStream, HttpAssistantEndpoint, HttpAssistantEndpointOptions,
};
pub use classifier::{GraphClassifier, HttpGraphClassifier};
pub use errors::*;
pub use sources::{DataSource, DataSourceRegistry, HttpDataSourceRegistry};
pub use store::{ChatRecord, ChatStore, ChatSummary, HttpChatStore, SaveTurn, SavedTurn};
pub use types::*;
