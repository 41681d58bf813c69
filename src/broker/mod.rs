pub mod engine;
pub mod message;
pub mod stats;
pub mod topic;

pub use engine::Broker;
pub use message::Message;
pub use stats::BrokerStats;
