pub mod bridge;

pub use bridge::{BridgeError, SurveyBridge};
