pub mod dispatch;

pub use dispatch::{request_codes, DispatchResult, PendingAction};
