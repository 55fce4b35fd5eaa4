pub mod coordinator;
pub mod process_host;

pub use coordinator::{AppInvoker, InstalledApps, LaunchCoordinator, LaunchError};
pub use process_host::ProcessAppHost;
