pub mod db;
pub mod error;
pub mod session;

pub use error::StoreError;
pub use session::{DbSession, SessionGuard, SessionProvider, SqliteSessions};
