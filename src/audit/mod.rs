pub mod activity;
pub mod export;
pub mod recorder;
pub mod session;

pub use activity::{Action, ActivityRegistry, Resource};
pub use recorder::record_activity;
pub use session::SessionStore;
