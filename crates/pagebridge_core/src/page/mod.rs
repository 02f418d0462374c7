//! Page-lifecycle state: the global namespace and the session wrapper
//! that creates and discards it per navigation.

pub mod globals;
pub mod session;

pub use globals::{GlobalValue, PageGlobals, PageLoadId, LOCAL_STORAGE_GLOBAL};
pub use session::PageSession;
