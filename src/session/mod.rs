pub mod session;

pub use session::{Message, Session, SessionState, PROCESSING_STAGES};
