mod session;

pub use session::{SearchOutcome, SearchSession, SearchTicket, SEARCH_ERROR_MESSAGE};
