//! Query builder state machine
//!
//! - [`state`]: the pure reducer over [`QueryBuilderState`]
//! - [`splice`]: text edits used by the reducer
//! - [`dispatch`]: commit suppression and host callbacks
//! - [`session`]: [`SearchQueryBuilder`], which drives all of the above

pub mod dispatch;
pub mod error;
pub mod session;
pub mod splice;
pub mod state;

pub use dispatch::{
    CallbackSearchState, CommitOutcome, FnHandler, NoopHandler, SearchDispatcher, SearchHandler,
};
pub use error::SessionError;
pub use session::{Phase, SearchQueryBuilder, SessionBuilder};
pub use state::{Action, QueryBuilderState};
