//! Query and mutation state machines.
//!
//! Queries are read through the entity cache and observed via typed
//! [`Query`] handles. Mutations run through [`Mutation`] handles and
//! invalidate cache tags on success.

mod handles;
mod mutation;
mod state;

pub use handles::{BookQuery, BooksQuery, BorrowSummariesQuery, Query, QueryOutput, QuerySnapshot};
pub use mutation::{Mutation, MutationEndpoint, MutationError, MutationState};
pub use state::{GENERIC_ERROR_MESSAGE, QueryData, QueryState, QueryStatus, ViewState};
