use bytes::Bytes;

use crate::error::FetchError;
use crate::request::{FetchRequestDescriptor, FetchTicket};

/// Result of one remote imagery request: the encoded image on success.
pub type FetchOutcome = Result<Bytes, FetchError>;

/// Starts remote imagery requests on behalf of the engine.
///
/// `dispatch` must return immediately. The host runs the request out of band
/// and hands the outcome back to the engine together with `ticket`, exactly
/// once per dispatched request, whether it succeeded or not.
pub trait ImageryTransport {
    fn dispatch(&mut self, ticket: FetchTicket, request: FetchRequestDescriptor);
}
