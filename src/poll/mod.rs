//! Waiting for a remote resource to settle into a target state.
//!
//! Many control-plane changes are accepted immediately but take effect
//! later: a delete returns success while the resource sits in `DELETING`
//! for a while. [`wait_for_state`] probes the resource until its reported
//! state leaves the pending set and lands in the target set, or fails
//! fast when the remote reports a state nobody expected.
//!
//! States are typed through [`StateLabel`]; a resource that no longer
//! exists is [`Observation::Absent`], which matches a target or pending
//! entry of `None`.

mod error;
mod spec;
mod state;
mod waiter;

pub use error::WaitError;
pub use spec::WaitSpec;
pub use state::{label_of, Observation, RawState, StateLabel};
pub use waiter::wait_for_state;
