//! Per-event random number streams
//!
//! Parallel stochastic simulation is only reproducible if every event
//! draws from its own stream, derived from the master seed and the
//! event index alone. Streams share no state, so results cannot depend
//! on which worker ran the event or in what order.

mod stream;

pub use stream::RngStream;
