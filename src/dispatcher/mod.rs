//! # Dispatcher Module
//!
//! Coroutine-based request handler dispatch. Each registered handler runs in
//! its own `may` coroutine and receives requests over a channel; the
//! dispatcher sends a [`HandlerRequest`] carrying a reply channel and waits
//! for the [`HandlerResponse`].
//!
//! ## Request Flow
//!
//! 1. Router matches the incoming request → handler name + path params
//! 2. Middleware `before` hooks run (any may answer early)
//! 3. Request is sent to the handler coroutine
//! 4. Handler replies on the one-shot channel
//! 5. Middleware `after` hooks run on the response
//!
//! ## Error Handling
//!
//! - Handler panics are caught inside the coroutine and become 500 responses
//! - An unregistered handler name makes `dispatch` return `None`
//!   (the server answers 500)

mod core;

pub use self::core::{Dispatcher, HandlerRequest, HandlerResponse, HandlerSender, HeaderVec};
