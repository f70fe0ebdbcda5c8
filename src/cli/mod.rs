//! # CLI Module
//!
//! Command-line entry point for the `todolist-api` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Start the HTTP server:
//!
//! ```bash
//! todolist-api serve --addr 0.0.0.0:8080 --static-dir static_site
//! todolist-api serve --config config/config.yaml --no-seed
//! ```
//!
//! Flags override the values read from `--config`.
//!
//! ### `routes`
//!
//! Print the routing table:
//!
//! ```bash
//! todolist-api routes
//! ```

mod commands;


pub use commands::{run, run_cli, Cli, Commands, ServeArgs};
