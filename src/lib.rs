//! Receive webhooks from git hosting platforms, verify them and act on them.
//!
//! ## How it works
//!
//! Every delivery goes through the [webhook](webhook::Webhook) pipeline. First the
//! **access guard** checks the remote address and the **validation** checks the content type.
//! Then the request is **verified** with the scheme the headers point to (GitHub signatures,
//! GitLab tokens or basic authorization). Finally the JSON payload is handed to the
//! **processor**, which either does nothing, runs a chain of functions on the payload,
//! or pulls the working tree and runs the tests (aborting the merge if they fail).
//!
//! ```ignore
//! +--------+       +-------+       +--------------+       +-----------+
//! | server | ----> | guard | ----> | verification | ----> | processor |
//! +--------+       +-------+       +--------------+       +-----------+
//! ```
//!

/// Running external commands with captured output and timeouts.
pub mod commands;
/// Loading the shared secret.
pub mod config;
/// Allow-listing remote addresses.
pub mod guard;
/// A processor decides what happens with a verified webhook (e.g. [pulling and testing](processors::pull::PullAndTestProcessor)).
pub mod processors;
/// A working tree that can be pulled.
pub mod repository;
/// The inbound request, as seen by the pipeline.
pub mod request;
/// The HTTP server, running the webhook on every request.
pub mod server;
/// Test suites, run after pulling.
pub mod suites;
/// Content type and payload checks.
pub mod validation;
/// Authenticating requests with the shared secret.
pub mod verification;
/// The pipeline handling a single delivery.
pub mod webhook;
