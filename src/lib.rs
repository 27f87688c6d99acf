//! Base module layer for discrete-event network simulations.
//!
//! Modules live in a containment [`topology`] under host nodes. Each module
//! embeds a [`module::ModuleCore`] that resolves its host, its log name,
//! the shared bulletin board and the host battery during a staged
//! initialization driven by [`sim::Runtime`]:
//!
//! - stage 0: subscribe to board categories, register battery accounts
//! - stage 1 onwards: first reads and publications
//!
//! Delivery opens only after every module has completed stage 0, so no
//! notification ever reaches a module before it has subscribed.

pub mod battery;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod module;
/// Built-in radio and meter modules.
pub mod modules;
pub mod notify;
pub mod reporting;
pub mod runner;
pub mod sim;
pub mod topology;
