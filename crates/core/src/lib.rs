//! rsftp-core: Core library for the rsftp interactive file shell
//!
//! This crate provides the core functionality for rsftp, including:
//! - Path algebra for resolving names against a working directory
//! - The Backend trait and its local filesystem implementation
//! - Glob expansion over any backend
//! - The shell session: dispatcher, transfers, listing, completion, browser
//! - Configuration and host bookmarks
//!
//! This crate does not speak any transfer protocol itself; the remote side
//! is plugged in through [`Backend`].

pub mod backend;
pub mod config;
pub mod error;
pub mod glob;
pub mod host;
pub mod local;
pub mod path;
pub mod shell;

pub use backend::{Backend, FileEntry, FileKind, Reader, Writer};
pub use config::{ColorMode, Config, ConfigManager, Defaults};
pub use error::{Error, Result};
pub use host::{Host, HostManager};
pub use local::LocalFs;
pub use shell::{
    BrowseStep, Command, CompletionKind, LineCompleter, Outcome, Picker, Reporter, Session, SessionOptions,
    ShellIo, Side, Viewer,
};
