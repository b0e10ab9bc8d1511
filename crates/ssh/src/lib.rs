//! rsftp-ssh: SFTP backend for rsftp
//!
//! This crate implements the Backend trait over an SFTP subsystem channel
//! and owns connection setup and authentication. It is the only crate that
//! directly depends on russh.

pub mod client;
pub mod connect;

pub use client::SftpBackend;
pub use connect::{connect, Auth, ConnectOptions, Target};
