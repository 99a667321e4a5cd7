//! Operator tool for `login` directive blocks.
//!
//! `loginsrv-check fields` lists the directives a `login` block accepts,
//! `loginsrv-check check <FILE>` runs setup on a configuration file and
//! prints the resulting configuration of every block.

pub mod cmd;
pub mod error;
