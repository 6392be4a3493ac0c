//! Library surface of the warren CLI, split out so command execution and
//! rendering stay testable without spawning the binary.

pub mod cli;
pub mod logging;
