//! I/O infrastructure.
//!
//! - **fs**: the filesystem facade every phase goes through, with the real
//!   implementation (optionally staging moves in git)
//! - **memory**: an in-memory facade for tests
//! - **printer**: turns an edited source file back into text

pub mod fs;
pub mod memory;
pub mod printer;

pub use fs::{DirEntry, FileSystem, MoveScope, OsFileSystem};
pub use memory::MemoryFileSystem;
pub use printer::Printer;
