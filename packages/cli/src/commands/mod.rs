pub mod build;
pub mod init;
pub mod make;

pub use build::{build, BuildArgs};
pub use init::{init, InitArgs};
pub use make::{make, MakeArgs};
