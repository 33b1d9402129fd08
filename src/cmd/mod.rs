pub mod binaries;
pub mod run;
