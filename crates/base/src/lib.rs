pub mod consts;

pub const CLI_PROGRAM_NAME: &str = "l5d-inject";
