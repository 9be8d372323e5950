use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Configuration { source: crate::config::Error },

    #[snafu(display("{source}"))]
    Manifest { source: crate::manifest::Error },

    #[snafu(display("Please supply an unmodified Kubernetes resource filename with -f"))]
    MissingInputFile,

    #[snafu(display("Failed to open input {}, error: {source}", file_path.display()))]
    OpenInput { file_path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to create output {}, error: {source}", file_path.display()))]
    CreateOutput { file_path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to write to stdout, error: {source}"))]
    WriteStdout { source: std::io::Error },
}

impl From<crate::config::Error> for Error {
    fn from(source: crate::config::Error) -> Self { Self::Configuration { source } }
}

impl From<crate::manifest::Error> for Error {
    fn from(source: crate::manifest::Error) -> Self { Self::Manifest { source } }
}
