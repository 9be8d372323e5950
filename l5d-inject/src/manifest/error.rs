use snafu::Snafu;

use crate::manifest::document::WorkloadKind;

/// Errors raised while rewriting a manifest stream.
///
/// Every error aborts the pass. Document indices are 1-based and count the
/// documents produced by the splitter, so blank documents count too.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to read input, error: {source}"))]
    ReadInput { source: std::io::Error },

    #[snafu(display("Failed to write output, error: {source}"))]
    WriteOutput { source: std::io::Error },

    #[snafu(display("Failed to decode document {index} as YAML, error: {source}"))]
    DecodeDocument { index: usize, source: serde_yaml::Error },

    #[snafu(display("Document {index} is not a YAML mapping"))]
    NotAMapping { index: usize },

    #[snafu(display("Document {index} has no `kind`"))]
    MissingKind { index: usize },

    #[snafu(display("Document {index} has a `kind` that is not a string"))]
    InvalidKind { index: usize },

    #[snafu(display("{kind} in document {index} is malformed, `{field}` is not a mapping"))]
    MalformedWorkload { index: usize, kind: WorkloadKind, field: &'static str },

    #[snafu(display(
        "{kind} in document {index} is malformed, annotation `{key}` on the pod template is not \
         a string"
    ))]
    InvalidAnnotation { index: usize, kind: WorkloadKind, key: &'static str },

    #[snafu(display("{kind} in document {index} has no pod template at `spec.template`"))]
    MissingTemplate { index: usize, kind: WorkloadKind },

    #[snafu(display("Failed to encode document {index} as YAML, error: {source}"))]
    EncodeDocument { index: usize, source: serde_yaml::Error },

    #[snafu(display(
        "Failed to parse annotation `{key}` in document {index} as a JSON array, error: {source}"
    ))]
    ParseInitContainers { index: usize, key: &'static str, source: serde_json::Error },

    #[snafu(display("Failed to encode init containers in document {index}, error: {source}"))]
    EncodeInitContainers { index: usize, source: serde_json::Error },
}
