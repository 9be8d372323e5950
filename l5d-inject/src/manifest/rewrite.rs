use std::io::{Read, Write};

use crate::{
    config::InjectionConfig,
    manifest::{
        Error,
        document::Document,
        injector::{self, Injection},
        reader::DocumentReader,
        writer::DocumentWriter,
    },
};

/// Counts of what a pass did with the documents it saw.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    pub documents: usize,
    pub injected: usize,
    pub already_injected: usize,
    pub passed_through: usize,
}

/// Rewrites one manifest stream.
///
/// Documents are read, rewritten and written one at a time, in input order.
/// Workloads get the init container added to their pod template and are
/// re-encoded; everything else, including workloads that were injected
/// before, is copied byte for byte. Running the rewrite over its own output
/// therefore reproduces that output exactly.
///
/// # Errors
///
/// The first error aborts the pass. Documents written before it stay in
/// `output`.
pub fn rewrite<R, W>(config: &InjectionConfig, input: R, output: W) -> Result<Summary, Error>
where
    R: Read,
    W: Write,
{
    let mut writer = DocumentWriter::new(output);
    let mut summary = Summary::default();

    for (position, raw) in DocumentReader::new(input).enumerate() {
        let raw = raw?;
        let index = position + 1;
        summary.documents += 1;

        let Document::Workload(mut workload) = Document::parse(index, &raw)? else {
            tracing::debug!(index, "passing document through");
            summary.passed_through += 1;
            writer.write_document(&raw)?;
            continue;
        };

        let kind = workload.kind;
        let injection = injector::inject(config, &mut workload.pod_template_mut()?)?;
        match injection {
            Injection::Applied => {
                tracing::debug!(index, %kind, "injected init container");
                summary.injected += 1;
                writer.write_document(workload.to_yaml()?.as_bytes())?;
            }
            Injection::AlreadyInjected => {
                tracing::debug!(index, %kind, "pod template already injected");
                summary.already_injected += 1;
                writer.write_document(&raw)?;
            }
        }
    }

    writer.flush()?;
    Ok(summary)
}
