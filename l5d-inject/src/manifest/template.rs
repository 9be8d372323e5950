use serde_yaml::{Mapping, Value};
use snafu::OptionExt;

use crate::manifest::{
    Error,
    document::{Workload, WorkloadKind},
    error,
};

const SPEC: &str = "spec";
const TEMPLATE: &str = "spec.template";
const METADATA: &str = "spec.template.metadata";
const ANNOTATIONS: &str = "spec.template.metadata.annotations";

/// A mutable handle to the pod template embedded in a workload.
pub struct PodTemplate<'a> {
    index: usize,
    kind: WorkloadKind,
    template: &'a mut Mapping,
}

impl Workload {
    /// Locates the pod template at `spec.template`.
    ///
    /// For kinds whose schema embeds the template by value, a missing `spec`
    /// or `spec.template` is created empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingTemplate`] when a ReplicationController has no
    /// template and [`Error::MalformedWorkload`] when `spec` or
    /// `spec.template` is not a mapping.
    pub fn pod_template_mut(&mut self) -> Result<PodTemplate<'_>, Error> {
        let Self { index, kind, object } = self;
        let (index, kind) = (*index, *kind);
        let create = !kind.template_is_optional();

        let template = child_mut(object, SPEC, create, index, kind)?
            .map(|spec| child_mut(spec, TEMPLATE, create, index, kind))
            .transpose()?
            .flatten()
            .context(error::MissingTemplateSnafu { index, kind })?;

        Ok(PodTemplate { index, kind, template })
    }
}

impl PodTemplate<'_> {
    pub const fn index(&self) -> usize { self.index }

    /// # Errors
    ///
    /// Returns [`Error::MalformedWorkload`] when the template metadata or its
    /// annotations are not mappings.
    pub fn has_annotation(&self, key: &'static str) -> Result<bool, Error> {
        Ok(self.annotations()?.is_some_and(|annotations| annotations.contains_key(key)))
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidAnnotation`] when the value is not a string, or
    /// [`Error::MalformedWorkload`] when the template metadata or its
    /// annotations are not mappings.
    pub fn annotation(&self, key: &'static str) -> Result<Option<&str>, Error> {
        let Some(annotations) = self.annotations()? else {
            return Ok(None);
        };
        match annotations.get(key) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value)),
            Some(_) => {
                error::InvalidAnnotationSnafu { index: self.index, kind: self.kind, key }.fail()
            }
        }
    }

    /// Sets an annotation, creating `metadata` and `metadata.annotations`
    /// when they are absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedWorkload`] when the template metadata or its
    /// annotations are not mappings.
    pub fn set_annotation(
        &mut self,
        key: &'static str,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        let Self { index, kind, template } = self;
        let (index, kind) = (*index, *kind);

        let annotations = child_mut(template, METADATA, true, index, kind)?
            .map(|metadata| child_mut(metadata, ANNOTATIONS, true, index, kind))
            .transpose()?
            .flatten()
            .context(error::MalformedWorkloadSnafu { index, kind, field: METADATA })?;

        let _previous = annotations.insert(Value::from(key), Value::String(value.into()));
        Ok(())
    }

    fn annotations(&self) -> Result<Option<&Mapping>, Error> {
        let Some(metadata) = child(&*self.template, METADATA, self.index, self.kind)? else {
            return Ok(None);
        };
        child(metadata, ANNOTATIONS, self.index, self.kind)
    }
}

/// Last segment of a dotted field path, the key to look up in the parent.
fn key_of(path: &'static str) -> &'static str {
    path.rsplit_once('.').map_or(path, |(_, key)| key)
}

/// The mapping stored at `path`; `None` when absent or null.
fn child<'a>(
    parent: &'a Mapping,
    path: &'static str,
    index: usize,
    kind: WorkloadKind,
) -> Result<Option<&'a Mapping>, Error> {
    match parent.get(key_of(path)) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Mapping(mapping)) => Ok(Some(mapping)),
        Some(_) => error::MalformedWorkloadSnafu { index, kind, field: path }.fail(),
    }
}

/// Like [`child`], but inserts an empty mapping first when `create` is set
/// and the field is absent or null.
fn child_mut<'a>(
    parent: &'a mut Mapping,
    path: &'static str,
    create: bool,
    index: usize,
    kind: WorkloadKind,
) -> Result<Option<&'a mut Mapping>, Error> {
    let key = key_of(path);
    if create && parent.get(key).is_none_or(Value::is_null) {
        let _previous = parent.insert(Value::from(key), Value::Mapping(Mapping::new()));
    }
    match parent.get_mut(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Mapping(mapping)) => Ok(Some(mapping)),
        Some(_) => error::MalformedWorkloadSnafu { index, kind, field: path }.fail(),
    }
}
