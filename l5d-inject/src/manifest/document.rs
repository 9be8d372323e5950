use std::fmt;

use k8s_openapi::{
    Resource,
    api::{
        apps::v1::{DaemonSet, Deployment, ReplicaSet},
        batch::v1::Job,
        core::v1::ReplicationController,
    },
};
use serde_yaml::{Mapping, Value};
use snafu::ResultExt;

use crate::manifest::{Error, error, octal};

/// The workload kinds whose pod template gets the init container.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WorkloadKind {
    Job,
    DaemonSet,
    ReplicaSet,
    Deployment,
    ReplicationController,
}

impl WorkloadKind {
    pub const ALL: [Self; 5] =
        [Self::Job, Self::DaemonSet, Self::ReplicaSet, Self::Deployment, Self::ReplicationController];

    /// Matches the `kind` of a manifest. The API group is not checked, so an
    /// `extensions/v1beta1` Deployment is handled like an `apps/v1` one.
    pub fn from_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == kind)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Job => Job::KIND,
            Self::DaemonSet => DaemonSet::KIND,
            Self::ReplicaSet => ReplicaSet::KIND,
            Self::Deployment => Deployment::KIND,
            Self::ReplicationController => ReplicationController::KIND,
        }
    }

    /// A ReplicationController's template is optional in its schema. The
    /// other kinds always carry one, so an absent template there is an empty
    /// one.
    pub const fn template_is_optional(self) -> bool { matches!(self, Self::ReplicationController) }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// A workload manifest decoded into a generic YAML tree.
///
/// Keeping the whole tree, instead of decoding into the typed API objects,
/// keeps fields unknown to any particular API version and the original key
/// order when the document is written back.
#[derive(Debug)]
pub struct Workload {
    pub index: usize,
    pub kind: WorkloadKind,
    pub object: Mapping,
}

impl Workload {
    /// # Errors
    ///
    /// Returns [`Error::EncodeDocument`] when the tree cannot be written as
    /// YAML.
    pub fn to_yaml(&self) -> Result<String, Error> {
        serde_yaml::to_string(&self.object).context(error::EncodeDocumentSnafu { index: self.index })
    }
}

#[derive(Debug)]
pub enum Document {
    /// Written out exactly as it was read.
    Passthrough,
    Workload(Workload),
}

impl Document {
    /// Classifies a raw document by its top-level `kind`.
    ///
    /// Documents holding nothing but blank lines, comments, or a YAML null
    /// pass through. Anything else has to be a mapping with a string `kind`.
    /// Plain YAML 1.1 octal scalars in a workload are read as integers, the
    /// way the API server reads them.
    ///
    /// # Errors
    ///
    /// Returns an error when the document is not valid YAML, is not a
    /// mapping, or lacks a string `kind`.
    pub fn parse(index: usize, raw: &[u8]) -> Result<Self, Error> {
        if is_blank(raw) {
            return Ok(Self::Passthrough);
        }

        let mut object = match serde_yaml::from_slice::<Value>(raw)
            .context(error::DecodeDocumentSnafu { index })?
        {
            Value::Null => return Ok(Self::Passthrough),
            Value::Mapping(object) => object,
            _ => return error::NotAMappingSnafu { index }.fail(),
        };

        let kind = match object.get("kind") {
            Some(Value::String(kind)) => kind,
            Some(_) => return error::InvalidKindSnafu { index }.fail(),
            None => return error::MissingKindSnafu { index }.fail(),
        };

        let Some(kind) = WorkloadKind::from_kind(kind) else {
            return Ok(Self::Passthrough);
        };
        if let Ok(text) = std::str::from_utf8(raw) {
            octal::restore_octal_integers(&mut object, text);
        }
        Ok(Self::Workload(Workload { index, kind, object }))
    }
}

fn is_blank(raw: &[u8]) -> bool {
    raw.split(|&byte| byte == b'\n').all(|line| {
        let line = line.trim_ascii();
        line.is_empty() || line.starts_with(b"#")
    })
}
