//! The manifest rewrite pipeline.
//!
//! A pass reads a multi-document YAML stream, splits it into documents
//! ([`reader`]), classifies each one by `kind` ([`document`]), locates the
//! pod template of workloads ([`template`]), adds the init container
//! ([`injector`]) and writes every document back in input order
//! ([`writer`]). [`rewrite`] drives a whole pass.

mod document;
mod error;
mod injector;
mod octal;
mod reader;
mod rewrite;
mod template;
mod writer;

pub use self::{
    error::Error,
    rewrite::{Summary, rewrite},
};
