//! Plumbing shared by `l5d-inject` command-line front ends.

pub mod config;
