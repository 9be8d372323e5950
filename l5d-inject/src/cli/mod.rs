//! Command-line front end.
//!
//! Flags follow the Go `flag` conventions the tool has always accepted:
//!
//! ```bash
//! # Inject with the defaults, reading a file and writing to stdout
//! l5d-inject -f hello-world.yml
//!
//! # Read stdin, write a file, point at another linkerd port
//! cat hello-world.yml | l5d-inject -f - -o injected.yml -linkerdPort=4141
//!
//! # Clusters without downward API access
//! l5d-inject -f hello-world.yml -useServiceVip -linkerdSvcName=l5d
//! ```

mod args;
pub mod error;

use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::PathBuf,
};

use clap::{CommandFactory, Parser};
use l5d_inject_base::CLI_PROGRAM_NAME;
use snafu::{OptionExt, ResultExt};

pub use self::error::Error;
use crate::{
    config::{Config, InjectionConfig},
    manifest::{self, Summary},
    shadow,
};

/// Input path meaning standard input.
const STDIN_PATH: &str = "-";

#[derive(Parser)]
#[command(
    name = CLI_PROGRAM_NAME,
    author,
    version,
    long_version = shadow::CLAP_LONG_VERSION,
    about = "Inject an init container routing pod traffic through a node-local linkerd.",
    long_about = "Reads Kubernetes manifests and adds an init container to the pod template of \
                  every Job, DaemonSet, ReplicaSet, Deployment and ReplicationController. At pod \
                  start the init container installs iptables rules that send the pod's traffic \
                  to the linkerd daemonset running on the same node. Other documents are copied \
                  unchanged."
)]
pub struct Cli {
    #[arg(
        short = 'f',
        value_name = "FILE",
        allow_hyphen_values = true,
        help = "Input Kubernetes resource filename, `-` reads standard input"
    )]
    input_file: Option<String>,

    #[arg(
        short = 'o',
        value_name = "FILE",
        allow_hyphen_values = true,
        default_value = "",
        help = "Modified output Kubernetes resource filename, standard output when empty"
    )]
    output_file: String,

    #[arg(
        long = "linkerdPort",
        value_name = "PORT",
        allow_hyphen_values = true,
        help = "linkerd daemonset port which will handle outgoing requests [default: 4140]"
    )]
    linkerd_port: Option<String>,

    #[arg(
        long = "useServiceVip",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "For use in Kubernetes environments without downward API access [default: false]"
    )]
    use_service_vip: Option<bool>,

    #[arg(
        long = "linkerdSvcName",
        value_name = "NAME",
        allow_hyphen_values = true,
        help = "linkerd daemonset service name [default: l5d]"
    )]
    linkerd_svc_name: Option<String>,

    #[arg(
        long = "config",
        value_name = "FILE",
        allow_hyphen_values = true,
        help = "Read defaults from a YAML configuration file"
    )]
    config_file: Option<PathBuf>,

    #[arg(long = "log-level", help = "Set the logging level (e.g., warn, info, debug, trace)")]
    log_level: Option<tracing::Level>,

    #[arg(
        long = "completions",
        value_name = "SHELL",
        help = "Print a shell completion script for the given shell and exit"
    )]
    completions: Option<clap_complete::Shell>,

    #[arg(
        long = "defaultConfig",
        help = "Print the default configuration in YAML format and exit"
    )]
    default_config: bool,
}

impl Default for Cli {
    fn default() -> Self { Self::parse_from(args::normalize(std::env::args_os())) }
}

impl Cli {
    /// Loads the configuration file if one was given, then applies the
    /// command-line overrides on top of it.
    fn load_config(&self) -> Result<Config, Error> {
        let mut config = match &self.config_file {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(log_level) = self.log_level {
            config.log.level = log_level;
        }

        let InjectionConfig { proxy_port, proxy_service_name, use_service_vip } = &mut config.inject;
        if let Some(port) = &self.linkerd_port {
            proxy_port.clone_from(port);
        }
        if let Some(name) = &self.linkerd_svc_name {
            proxy_service_name.clone_from(name);
        }
        if let Some(use_vip) = self.use_service_vip {
            *use_service_vip = use_vip;
        }

        Ok(config)
    }

    /// Runs one pass over the input named by `-f`.
    ///
    /// # Errors
    ///
    /// Returns an error when `-f` is missing, when the configuration file
    /// cannot be loaded, when the input or output cannot be opened, or when
    /// rewriting the stream fails.
    pub fn run(self) -> Result<i32, Error> {
        if let Some(shell) = self.completions {
            let mut app = Self::command();
            let bin_name = app.get_name().to_string();
            clap_complete::generate(shell, &mut app, bin_name, &mut std::io::stdout());
            return Ok(0);
        }
        if self.default_config {
            let rendered = Config::default().to_yaml()?;
            std::io::stdout().write_all(rendered.as_bytes()).context(error::WriteStdoutSnafu)?;
            return Ok(0);
        }

        let input_file = self
            .input_file
            .as_deref()
            .filter(|s| !s.is_empty())
            .context(error::MissingInputFileSnafu)?;

        let config = self.load_config()?;
        config.log.registry();

        let Summary { documents, injected, already_injected, passed_through } =
            rewrite_files(&config.inject, input_file, &self.output_file)?;
        tracing::info!(
            documents,
            injected,
            already_injected,
            passed_through,
            "rewrote manifest stream"
        );

        Ok(0)
    }
}

/// Opens the input and output and runs the pass. Both handles are owned by
/// this scope and closed when it ends, whether the pass succeeded or not.
fn rewrite_files(
    config: &InjectionConfig,
    input_file: &str,
    output_file: &str,
) -> Result<Summary, Error> {
    let input: Box<dyn Read> = if input_file == STDIN_PATH {
        Box::new(std::io::stdin().lock())
    } else {
        let file = File::open(input_file)
            .with_context(|_| error::OpenInputSnafu { file_path: PathBuf::from(input_file) })?;
        Box::new(file)
    };

    let summary = if output_file.is_empty() {
        manifest::rewrite(config, input, std::io::stdout().lock())?
    } else {
        let file = File::create(output_file)
            .with_context(|_| error::CreateOutputSnafu { file_path: PathBuf::from(output_file) })?;
        manifest::rewrite(config, input, BufWriter::new(file))?
    };

    Ok(summary)
}
