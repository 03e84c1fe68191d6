// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "k8s-inspect")]
#[command(author, version, about = "Read-only Kubernetes inspection tools")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Kubernetes context to use (defaults to the configured or current context)
    #[arg(short, long, value_name = "CONTEXT", global = true)]
    pub context: Option<String>,

    /// Per-call timeout in seconds
    #[arg(short, long, value_name = "SECONDS", global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose logging (also to stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one tool and print its JSON payload
    Call {
        /// Tool name (listResources, getResource, getAPIResources, getEvents)
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(short, long, value_name = "JSON", default_value = "{}")]
        args: String,

        /// Print the whole response envelope instead of the payload text
        #[arg(long)]
        envelope: bool,
    },

    /// Print the tool catalogue with argument schemas
    Tools,

    /// Remember a kubeconfig context as the default (omit to clear it)
    UseContext {
        /// Context name
        name: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_call() {
        let args = Args::try_parse_from([
            "k8s-inspect",
            "call",
            "listResources",
            "--args",
            r#"{"Kind":"Pod"}"#,
            "-c",
            "prod",
        ])
        .unwrap();

        assert_eq!(args.context.as_deref(), Some("prod"));
        match args.command {
            Command::Call {
                tool,
                args,
                envelope,
            } => {
                assert_eq!(tool, "listResources");
                assert_eq!(args, r#"{"Kind":"Pod"}"#);
                assert!(!envelope);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_call_default_args() {
        let args = Args::try_parse_from(["k8s-inspect", "-v", "call", "getEvents"]).unwrap();
        assert!(args.verbose);
        assert!(matches!(args.command, Command::Call { ref args, .. } if args == "{}"));
    }

    #[test]
    fn test_parse_tools() {
        let args = Args::try_parse_from(["k8s-inspect", "tools", "--timeout", "5"]).unwrap();
        assert!(matches!(args.command, Command::Tools));
        assert_eq!(args.timeout, Some(5));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["k8s-inspect"]).is_err());
    }

    #[test]
    fn test_parse_use_context() {
        let args = Args::try_parse_from(["k8s-inspect", "use-context", "staging"]).unwrap();
        match args.command {
            Command::UseContext { name } => assert_eq!(name.as_deref(), Some("staging")),
            other => panic!("unexpected command: {:?}", other),
        }

        let args = Args::try_parse_from(["k8s-inspect", "use-context"]).unwrap();
        assert!(matches!(args.command, Command::UseContext { name: None }));
    }
}
