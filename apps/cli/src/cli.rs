//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Read and verify academic credentials on the ledger.
#[derive(Debug, Parser)]
#[command(name = "skillpass", version, about)]
pub struct Cli {
    /// Contract configuration file (TOML). `SKILLPASS_*` variables override it.
    #[arg(long, short, global = true, env = "SKILLPASS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the contract package exists on the network.
    Health,

    /// List credentials owned by an address.
    Owned {
        /// Holder address.
        address: String,
        #[command(flatten)]
        view: View,
    },

    /// List credentials issued by an address.
    Issued {
        /// Issuer address.
        address: String,
        #[command(flatten)]
        view: View,
    },

    /// Look up a credential by id or verification link.
    Verify {
        /// Credential id, or a `<origin>/verify/<id>` link.
        id: String,
        #[command(flatten)]
        view: View,
    },

    /// Print the verification link of a credential.
    Link {
        /// Origin of the verification site, e.g. `https://skillpass.app`.
        origin: String,
        /// Credential id.
        id: String,
    },
}

/// How credentials are rendered.
#[derive(Debug, Clone, clap::Args)]
pub struct View {
    /// Print display summaries instead of full records.
    #[arg(long)]
    pub summary: bool,

    /// Origin used for verification links in summaries.
    #[arg(long, env = "SKILLPASS_ORIGIN", default_value = "https://skillpass.app")]
    pub origin: String,
}
