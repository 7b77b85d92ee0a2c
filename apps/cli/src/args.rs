//! Command line definition of `rlist`.

use clap::{Parser, Subcommand, ValueEnum};
use rlist_domain::Address;
use rlist_domain::config::{AccessPolicy, RecipientMode};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "rlist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Manage a relay allowed list stored in a snapshot file")]
pub(crate) struct Cli {
    /// Configuration file (TOML, JSON or YAML); a missing file means defaults
    #[arg(long, global = true, default_value = "rlist.toml")]
    pub(crate) config: PathBuf,

    /// Snapshot file, overriding `storage.snapshot` from the configuration
    #[arg(long, global = true)]
    pub(crate) snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Create an empty registry owned by OWNER
    Init {
        #[arg(long)]
        owner: Address,
        /// Maximum number of relays (defaults to `registry.capacity`)
        #[arg(long)]
        capacity: Option<usize>,
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
        /// Who receives recovered tokens
        #[arg(long, value_enum)]
        recipient: Option<RecipientArg>,
    },
    /// Print the owner
    Owner,
    /// Print the manager (zero address when none)
    Manager,
    /// Print the registry version
    Version,
    /// Print the number of relays
    Amount,
    /// Print every relay as a JSON line
    List,
    /// Print the relay with URI
    Get { uri: String },
    /// Add a relay
    Add {
        #[arg(long)]
        caller: Address,
        uri: String,
        #[arg(long, default_value = "")]
        operator: String,
        #[arg(long)]
        mandatory: bool,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Remove a relay; the last relay takes its position
    Remove {
        #[arg(long)]
        caller: Address,
        uri: String,
    },
    /// Hand ownership to NEW_OWNER
    ChangeOwner {
        #[arg(long)]
        caller: Address,
        new_owner: Address,
    },
    /// Delegate relay management to MANAGER
    SetManager {
        #[arg(long)]
        caller: Address,
        manager: Address,
    },
    /// Remove the manager
    DismissManager {
        #[arg(long)]
        caller: Address,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum PolicyArg {
    OwnerOnly,
    OwnerOrManager,
}

impl From<PolicyArg> for AccessPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::OwnerOnly => Self::OwnerOnly,
            PolicyArg::OwnerOrManager => Self::OwnerOrManager,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum RecipientArg {
    Caller,
    Owner,
}

impl From<RecipientArg> for RecipientMode {
    fn from(value: RecipientArg) -> Self {
        match value {
            RecipientArg::Caller => Self::CallerSpecified,
            RecipientArg::Owner => Self::Owner,
        }
    }
}
