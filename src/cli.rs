use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::threat_model::domain::{ThreatAction, ThreatType};

/// Work with diagrams on a remote threat-modelling service
#[derive(Parser, Debug)]
#[command(name = "threatflow")]
#[command(version)]
#[command(
    about = "Upload architecture diagrams, extract components, generate STRIDE threats and export reports",
    long_about = None
)]
pub struct Args {
    /// Path to a threatflow.config.yml (defaults to auto-discovery in
    /// the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// GraphQL endpoint of the threat-modelling service
    #[arg(long, value_name = "URL")]
    pub api_endpoint: Option<String>,

    /// API key sent as the x-api-key header
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Endpoint of the storage gateway for uploads and reports
    #[arg(long, value_name = "URL")]
    pub storage_endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the account's diagrams
    List,

    /// Show a diagram's components and threats
    Show {
        /// Diagram id
        id: String,

        /// Only show threats of this component id
        #[arg(long, value_name = "COMPONENT_ID")]
        component: Option<String>,

        /// Only show threats of this STRIDE type (e.g. spoofing, tampering)
        #[arg(long, value_name = "TYPE")]
        threat_type: Option<ThreatType>,
    },

    /// Upload a diagram image and generate its description
    Create {
        /// Path to the diagram image
        image: PathBuf,

        /// Free-text description to guide the analysis
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Extract components from a diagram
    Extract {
        /// Diagram id
        id: String,

        /// Confirm re-extraction even though components already exist
        /// (results are appended and may duplicate)
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate STRIDE threats for a diagram's components
    Generate {
        /// Diagram id
        id: String,

        /// Restrict generation to these threat types; repeatable
        /// (defaults to all six)
        #[arg(short = 't', long = "threat-type", value_name = "TYPE")]
        threat_types: Vec<ThreatType>,
    },

    /// Record a disposition for one threat
    Act {
        /// Diagram id
        id: String,

        /// Component id owning the threat
        #[arg(long, value_name = "COMPONENT_ID")]
        component: String,

        /// Threat id
        #[arg(long, value_name = "THREAT_ID")]
        threat: String,

        /// Disposition: mitigate, avoid, transfer, accept-ignore or
        /// not-applicable
        #[arg(long)]
        action: ThreatAction,

        /// Justification for the disposition (prompted for when omitted)
        #[arg(long)]
        reason: Option<String>,
    },

    /// Delete components that have no threats
    DeleteComponents {
        /// Diagram id
        id: String,

        /// Component ids to delete
        #[arg(required = true)]
        components: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export the threat-model report and download it
    Report {
        /// Diagram id
        id: String,

        /// Output file (defaults to a timestamped name from the link)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
