//! Command-line configuration.
//!
//! Every flag can also be supplied through an `IMAGINE_*` environment variable.

use std::path::PathBuf;

use clap::Parser;

use crate::policy::{Polarity, PolicyConfig};
use crate::webhooks::{DEFAULT_PORT, Protocol};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "kebab_case")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable lines
    Text,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "imagine",
    version,
    about = "Validating admission webhook that checks container image names"
)]
pub struct Config {
    /// Path to the TLS private key (PEM)
    #[arg(long, env = "IMAGINE_KEY")]
    pub key: PathBuf,

    /// Path to the TLS certificate chain (PEM)
    #[arg(long, env = "IMAGINE_CERT")]
    pub cert: PathBuf,

    /// Part of the image name used when validating
    #[arg(long, env = "IMAGINE_IMAGE_NAME", default_value = "")]
    pub image_name: String,

    /// Port to listen on
    #[arg(long, env = "IMAGINE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Wire contract to speak
    #[arg(long, env = "IMAGINE_PROTOCOL", value_enum, default_value_t = Protocol::AdmissionReview)]
    pub protocol: Protocol,

    /// Match polarity (defaults to the protocol's customary polarity)
    #[arg(long, env = "IMAGINE_POLARITY", value_enum)]
    pub polarity: Option<Polarity>,

    /// Log output format
    #[arg(long, env = "IMAGINE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

impl Config {
    /// Effective polarity: explicit flag, else the protocol default
    pub fn polarity(&self) -> Polarity {
        self.polarity.unwrap_or_else(|| self.protocol.default_polarity())
    }

    /// Build the immutable policy for this process
    pub fn policy(&self) -> PolicyConfig {
        PolicyConfig::new(self.image_name.clone(), self.polarity())
    }
}
