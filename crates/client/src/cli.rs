use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::{DEFAULT_DEPOSIT_ADDR, DEFAULT_WITHDRAW_ADDR};

/// Deposit to or withdraw from a donation account
#[derive(Parser, Debug)]
#[command(name = "donation-client")]
#[command(about = "Deposit to or withdraw from a donation account", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Credit an account over TCP
    Deposit {
        #[arg(long, value_name = "NAME", help = "Account name (prompted when omitted)")]
        name: Option<String>,

        #[arg(long, value_name = "AMOUNT", help = "Amount to add (prompted when omitted)")]
        amount: Option<String>,

        #[arg(long, value_name = "HOST:PORT", default_value = DEFAULT_DEPOSIT_ADDR)]
        addr: String,
    },

    /// Debit an account over UDP
    Withdraw {
        #[arg(long, value_name = "NAME", help = "Account name (prompted when omitted)")]
        name: Option<String>,

        #[arg(long, value_name = "AMOUNT", help = "Amount to withdraw (prompted when omitted)")]
        amount: Option<String>,

        #[arg(long, value_name = "HOST:PORT", default_value = DEFAULT_WITHDRAW_ADDR)]
        addr: String,

        #[arg(
            long = "timeout-ms",
            value_name = "MS",
            default_value_t = 5000,
            help = "How long to wait for the reply datagram"
        )]
        timeout_ms: u64,
    },
}

impl Command {
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            Command::Withdraw { timeout_ms, .. } => Some(Duration::from_millis(*timeout_ms)),
            Command::Deposit { .. } => None,
        }
    }
}
