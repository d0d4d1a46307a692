//! Interactive client for the donation server.
//!
//! ```bash
//! donation-client deposit
//! donation-client withdraw --name alice --amount 25
//! ```

use std::io::{self, BufRead, Write};

use clap::Parser;

use donation_client::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    donation_observability::init_cli();
    let args = CliArgs::parse();

    let (reply, operation) = match &args.command {
        Command::Deposit { name, amount, addr } => {
            let name = field(name.as_deref(), "Enter username: ")?;
            let amount = field(amount.as_deref(), "Enter amount to add: ")?;
            (donation_client::deposit(addr, &name, &amount).await?, "Deposit")
        }
        Command::Withdraw { name, amount, addr, .. } => {
            let name = field(name.as_deref(), "Enter username: ")?;
            let amount = field(amount.as_deref(), "Enter amount to withdraw: ")?;
            let timeout = args.command.timeout().unwrap_or(donation_client::DEFAULT_TIMEOUT);
            (
                donation_client::withdraw(addr, &name, &amount, timeout).await?,
                "Withdrawal",
            )
        }
    };

    println!("Server Response: {reply}");
    if donation_client::is_success(&reply) {
        println!("{operation} Success");
    } else {
        println!("{operation} Failed");
    }
    Ok(())
}

/// Use the flag value if given, otherwise prompt on stdin.
fn field(given: Option<&str>, prompt: &str) -> io::Result<String> {
    if let Some(value) = given {
        return Ok(value.trim().to_string());
    }

    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
