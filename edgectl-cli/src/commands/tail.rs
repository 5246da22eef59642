//! `edgectl tail` — stream request logs from a service to the terminal.
//!
//! The platform can forward request logs to a TCP endpoint. This command
//! attaches a session-named log endpoint to the service (one transaction),
//! accepts forwarded lines on a local socket and prints them, then detaches
//! the endpoint again when the operator stops the session (a second
//! transaction). The `--endpoint` address must reach this machine, e.g. via a
//! tunnel.

use std::io::{self, BufRead, BufReader};
use std::net::{TcpListener, TcpStream};
use std::thread;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use crate::session::{ForwardTarget, LogSession};
use crate::ApiOpts;

/// Arguments for `edgectl tail`.
#[derive(Args, Debug)]
pub struct TailArgs {
    /// Name of the service to tail.
    pub service: String,

    /// Address the platform forwards log lines to.
    #[arg(long)]
    pub endpoint: String,

    /// Port on the forwarding address.
    #[arg(long, default_value_t = 443)]
    pub port: u16,

    /// Local interface to accept forwarded lines on.
    #[arg(long, default_value = "localhost")]
    pub local_endpoint: String,

    /// Local port to accept forwarded lines on.
    #[arg(long, default_value_t = 8080)]
    pub local_port: u16,
}

impl TailArgs {
    pub fn run(self, api: &ApiOpts) -> Result<()> {
        let client = api.client()?;

        let service = client
            .service_by_name(&self.service)
            .context("searching for service")?;
        let Some(service) = service else {
            bail!("cannot find service '{}'", self.service);
        };

        // Bind before touching the remote config so a bad local address does
        // not leave an endpoint attached.
        let listener = TcpListener::bind((self.local_endpoint.as_str(), self.local_port))
            .with_context(|| format!("binding {}:{}", self.local_endpoint, self.local_port))?;

        let session = LogSession::new(
            &client,
            &service,
            ForwardTarget {
                address: self.endpoint.clone(),
                port: self.port,
            },
        );
        session.start()?;

        thread::spawn(move || accept_loop(listener));

        println!(
            "{} streaming logs for '{}' — press Enter to stop",
            "✓".green(),
            service.name
        );
        let mut line = String::new();
        io::stdin()
            .read_line(&mut line)
            .context("waiting for stop")?;

        session.dispose()
    }
}

fn accept_loop(listener: TcpListener) {
    for connection in listener.incoming() {
        match connection {
            Ok(stream) => {
                thread::spawn(move || print_lines(stream));
            }
            Err(_) => break,
        }
    }
}

fn print_lines(stream: TcpStream) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        match line {
            Ok(line) => println!("{line}"),
            Err(err) => {
                eprintln!("log stream closed: {err}");
                break;
            }
        }
    }
}
