//! Sendflow CLI - offline payment-input triage.
//!
//!   sendflow check <input>         → classify and validate a pasted string
//!
//! Options:
//!   --network <bitcoin|testnet|signet|regtest>   (default: bitcoin)
//!   --pretty                                     pretty-print the verdict
//!
//! Remote protocol requests are classified but not fetched; this tool has no
//! network access.

use async_trait::async_trait;
use sendflow::logging::init_logging;
use sendflow::{
    Network, PaymentRequestResolver, ProtocolRequest, RequestError, RequestFetcher,
    ResolvedRequest,
};
use serde_json::{json, Value};
use std::env;

struct OfflineFetcher;

#[async_trait]
impl RequestFetcher for OfflineFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<ProtocolRequest> {
        anyhow::bail!("offline: would fetch {}", url)
    }
}

fn main() {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let mut network = Network::Bitcoin;
    let mut pretty = false;
    let mut command = None;
    let mut input = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--network" => {
                let value = iter.next().map(String::as_str).unwrap_or("");
                match Network::from_str(value) {
                    Some(net) => network = net,
                    None => return fail(&format!("unknown network: {}", value)),
                }
            }
            "--pretty" => pretty = true,
            "--help" | "-h" => return print_usage(),
            other if command.is_none() => command = Some(other.to_string()),
            other if input.is_none() => input = Some(other.to_string()),
            other => return fail(&format!("unexpected argument: {}", other)),
        }
    }

    match command.as_deref() {
        Some("check") => {
            let Some(input) = input else {
                return fail("check requires an input string");
            };
            let verdict = check(&input, network);
            print_value(&verdict, pretty);
        }
        Some(cmd) => fail(&format!("unknown command: {}", cmd)),
        None => print_usage(),
    }
}

fn check(input: &str, network: Network) -> Value {
    let resolver = PaymentRequestResolver::new(network);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime");
    let result = runtime.block_on(resolver.resolve(input, &OfflineFetcher));

    match result {
        Ok(ResolvedRequest::Local { address, amount_sat, label }) => json!({
            "valid": true,
            "kind": "local",
            "network": network.as_str(),
            "address": address,
            "amount_sat": amount_sat,
            "label": label,
        }),
        Ok(ResolvedRequest::Remote(_)) => unreachable!("offline fetcher cannot succeed"),
        Err(RequestError::FetchFailed(detail)) => json!({
            "valid": true,
            "kind": "remote",
            "network": network.as_str(),
            "detail": detail,
        }),
        Err(error) => json!({
            "valid": false,
            "network": network.as_str(),
            "error": error.to_string(),
        }),
    }
}

fn print_value(value: &Value, pretty: bool) {
    if pretty {
        println!("{:#}", value);
    } else {
        println!("{}", value);
    }
}

fn fail(message: &str) {
    eprintln!("error: {}", message);
    std::process::exit(1);
}

fn print_usage() {
    println!("sendflow - payment-input triage");
    println!();
    println!("Usage:");
    println!("  sendflow check <input> [--network <net>] [--pretty]");
}
