// PeaServer CLI: one request per invocation; config from file and env.

mod config;

use std::collections::HashMap;
use std::io::Read;
use std::time::Duration;

use anyhow::Context;
use peaserver_client::{Operation, PeaServer};
use serde_json::Value;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut operation: Option<Operation> = None;
    let mut file: Option<String> = None;
    let mut address_override: Option<String> = None;
    let mut headers: HashMap<String, Value> = HashMap::new();
    let mut print_landmarks = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("peaserver-cli {VERSION}");
                return Ok(());
            }
            "--landmarks" => print_landmarks = true,
            "--address" => {
                address_override = Some(args.next().context("--address needs a value")?);
            }
            "--header" => {
                let kv = args.next().context("--header needs KEY=VALUE")?;
                let (k, v) = kv
                    .split_once('=')
                    .context("--header needs KEY=VALUE")?;
                headers.insert(k.to_string(), Value::from(v));
            }
            "store" if operation.is_none() => operation = Some(Operation::Store),
            "delete" if operation.is_none() => operation = Some(Operation::Delete),
            "transfer" if operation.is_none() => operation = Some(Operation::Transfer),
            other if operation.is_some() && file.is_none() => file = Some(other.to_string()),
            other => {
                eprintln!("unknown argument: {other}");
                usage();
                std::process::exit(2);
            }
        }
    }

    let mut cfg = config::load();
    if address_override.is_some() {
        cfg.address = address_override;
    }

    let client = PeaServer::with_address(cfg.address);

    if print_landmarks {
        println!("{}", serde_json::to_string_pretty(client.landmarks_map())?);
        return Ok(());
    }

    let operation = match operation {
        Some(op) => op,
        None => {
            usage();
            std::process::exit(2);
        }
    };

    let payload = match &file {
        Some(path) => std::fs::read(path).with_context(|| format!("reading {path}"))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    let header_field = if headers.is_empty() {
        None
    } else {
        Some(headers)
    };

    let rt = tokio::runtime::Runtime::new()?;
    let response = rt.block_on(client.request(
        payload,
        header_field,
        operation,
        Duration::from_secs(cfg.timeout_secs),
    ))?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn usage() {
    eprintln!(
        "usage: peaserver-cli [--version] [--landmarks] [--address ADDR] [--header K=V]... <store|delete|transfer> [FILE]"
    );
}
