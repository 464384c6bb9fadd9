//! Minimal embedded demo binary
//!
//! Reads SQL statements from stdin, one per line, and prints the resulting
//! JSON Result object to stdout. Intended to exercise a `Coordinator`
//! end-to-end, not as a production server.

use distdb::{Config, Coordinator};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = Config::from_env();

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--data-dir" | "-d" => {
                if i + 1 < args.len() {
                    config.data_dir = PathBuf::from(&args[i + 1]);
                    config.wal_dir = config.data_dir.join("wal");
                    i += 1;
                }
            }
            "--node-id" | "-n" => {
                if i + 1 < args.len() {
                    config.node_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("distdb - embedded SQL-subset datastore demo");
                println!();
                println!("Usage: distdb [OPTIONS]");
                println!();
                println!("Reads SQL statements from stdin, one per line.");
                println!();
                println!("Options:");
                println!("  -d, --data-dir DIR    Data directory (default: ./data)");
                println!("  -n, --node-id ID      Node id (default: node-1)");
                println!("  -h, --help            Show this help");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    log::info!("starting distdb node '{}' at {:?}", config.node_id, config.data_dir);
    let coordinator = Coordinator::new(config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in stdin.lock().lines() {
        let line = line?;
        let sql = line.trim();
        if sql.is_empty() {
            continue;
        }
        let result = coordinator.execute(sql);
        writeln!(out, "{}", serde_json::to_string(&result)?)?;
    }

    coordinator.shutdown()?;
    Ok(())
}
