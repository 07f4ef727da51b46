use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::vpn::PeerSample;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(extra)) = data {
                if let Some(object) = response.as_object_mut() {
                    object.extend(extra);
                }
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print probe samples as a table or a JSON document
pub fn print_samples(output_format: &OutputFormat, samples: &[PeerSample]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "peers": samples }))?);
        }
        OutputFormat::Text => {
            if samples.is_empty() {
                println!("No peers");
                return Ok(());
            }

            println!(
                "{:<46} {:<22} {:<20} {:<10} {:>12} {:>12}",
                "PUBLIC KEY", "ENDPOINT", "HANDSHAKE", "STATE", "RX", "TX"
            );
            println!("{}", "-".repeat(127));

            for sample in samples {
                let handshake = sample
                    .last_handshake
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "never".to_string());
                let state = if sample.is_connected { "connected" } else { "stale" };

                println!(
                    "{:<46} {:<22} {:<20} {:<10} {:>12} {:>12}",
                    sample.public_key,
                    sample.endpoint.as_deref().unwrap_or("(none)"),
                    handshake,
                    state,
                    sample.rx_bytes,
                    sample.tx_bytes
                );
                for net in &sample.allowed_ips {
                    println!("    allowed {}", net);
                }
            }
        }
    }
    Ok(())
}
