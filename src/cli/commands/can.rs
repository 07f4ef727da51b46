use clap::Args;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::permissions::{has_permission, PermissionOverride, Role};

#[derive(Args)]
pub struct CanArgs {
    #[arg(help = "Role, e.g. FIELD_TECH")]
    pub role: Role,

    #[arg(help = "Permission token, e.g. pppoe:view")]
    pub permission: String,

    #[arg(long = "add", value_name = "PERMISSION", help = "Per-user grant (repeatable)")]
    pub added: Vec<String>,

    #[arg(long = "remove", value_name = "PERMISSION", help = "Per-user revocation (repeatable)")]
    pub removed: Vec<String>,
}

pub fn handle(args: CanArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let overrides = PermissionOverride::new(args.added, args.removed);
    let allowed = has_permission(args.role, &overrides.added, &overrides.removed, &args.permission);

    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "role": args.role,
                "permission": args.permission,
                "allowed": allowed
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            let verdict = if allowed { "allowed" } else { "denied" };
            println!("{} {} {}", args.role, verdict, args.permission);
        }
    }

    Ok(())
}
