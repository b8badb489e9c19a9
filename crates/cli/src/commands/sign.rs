//! `sign` command implementation.

use anyhow::{Context, Result};

use contracts::{SignedEnvelope, SignedPayload};
use propagation::Signer;

use crate::cli::SignArgs;

/// Execute the `sign` command
///
/// With `--body` prints the bare signature; with `--resource/--realm/--service`
/// prints the complete envelope a consumer would receive.
pub fn run_sign(args: &SignArgs) -> Result<()> {
    let signer = Signer::new(&args.secret).context("Invalid secret")?;
    println!("{}", render(&signer, args)?);
    Ok(())
}

fn render(signer: &Signer, args: &SignArgs) -> Result<String> {
    if let Some(body) = &args.body {
        return Ok(signer.sign(body.as_bytes()));
    }

    match (&args.resource, &args.realm, &args.service) {
        (Some(resource), Some(realm), Some(service)) => {
            let payload = SignedPayload {
                realm: realm.as_str().into(),
                resource: resource.clone(),
                service: service.as_str().into(),
            };
            let sign = signer.sign(&payload.canonical_bytes()?);
            let envelope = SignedEnvelope::new(payload, sign);
            serde_json::to_string_pretty(&envelope).context("Failed to serialize envelope")
        }
        _ => anyhow::bail!("Either --body or --resource with --realm and --service is required"),
    }
}
