//! Subcommand implementations.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use skillpass_core::{Address, ContractConfig, ObjectId};
use skillpass_credential::{
    CertificateSummary, CredentialRepository, CredentialVerifier, HealthCheck,
    NormalizedCredential, VerificationOutcome, parse_verification_link, verification_url,
};
use skillpass_ports::LedgerClient;
use skillpass_rpc::{RpcConfig, RpcLedgerClient};
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, Command, View};

/// Runs the parsed command.
pub async fn run(cli: Cli, cancel: CancellationToken) -> Result<ExitCode> {
    // `link` needs neither configuration nor network.
    if let Command::Link { origin, id } = &cli.command {
        println!("{}", verification_url(origin, &ObjectId::new(id)));
        return Ok(ExitCode::SUCCESS);
    }

    let config = Arc::new(
        ContractConfig::load(cli.config.as_deref()).context("failed to load configuration")?,
    );
    let ledger: Arc<dyn LedgerClient> = Arc::new(
        RpcLedgerClient::new(RpcConfig::new(config.network_url()?))
            .context("failed to create ledger client")?,
    );

    match cli.command {
        Command::Health => {
            let status = HealthCheck::new(ledger, config.package_id.clone())
                .check()
                .await;
            print(
                &json!({ "package_id": config.package_id, "status": status }),
                cli.pretty,
            )?;
            Ok(if status.allows_mutations() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Owned { address, view } => {
            let credentials = CredentialRepository::new(ledger, config)
                .owned_credentials(&Address::new(address), &cancel)
                .await?;
            render(&credentials, &view, cli.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Issued { address, view } => {
            let credentials = CredentialRepository::new(ledger, config)
                .issued_credentials(&Address::new(address), &cancel)
                .await?;
            render(&credentials, &view, cli.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify { id, view } => {
            let id = parse_verification_link(&id).unwrap_or_else(|| ObjectId::new(&id));
            match CredentialVerifier::new(ledger).lookup(&id).await {
                VerificationOutcome::Found(credential) => {
                    render(std::slice::from_ref(&credential), &view, cli.pretty)?;
                    Ok(ExitCode::SUCCESS)
                }
                VerificationOutcome::NotFound | VerificationOutcome::LookupFailed(_) => {
                    print(&json!({ "id": id, "status": "not_found" }), cli.pretty)?;
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Link { .. } => Ok(ExitCode::SUCCESS),
    }
}

fn render(credentials: &[NormalizedCredential], view: &View, pretty: bool) -> Result<()> {
    if view.summary {
        let summaries: Vec<CertificateSummary> = credentials
            .iter()
            .map(|c| CertificateSummary::from_credential(c, &view.origin))
            .collect();
        print(&summaries, pretty)
    } else {
        print(&credentials, pretty)
    }
}

fn print<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
