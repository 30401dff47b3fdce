//! STWO DLC Bridge demo
//!
//! Runs one proof, one contract and one attestation through the bridge and
//! verifies each result.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use stwo_dlc_bridge::{
    core::{hash::hash_bytes, SATS_PER_BTC},
    Bridge, BridgeConfig, VERSION,
};

fn main() -> anyhow::Result<()> {
    let config = BridgeConfig::from_env().context("invalid bridge configuration")?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_new(&config.log_filter).context("invalid log filter")?)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    info!("STWO DLC Bridge v{}", VERSION);

    let bridge = Bridge::from_config(&config);

    demo_proof(&bridge)?;
    demo_contract(&bridge)?;
    demo_attestation(&bridge)?;

    info!("=== Demo Complete ===");
    Ok(())
}

fn demo_proof(bridge: &Bridge) -> anyhow::Result<()> {
    info!("=== Proof ===");

    let input_hash = hex::encode(hash_bytes(b"input_hash"));
    let output_hash = hex::encode(hash_bytes(b"output_hash"));

    let buffer = bridge.generate_proof("hash_integrity", &input_hash, &output_hash)?;
    info!("Envelope: {} bytes", buffer.as_str().len());

    let proof = buffer.decode()?;
    info!("Proof ID: {}", proof.proof_id);
    info!("Backend: {}", proof.backend);
    info!("Public inputs: {} M31 elements", proof.public_inputs.len());

    bridge
        .proofs()
        .verify_proof(&proof, "hash_integrity", &input_hash, &output_hash)
        .context("proof did not verify")?;
    info!("Proof verified");
    Ok(())
}

fn demo_contract(bridge: &Bridge) -> anyhow::Result<()> {
    info!("=== Contract ===");

    let contract = bridge
        .create_contract(&["above_50k", "below_50k"], &[100.0, 0.0], "oracle_pub_abc")?
        .decode()?;

    info!("Contract ID: {}", contract.contract_id_hex());
    info!("Oracle: {}", contract.oracle());

    let sats = contract.payouts().to_base_units(SATS_PER_BTC)?;
    for ((outcome, payout), sats) in contract.iter().zip(sats) {
        info!("  {} -> {} BTC ({} sat)", outcome, payout, sats);
    }

    match bridge.create_contract(&[] as &[&str], &[], "oracle_pub_abc") {
        Ok(_) => anyhow::bail!("empty outcome set was accepted"),
        Err(e) => info!("Empty outcome set rejected: {}", e),
    }
    Ok(())
}

fn demo_attestation(bridge: &Bridge) -> anyhow::Result<()> {
    info!("=== Attestation ===");

    let signature = bridge.sign_outcome("above_50k")?.decode()?;
    info!("Canonical message: {}", signature.canonical_message());
    info!("Oracle key: {}", hex::encode(&signature.oracle_public_key));

    signature
        .verify_from(&bridge.oracle_public_key())
        .context("attestation did not verify")?;
    info!("Attestation verified");
    Ok(())
}
