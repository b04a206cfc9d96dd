//! `segmerge plan` – show the manifest without writing it or running ffmpeg.

use anyhow::Result;
use segmerge_core::manifest::render_manifest;
use segmerge_core::segments::build_addresses;
use segmerge_core::MergeRequest;

pub fn run_plan(req: &MergeRequest) -> Result<()> {
    let valid = req.validate()?;
    let addresses = build_addresses(&valid);
    tracing::info!(segments = addresses.len(), "planned merge");
    println!("{}", render_manifest(&addresses));
    Ok(())
}
