use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nrmac_core::consts::MAC_SCALES;
use nrmac_core::io::decode::load_raster;
use nrmac_core::quality::mac::mac;
use nrmac_core::raster::SourceInfo;

#[derive(Args)]
pub struct ScoreArgs {
    /// Image files to score
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Also print the per-scale features
    #[arg(long)]
    pub features: bool,
}

pub fn run(args: &ScoreArgs) -> Result<()> {
    for file in &args.files {
        let raster = load_raster(file)
            .with_context(|| format!("Failed to decode {}", file.display()))?;
        let info = SourceInfo::new(file.clone(), &raster);
        let result = mac(&raster, &raster, &raster)
            .with_context(|| format!("Failed to score {}", file.display()))?;

        println!(
            "{}  {}x{}x{}  {:.6}",
            info.filename.display(),
            info.width,
            info.height,
            info.channels,
            result.nrmac
        );
        if args.features {
            for (scale, feature) in MAC_SCALES.iter().zip(result.features.iter()) {
                println!("    scale {:>2}  {:.6}", scale, feature);
            }
        }
    }

    Ok(())
}
