use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;

/// Tiny gzip member with an empty payload, enough for a `.nii.gz` placeholder.
const EMPTY_GZIP: [u8; 20] = [
    0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x03, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00,
];

fn write_placeholder(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, EMPTY_GZIP).with_context(|| format!("writing {}", path.display()))
}

/// Writes a results folder and a data directory shaped like a registration run:
///
/// ```text
/// <out>/results/deformations/caseNN_deformation_to_atlas.nii.gz
/// <out>/results/deformed/caseNN_deformed_to_atlas.nii.gz
/// <out>/results/deformed/caseNN_deformed_to_atlas_seg.nii.gz   (every other case)
/// <out>/data/images/{caseNN,atlas}.nii.gz
/// <out>/data/masks/{caseNN,atlas}.nii.gz
/// <out>/deform-loader.json
/// ```
fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let out = PathBuf::from(args.next().unwrap_or_else(|| "sample_data".to_string()));
    let cases: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("'{n}' is not a case count"))?,
        None => 5,
    };

    let results = out.join("results");
    let data = out.join("data");

    for i in 0..cases {
        let case = format!("case{i:02}");
        write_placeholder(
            &results
                .join("deformations")
                .join(format!("{case}_deformation_to_atlas.nii.gz")),
        )?;
        write_placeholder(
            &results
                .join("deformed")
                .join(format!("{case}_deformed_to_atlas.nii.gz")),
        )?;
        if i % 2 == 0 {
            write_placeholder(
                &results
                    .join("deformed")
                    .join(format!("{case}_deformed_to_atlas_seg.nii.gz")),
            )?;
        }
        write_placeholder(&data.join("images").join(format!("{case}.nii.gz")))?;
        write_placeholder(&data.join("masks").join(format!("{case}.nii.gz")))?;
    }
    write_placeholder(&data.join("images").join("atlas.nii.gz"))?;
    write_placeholder(&data.join("masks").join("atlas.nii.gz"))?;

    let config = json!({
        "root_path": results.display().to_string(),
        "data_dir": data.display().to_string(),
        "find_originals": true,
    });
    let config_path = out.join("deform-loader.json");
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("writing {}", config_path.display()))?;

    println!(
        "Wrote {cases} cases to {} (config: {})",
        results.display(),
        config_path.display()
    );
    Ok(())
}
