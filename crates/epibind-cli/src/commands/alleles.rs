use crate::cli::AllelesArgs;
use crate::error::{CliError, Result};
use epibind::core::alleles;
use tracing::debug;

pub fn run(args: AllelesArgs) -> Result<()> {
    let species: Vec<&str> = match args.species.as_deref() {
        Some(name) => vec![name],
        None => alleles::species_names(),
    };
    debug!("Listing allele presets for {:?}", species);

    for name in species {
        let preset = alleles::preset_for(name).ok_or_else(|| {
            CliError::Argument(format!(
                "No built-in allele set for species '{}'. Known species: {}.",
                name,
                alleles::species_names().join(", ")
            ))
        })?;
        println!("{}", render_preset(name, &preset));
    }
    Ok(())
}

fn render_preset(species: &str, preset: &str) -> String {
    let alleles: Vec<&str> = preset.split(',').collect();
    let mut out = format!("{} ({} alleles)", species.to_ascii_lowercase(), alleles.len());
    for allele in alleles {
        out.push_str("\n  ");
        out.push_str(allele);
    }
    out
}
