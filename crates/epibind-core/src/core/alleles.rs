//! Built-in MHC class II allele sets, keyed by species.

use phf::phf_map;

static PRESETS: phf::Map<&'static str, &'static str> = phf_map! {
    "human" => "DPA1*01/DPB1*04:01,DPA1*01:03/DPB1*02:01,DPA1*02:01/DPB1*01:01,
                DPA1*02:01/DPB1*05:01,DPA1*03:01/DPB1*04:02,DQA1*01:01/DQB1*05:01,
                DQA1*01:02/DQB1*06:02,DQA1*03:01/DQB1*03:02,DQA1*04:01/DQB1*04:02,
                DQA1*05:01/DQB1*02:01,DQA1*05:01/DQB1*03:01,DRB1*01:01,DRB1*03:01,
                DRB1*04:01,DRB1*04:05,DRB1*07:01,DRB1*08:02,DRB1*09:01,DRB1*11:01,
                DRB1*12:01,DRB1*13:02,DRB1*15:01,DRB3*01:01,DRB3*02:02,DRB4*01:01,
                DRB5*01:01",
    "mouse" => "H2-IAb,H2-IAd,H2-IEd,H2-IAk,H2-IEk",
};

/// Returns the normalized allele set for `species`, if a preset exists.
///
/// Lookup is case-insensitive.
pub fn preset_for(species: &str) -> Option<String> {
    PRESETS
        .get(species.to_ascii_lowercase().as_str())
        .map(|raw| normalize_allele_list(raw))
}

/// Names of all species with a built-in preset, sorted.
pub fn species_names() -> Vec<&'static str> {
    let mut names: Vec<_> = PRESETS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Strips whitespace and empty entries from a comma-separated allele list.
pub fn normalize_allele_list(raw: &str) -> String {
    raw.split(',')
        .map(|allele| {
            allele
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
        })
        .filter(|allele| !allele.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
