use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileRetryConfig, FileStaggerConfig};
use super::models::{AppConfig, ServiceSettings};
use crate::cli::PredictArgs;
use crate::error::{CliError, Result};
use chrono::NaiveDate;
use epibind::core::alleles;
use epibind::core::io::layout::OutputLayout;
use epibind::engine::config as core_config;
use std::time::Duration;

const CUSTOM_ALLELES_TAG: &str = "custom";

pub fn build_config(args: &PredictArgs, today: NaiveDate) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let (tag, allele_set) = resolve_alleles(
        args.species.as_deref().or(file_config.species.as_deref()),
        args.alleles.as_deref().or(file_config.alleles.as_deref()),
        &defaults,
    )?;

    let method = args
        .method
        .clone()
        .or(file_config.method.take())
        .unwrap_or(defaults.method.clone());
    let workers = args
        .workers
        .or(file_config.workers)
        .unwrap_or(defaults.workers);
    let output_dir = args
        .output_dir
        .clone()
        .or(file_config.output_dir.take())
        .unwrap_or(defaults.output_dir.clone());

    let retry_file = file_config.retry.take().unwrap_or_default();
    let max_retries = args
        .max_retries
        .or(retry_file.max_retries)
        .unwrap_or(defaults.max_retries);
    let retry_delay = match args.retry_delay.or(retry_file.delay_secs) {
        Some(secs) => seconds("retry delay", secs)?,
        None => defaults.retry_delay,
    };

    let (jitter, stagger) = if args.no_jitter {
        (core_config::DelayRange::ZERO, core_config::DelayRange::ZERO)
    } else {
        (
            merge_jitter(&retry_file, &defaults)?,
            merge_stagger(file_config.stagger.take(), &defaults)?,
        )
    };

    let service_file = file_config.service.take().unwrap_or_default();
    let service = ServiceSettings {
        endpoint: args
            .endpoint
            .clone()
            .or(service_file.endpoint)
            .unwrap_or(defaults.endpoint.clone()),
        timeout: args
            .timeout
            .or(service_file.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout),
    };

    let layout = OutputLayout::for_run(&output_dir, &args.input, &tag, today);

    let run_config = core_config::RunConfigBuilder::new()
        .worker_count(workers)
        .tag(tag)
        .allele_set(allele_set)
        .method(method)
        .max_retries(max_retries)
        .retry_delay(retry_delay)
        .jitter(jitter)
        .stagger(stagger)
        .layout(layout)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        input_path: args.input.clone(),
        run_config,
        service,
    })
}

/// Picks the allele set and the tag used in the results directory name.
///
/// An explicit allele list wins over the species preset and tags the run as
/// custom.
fn resolve_alleles(
    species: Option<&str>,
    explicit: Option<&str>,
    defaults: &DefaultsConfig,
) -> Result<(String, String)> {
    if let Some(list) = explicit {
        let normalized = alleles::normalize_allele_list(list);
        if normalized.is_empty() {
            return Err(CliError::Config("The allele list is empty.".to_string()));
        }
        return Ok((CUSTOM_ALLELES_TAG.to_string(), normalized));
    }

    let species = species.unwrap_or(&defaults.species);
    let preset = alleles::preset_for(species).ok_or_else(|| {
        CliError::Config(format!(
            "No built-in allele set for species '{}'. Known species: {}. Use --alleles to pass an explicit list.",
            species,
            alleles::species_names().join(", ")
        ))
    })?;
    Ok((species.to_ascii_lowercase(), preset))
}

fn seconds(what: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| CliError::Config(format!("Invalid {}: {} seconds", what, secs)))
}

fn merge_range(
    what: &str,
    min: Option<f64>,
    max: Option<f64>,
    default: core_config::DelayRange,
) -> Result<core_config::DelayRange> {
    let min = match min {
        Some(secs) => seconds(what, secs)?,
        None => default.min(),
    };
    let max = match max {
        Some(secs) => seconds(what, secs)?,
        None => default.max(),
    };
    core_config::DelayRange::new(min, max)
        .map_err(|e| CliError::Config(format!("Invalid {}: {}", what, e)))
}

fn merge_jitter(
    file_val: &FileRetryConfig,
    defaults: &DefaultsConfig,
) -> Result<core_config::DelayRange> {
    merge_range(
        "retry jitter",
        file_val.jitter_min_secs,
        file_val.jitter_max_secs,
        defaults.jitter,
    )
}

fn merge_stagger(
    file_val: Option<FileStaggerConfig>,
    defaults: &DefaultsConfig,
) -> Result<core_config::DelayRange> {
    let file_val = file_val.unwrap_or_default();
    merge_range(
        "task stagger",
        file_val.min_secs,
        file_val.max_secs,
        defaults.stagger,
    )
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let (key, value_str) = kv_pair.split_once('=').ok_or_else(|| {
            CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            ))
        })?;

        let int = |v: &str| -> Result<u64> {
            v.parse().map_err(|_| {
                CliError::Config(format!("Invalid integer value for {}: {}", key, v))
            })
        };
        let float = |v: &str| -> Result<f64> {
            v.parse()
                .map_err(|_| CliError::Config(format!("Invalid float value for {}: {}", key, v)))
        };

        match key {
            "species" => config.species = Some(value_str.to_string()),
            "alleles" => config.alleles = Some(value_str.to_string()),
            "method" => config.method = Some(value_str.to_string()),
            "workers" => config.workers = Some(int(value_str)? as usize),
            "output-dir" => config.output_dir = Some(value_str.into()),
            "retry.max-retries" => {
                config.retry.get_or_insert_with(Default::default).max_retries =
                    Some(int(value_str)? as usize);
            }
            "retry.delay-secs" => {
                config.retry.get_or_insert_with(Default::default).delay_secs =
                    Some(float(value_str)?);
            }
            "retry.jitter-min-secs" => {
                config.retry.get_or_insert_with(Default::default).jitter_min_secs =
                    Some(float(value_str)?);
            }
            "retry.jitter-max-secs" => {
                config.retry.get_or_insert_with(Default::default).jitter_max_secs =
                    Some(float(value_str)?);
            }
            "stagger.min-secs" => {
                config.stagger.get_or_insert_with(Default::default).min_secs =
                    Some(float(value_str)?);
            }
            "stagger.max-secs" => {
                config.stagger.get_or_insert_with(Default::default).max_secs =
                    Some(float(value_str)?);
            }
            "service.endpoint" => {
                config.service.get_or_insert_with(Default::default).endpoint =
                    Some(value_str.to_string());
            }
            "service.timeout-secs" => {
                config.service.get_or_insert_with(Default::default).timeout_secs =
                    Some(int(value_str)?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
    }

    fn base_predict_args() -> PredictArgs {
        PredictArgs {
            input: PathBuf::from("/seqs/antigens.fasta"),
            config: None,
            output_dir: None,
            species: None,
            alleles: None,
            method: None,
            workers: None,
            max_retries: None,
            retry_delay: None,
            no_jitter: false,
            endpoint: None,
            timeout: None,
            set_values: vec![],
        }
    }

    #[test]
    fn defaults_reproduce_the_mouse_run() {
        let app = build_config(&base_predict_args(), today()).expect("build ok");
        let cfg = app.run_config;

        assert_eq!(cfg.worker_count, 4);
        assert_eq!(cfg.tag, "mouse");
        assert_eq!(cfg.allele_set, "H2-IAb,H2-IAd,H2-IEd,H2-IAk,H2-IEk");
        assert_eq!(cfg.method, "nn_align-2.3");
        assert_eq!(cfg.retry.max_retries, 15);
        assert_eq!(cfg.retry.delay, Duration::from_secs(10));
        assert_eq!(cfg.retry.jitter, core_config::DEFAULT_JITTER);
        assert_eq!(cfg.stagger, core_config::DEFAULT_STAGGER);
        assert_eq!(
            cfg.layout.root(),
            Path::new("results/RESULTS-antigens-MOUSE-31-01-2025")
        );
        assert_eq!(app.input_path, PathBuf::from("/seqs/antigens.fasta"));
        assert_eq!(app.service.timeout, Duration::from_secs(300));
    }

    #[test]
    fn cli_flags_override_file_and_set_values() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("cfg.toml");
        fs::write(
            &path,
            "species = \"human\"\nworkers = 2\n[retry]\nmax-retries = 7\ndelay-secs = 1.0\n",
        )
        .unwrap();

        let mut args = base_predict_args();
        args.config = Some(path);
        args.workers = Some(6);
        args.set_values = vec!["retry.max-retries=9".to_string()];

        let cfg = build_config(&args, today()).unwrap().run_config;
        assert_eq!(cfg.tag, "human");
        assert_eq!(cfg.allele_set.split(',').count(), 26);
        assert_eq!(cfg.worker_count, 6);
        assert_eq!(cfg.retry.max_retries, 9);
        assert_eq!(cfg.retry.delay, Duration::from_secs(1));
    }

    #[test]
    fn explicit_alleles_win_over_species_preset() {
        let mut args = base_predict_args();
        args.alleles = Some(" H2-IAb , H2-IEk ".to_string());

        let cfg = build_config(&args, today()).unwrap().run_config;
        assert_eq!(cfg.allele_set, "H2-IAb,H2-IEk");
        assert_eq!(cfg.tag, "custom");
        assert!(cfg.layout.root().ends_with("RESULTS-antigens-CUSTOM-31-01-2025"));
    }

    #[test]
    fn explicit_alleles_tag_the_run_custom_even_with_a_species() {
        let mut args = base_predict_args();
        args.species = Some("../x".to_string());
        args.alleles = Some("H2-IAb".to_string());

        let cfg = build_config(&args, today()).unwrap().run_config;
        assert_eq!(cfg.tag, "custom");
        assert_eq!(
            cfg.layout.root(),
            Path::new("results/RESULTS-antigens-CUSTOM-31-01-2025")
        );
    }

    #[test]
    fn unknown_species_is_a_config_error() {
        let mut args = base_predict_args();
        args.species = Some("zebrafish".to_string());

        match build_config(&args, today()) {
            Err(CliError::Config(msg)) => assert!(msg.contains("human, mouse")),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn no_jitter_zeroes_both_random_pauses() {
        let mut args = base_predict_args();
        args.no_jitter = true;

        let cfg = build_config(&args, today()).unwrap().run_config;
        assert!(cfg.retry.jitter.is_zero());
        assert!(cfg.stagger.is_zero());
    }

    #[test]
    fn inverted_jitter_range_is_rejected() {
        let mut args = base_predict_args();
        args.set_values = vec![
            "retry.jitter-min-secs=5".to_string(),
            "retry.jitter-max-secs=1".to_string(),
        ];
        assert!(matches!(
            build_config(&args, today()),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn negative_delay_is_rejected() {
        let mut args = base_predict_args();
        args.retry_delay = Some(-1.0);
        assert!(matches!(
            build_config(&args, today()),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn zero_workers_is_rejected_by_core_validation() {
        let mut args = base_predict_args();
        args.workers = Some(0);
        assert!(matches!(
            build_config(&args, today()),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn set_values_cover_service_settings() {
        let mut args = base_predict_args();
        args.set_values = vec![
            "service.endpoint=http://localhost:1234/".to_string(),
            "service.timeout-secs=30".to_string(),
            "output-dir=/tmp/out".to_string(),
        ];

        let app = build_config(&args, today()).unwrap();
        assert_eq!(app.service.endpoint, "http://localhost:1234/");
        assert_eq!(app.service.timeout, Duration::from_secs(30));
        assert!(app.run_config.layout.root().starts_with("/tmp/out"));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        let mut args = base_predict_args();
        args.set_values = vec!["workers".to_string()];
        assert!(matches!(build_config(&args, today()), Err(CliError::Config(_))));

        args.set_values = vec!["workers=many".to_string()];
        assert!(matches!(build_config(&args, today()), Err(CliError::Config(_))));

        args.set_values = vec!["colour=blue".to_string()];
        assert!(matches!(build_config(&args, today()), Err(CliError::Config(_))));
    }
}
