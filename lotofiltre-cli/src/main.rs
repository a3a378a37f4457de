mod display;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use lotofiltre_core::ac::calculate_ac_value;
use lotofiltre_core::combination::generate;
use lotofiltre_core::filter::{FilterConfig, ScoreMode, evaluate};
use lotofiltre_core::interval::analyze_interval_distribution;
use lotofiltre_core::models::{Combination, LotteryKind, NumberPool};
use lotofiltre_core::presets::{preset, presets};
use lotofiltre_core::quality::quality_breakdown;
use lotofiltre_core::reducer::{apply_batch_filter, reduce_with_progress};
use lotofiltre_core::sampler::{date_seed, sample_combinations};
use lotofiltre_core::settings::EngineSettings;

use crate::display::{
    display_analysis, display_outcome, display_presets, display_reduction, display_summary,
};

#[derive(Parser)]
#[command(name = "lotofiltre", about = "Réducteur de combinaisons de loterie")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct PoolArgs {
    /// Loterie : ssq (6/33 + 1/16) ou dlt (5/35 + 2/12)
    #[arg(short, long, default_value = "ssq")]
    lottery: LotteryKind,

    /// Numéros principaux candidats (séparés par des virgules)
    #[arg(short, long, value_delimiter = ',', required = true)]
    primary: Vec<u8>,

    /// Numéros spéciaux candidats (séparés par des virgules)
    #[arg(short, long, value_delimiter = ',', required = true)]
    secondary: Vec<u8>,
}

#[derive(Args)]
struct FilterArgs {
    /// Preset : conservative, balanced, aggressive
    #[arg(long)]
    preset: Option<String>,

    /// Fichier JSON de filtre personnalisé
    #[arg(short, long)]
    filter: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Réduire toutes les grilles d'un pool avec un filtre
    Reduce {
        #[command(flatten)]
        pool: PoolArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Fichier JSON de réglages (prix unitaire, plafond)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Nombre de grilles à afficher
        #[arg(long, default_value = "20")]
        show: usize,

        /// Seed de l'échantillon affiché (défaut: date du jour YYYYMMDD)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Classer les grilles d'un pool par score qualité
    Top {
        #[command(flatten)]
        pool: PoolArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Fichier JSON de réglages (prix unitaire, plafond)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Analyser un ensemble de numéros principaux (AC, intervalles, score)
    Analyze {
        /// Loterie : ssq ou dlt
        #[arg(short, long, default_value = "ssq")]
        lottery: LotteryKind,

        /// Numéros principaux
        #[arg(required = true)]
        numbers: Vec<u8>,
    },

    /// Vérifier une grille contre un filtre
    Check {
        #[command(flatten)]
        pool: PoolArgs,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Lister les presets disponibles
    Presets {
        /// Loterie (toutes par défaut)
        #[arg(short, long)]
        lottery: Option<LotteryKind>,
    },

    /// Écrire un fichier de réglages par défaut
    InitConfig {
        /// Chemin du fichier
        #[arg(short, long, default_value = "lotofiltre.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Reduce { pool, filter, config, show, seed } => cmd_reduce(&pool, &filter, config, show, seed),
        Command::Top { pool, filter, config } => cmd_top(&pool, &filter, config),
        Command::Analyze { lottery, numbers } => cmd_analyze(lottery, &numbers),
        Command::Check { pool, filter } => cmd_check(&pool, &filter),
        Command::Presets { lottery } => {
            let kinds = match lottery {
                Some(kind) => vec![kind],
                None => LotteryKind::ALL.to_vec(),
            };
            for kind in kinds {
                display_presets(kind, presets(kind));
            }
            Ok(())
        }
        Command::InitConfig { output } => {
            EngineSettings::default()
                .save(&output)
                .with_context(|| format!("Impossible d'écrire {:?}", output))?;
            println!("Réglages par défaut écrits dans : {}", output.display());
            Ok(())
        }
    }
}

fn resolve_filter(kind: LotteryKind, args: &FilterArgs) -> Result<(String, FilterConfig)> {
    match (&args.preset, &args.filter) {
        (Some(_), Some(_)) => bail!("Choisissez --preset ou --filter, pas les deux"),
        (None, Some(path)) => {
            let filter = FilterConfig::load(path)
                .with_context(|| format!("Impossible de charger le filtre {:?}", path))?;
            Ok((path.display().to_string(), filter))
        }
        (Some(key), None) => {
            let p = preset(kind, key)?;
            Ok((p.display_name.to_string(), p.filter))
        }
        (None, None) => {
            let p = preset(kind, "balanced")?;
            println!("(Pas de filtre indiqué, utilisation du preset « {} »)", p.display_name);
            Ok((p.display_name.to_string(), p.filter))
        }
    }
}

fn load_settings(path: Option<PathBuf>) -> Result<EngineSettings> {
    match path {
        Some(p) => EngineSettings::load(&p).with_context(|| format!("Impossible de charger les réglages {:?}", p)),
        None => Ok(EngineSettings::default()),
    }
}

fn cmd_reduce(pool_args: &PoolArgs, filter_args: &FilterArgs, config: Option<PathBuf>, show: usize, seed: Option<u64>) -> Result<()> {
    let kind = pool_args.lottery;
    let profile = kind.profile();
    let (filter_name, filter) = resolve_filter(kind, filter_args)?;
    let settings = load_settings(config)?;
    let pool = NumberPool::new(pool_args.primary.iter().copied(), pool_args.secondary.iter().copied());

    let total = profile.shape.combination_count(&pool);
    if total == 0 {
        println!(
            "Pool insuffisant : il faut au moins {} numéros principaux et {} spéciaux.",
            profile.shape.primary.count, profile.shape.secondary.count
        );
    }

    let pb = ProgressBar::new(total);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
        .progress_chars("=> "));

    let result = reduce_with_progress(&pool, &profile, &filter, &settings, |checked| pb.set_position(checked));
    pb.finish_and_clear();
    let result = result?;

    let shown = if result.combinations.len() > show {
        let effective_seed = seed.unwrap_or_else(|| {
            let ds = date_seed();
            println!("(Seed du jour : {ds})");
            ds
        });
        sample_combinations(&result.combinations, show, effective_seed)
    } else {
        result.combinations.clone()
    };

    display_reduction(kind, &filter_name, &result, &shown, settings.unit_price);
    Ok(())
}

fn cmd_top(pool_args: &PoolArgs, filter_args: &FilterArgs, config: Option<PathBuf>) -> Result<()> {
    let kind = pool_args.lottery;
    let profile = kind.profile();
    let (filter_name, filter) = resolve_filter(kind, filter_args)?;
    let settings = load_settings(config)?;
    let pool = NumberPool::new(pool_args.primary.iter().copied(), pool_args.secondary.iter().copied());
    profile.shape.validate_pool(&pool)?;

    let combinations = generate(&pool, &profile.shape, settings.max_combinations)?;
    if combinations.is_empty() {
        bail!(
            "Pool insuffisant : il faut au moins {} numéros principaux et {} spéciaux",
            profile.shape.primary.count,
            profile.shape.secondary.count
        );
    }

    let summary = apply_batch_filter(&combinations, &profile, &filter)?;
    display_summary(kind, &filter_name, &summary);
    Ok(())
}

fn cmd_analyze(kind: LotteryKind, numbers: &[u8]) -> Result<()> {
    let profile = kind.profile();
    let pool = NumberPool::new(numbers.iter().copied(), Vec::new());
    if pool.primary.len() != numbers.len() {
        bail!("Numéros en double dans {:?}", numbers);
    }
    profile.shape.validate_pool(&pool)?;

    let ac = calculate_ac_value(&pool.primary, &profile.ac);
    let intervals = analyze_interval_distribution(&pool.primary, &profile.bands);
    let quality = quality_breakdown(&pool.primary, &profile);

    display_analysis(&pool.primary, &ac, &intervals, &quality);
    Ok(())
}

fn cmd_check(pool_args: &PoolArgs, filter_args: &FilterArgs) -> Result<()> {
    let kind = pool_args.lottery;
    let profile = kind.profile();
    let (filter_name, filter) = resolve_filter(kind, filter_args)?;

    let ticket = Combination::new(pool_args.primary.clone(), pool_args.secondary.clone());
    profile.shape.validate_combination(&ticket)?;

    let outcome = evaluate(&ticket, &filter, &profile, ScoreMode::Always);
    display_outcome(&ticket, &filter_name, &outcome);
    Ok(())
}
