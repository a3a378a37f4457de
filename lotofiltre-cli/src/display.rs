use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};

use lotofiltre_core::ac::{AcAnalysis, AcLevel};
use lotofiltre_core::filter::{FilterFamily, FilterOutcome};
use lotofiltre_core::interval::{IntervalAnalysis, BAND_NAMES};
use lotofiltre_core::models::{Combination, LotteryKind, format_numbers};
use lotofiltre_core::presets::Preset;
use lotofiltre_core::quality::{
    QualityScore, AC_WEIGHT, INTERVAL_WEIGHT, ODD_EVEN_WEIGHT, SPAN_WEIGHT, SUM_WEIGHT, TAIL_WEIGHT,
};
use lotofiltre_core::reducer::{FilterStats, FilterSummary, ReductionResult};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn display_rejections(stats: &FilterStats) {
    let rejections = stats.rejections();
    if rejections.is_empty() {
        return;
    }
    println!("\n── Rejets par filtre ──");
    let mut table = new_table(vec!["Filtre", "Grilles rejetées"]);
    for (family, count) in rejections {
        table.add_row(vec![family.to_string(), count.to_string()]);
    }
    println!("{table}");
}

pub fn display_reduction(
    kind: LotteryKind,
    filter_name: &str,
    result: &ReductionResult,
    shown: &[Combination],
    unit_price: u64,
) {
    println!("\n🎯 Réduction {kind} — filtre « {filter_name} »\n");
    println!("  Grilles initiales : {}", result.original_count);
    println!("  Grilles retenues  : {}", result.reduced_count);
    println!("  Réduction         : {}%", result.reduction_rate);
    println!("  Taux de passage   : {:.2}%", result.stats.pass_rate);
    println!(
        "  Coût              : {} → {} (économie {}, {} par grille)",
        result.cost_savings.original_cost,
        result.cost_savings.reduced_cost,
        result.cost_savings.savings,
        unit_price
    );

    display_rejections(&result.stats);

    match listing(result.combinations.len(), shown.len()) {
        Listing::NonePassed => {
            println!("\nAucune grille ne passe le filtre.");
            return;
        }
        Listing::Hidden => return,
        Listing::Sample => println!(
            "\n🎲 Échantillon de {} grilles sur {}\n",
            shown.len(),
            result.combinations.len()
        ),
        Listing::All => println!("\n🎲 Grilles retenues\n"),
    }

    let mut table = new_table(vec!["#", "Principaux", "Spéciaux"]);
    for (i, c) in shown.iter().enumerate() {
        table.add_row(vec![
            format!("{}", i + 1),
            format_numbers(&c.primary),
            format_numbers(&c.secondary),
        ]);
    }
    println!("{table}");
}

#[derive(Debug, PartialEq, Eq)]
enum Listing {
    NonePassed,
    /// Grilles retenues mais aucune demandée à l'affichage (`--show 0`).
    Hidden,
    Sample,
    All,
}

fn listing(retained: usize, shown: usize) -> Listing {
    if retained == 0 {
        Listing::NonePassed
    } else if shown == 0 {
        Listing::Hidden
    } else if shown < retained {
        Listing::Sample
    } else {
        Listing::All
    }
}

pub fn display_summary(kind: LotteryKind, filter_name: &str, summary: &FilterSummary) {
    println!("\n📊 Classement {kind} — filtre « {filter_name} »\n");
    println!("  Grilles vérifiées : {}", summary.stats.total_checked);
    println!("  Grilles retenues  : {}", summary.stats.passed_count);
    println!("  Taux de passage   : {:.2}%", summary.stats.pass_rate);
    println!("  Score moyen       : {:.1}", summary.average_score);

    display_rejections(&summary.stats);

    if summary.top_combinations.is_empty() {
        println!("\nAucune grille ne passe le filtre.");
        return;
    }

    println!("\n── Meilleures grilles ──");
    let mut table = new_table(vec!["#", "Principaux", "Spéciaux", "Score"]);
    for (i, scored) in summary.top_combinations.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format_numbers(&scored.combination.primary)),
            Cell::new(format_numbers(&scored.combination.secondary)),
            Cell::new(scored.score).fg(score_color(scored.score)),
        ]);
    }
    println!("{table}");
}

fn score_color(score: u8) -> Color {
    if score >= 80 {
        Color::Green
    } else if score >= 50 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn display_analysis(numbers: &[u8], ac: &AcAnalysis, intervals: &IntervalAnalysis, quality: &QualityScore) {
    println!("\n🔍 Analyse de {}\n", format_numbers(numbers));

    let ac_color = match ac.level {
        AcLevel::Optimal => Color::Green,
        AcLevel::Low | AcLevel::High => Color::Red,
    };
    let mut table = new_table(vec!["Mesure", "Valeur", "Détail"]);
    table.add_row(vec![
        Cell::new("Valeur AC"),
        Cell::new(ac.value).fg(ac_color),
        Cell::new(format!("{} ({} différences distinctes sur {})", ac.level, ac.unique_differences, ac.differences.len())),
    ]);
    table.add_row(vec![
        Cell::new("Intervalles"),
        Cell::new(&intervals.ratio),
        Cell::new(format!(
            "{} {} / {} {} / {} {}, équilibre {}",
            intervals.counts[0], BAND_NAMES[0],
            intervals.counts[1], BAND_NAMES[1],
            intervals.counts[2], BAND_NAMES[2],
            intervals.balance_score
        )),
    ]);
    println!("{table}");

    println!("\n  {}", ac.recommendation);
    println!("  {}", intervals.recommendation);

    println!("\n── Score qualité ──");
    let mut table = new_table(vec!["Critère", "Points", "Maximum"]);
    let rows = [
        ("Valeur AC", quality.ac, AC_WEIGHT),
        ("Pairs/impairs", quality.odd_even, ODD_EVEN_WEIGHT),
        ("Intervalles", quality.interval, INTERVAL_WEIGHT),
        ("Somme", quality.sum, SUM_WEIGHT),
        ("Écart", quality.span, SPAN_WEIGHT),
        ("Finales", quality.tails, TAIL_WEIGHT),
    ];
    for (name, points, max) in rows {
        table.add_row(vec![name.to_string(), format!("{:.1}", points), format!("{:.0}", max)]);
    }
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(quality.total()).fg(score_color(quality.total())),
        Cell::new("100"),
    ]);
    println!("{table}");
}

pub fn display_outcome(ticket: &Combination, filter_name: &str, outcome: &FilterOutcome) {
    println!("\nGrille {ticket} — filtre « {filter_name} »\n");
    match outcome.failure_reason() {
        None => println!("  ✅ Retenue"),
        Some(reason) => println!("  ❌ Rejetée : {reason}"),
    }
    if let Some(score) = outcome.quality_score {
        println!("  Score qualité : {score}/100");
    }
}

pub fn display_presets(kind: LotteryKind, presets: &[Preset]) {
    println!("\n── Presets {kind} ──");
    let mut header = vec!["Clé", "Nom"];
    let names: Vec<String> = FilterFamily::ORDER.iter().map(|f| f.to_string()).collect();
    header.extend(names.iter().map(String::as_str));
    let mut table = new_table(header);

    for p in presets {
        let f = &p.filter;
        let interval = &f.interval_distribution;
        let mut rules = Vec::new();
        if interval.require_balanced {
            rules.push("équilibré".to_string());
        }
        if interval.avoid_extreme {
            rules.push("non extrême".to_string());
        }
        if interval.min_balance_score > 0 {
            rules.push(format!("score ≥ {}", interval.min_balance_score));
        }

        table.add_row(vec![
            p.key.to_string(),
            p.display_name.to_string(),
            range_cell(f.ac_value.enabled, f.ac_value.min, f.ac_value.max),
            range_cell(f.sum_value.enabled, f.sum_value.min, f.sum_value.max),
            range_cell(f.odd_even_ratio.enabled, f.odd_even_ratio.min_odd, f.odd_even_ratio.max_odd),
            if interval.enabled { rules.join(", ") } else { "—".to_string() },
            range_cell(f.span.enabled, f.span.min, f.span.max),
            if f.consecutive.enabled { format!("≤ {}", f.consecutive.max_count) } else { "—".to_string() },
            range_cell(f.tail_numbers.enabled, f.tail_numbers.min_unique, f.tail_numbers.max_unique),
        ]);
    }
    println!("{table}");

    for p in presets {
        println!("  {} : {}", p.display_name, p.description);
    }
}

fn range_cell(enabled: bool, min: u32, max: u32) -> String {
    if enabled {
        format!("{min}-{max}")
    } else {
        "—".to_string()
    }
}
