//! Plain-text screens over a loaded catalog.

use tactics_core::compare::{instruction_diff, stat_deltas, Presence, Verdict};
use tactics_core::models::{Phase, Tactic};
use tactics_core::pitch::formation_positions;
use tactics_core::recommend::{count_matches, recommend, Preferences};
use tactics_core::router::{RouteParams, Router, APP_ROUTES};
use tactics_core::search::{filter_counts, filter_glossary, sort_tactics, top_stat, SortKey};
use tactics_core::stats::{bar_percent, format_value, Metric, STAT_CATALOG};
use tactics_core::{CatalogStore, RouteHandlerError};

pub const ERROR_SCREEN: &str = "Something went wrong loading this page.";

const BAR_WIDTH: usize = 20;

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("N/A")
}

fn bar(metric: Metric, value: f64) -> String {
    let filled = ((bar_percent(metric, value) / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// One row per tactic: slug, name, formation, styles and headline PPG.
pub fn tactic_rows(tactics: &[&Tactic], current_patch: &str) -> String {
    if tactics.is_empty() {
        return "No tactics match.\n".to_string();
    }
    let mut lines: Vec<String> = tactics
        .iter()
        .map(|t| {
            format!(
                "{:<22} {:<28} {:<10} {:<24} ppg {}",
                t.slug,
                t.name,
                t.formation_family,
                t.style_tags.join(","),
                format_value(Metric::Ppg, top_stat(t, current_patch, Metric::Ppg))
            )
        })
        .collect();
    lines.push(String::new());
    lines.join("\n")
}

pub fn tactic_detail(store: &CatalogStore, tactic: &Tactic) -> String {
    let mut lines = vec![
        format!("{} by {}", tactic.name, tactic.author),
        tactic.summary().to_string(),
        String::new(),
        format!("Formation:   {}", tactic.formation_family),
        format!("Style:       {} ({})", tactic.primary_style, tactic.style_tags.join(", ")),
        format!("Intensity:   {}", or_na(tactic.intensity.as_deref())),
        format!("Mentality:   {}", or_na(tactic.mentality.as_deref())),
        format!("Budget tier: {}", or_na(tactic.budget_tier.as_deref())),
        format!("Updated:     {}", tactic.updated_date),
    ];

    if !tactic.versions.is_empty() {
        lines.push(String::new());
        lines.push("Versions:".to_string());
        for version in &tactic.versions {
            lines.push(format!("  {:<8} {}", version.patch_version, version.status_label()));
        }
    }

    let Some(version) = store.tactic_current_version(tactic) else {
        lines.push(String::new());
        lines.push("No versions published yet.".to_string());
        lines.push(String::new());
        return lines.join("\n");
    };

    lines.push(String::new());
    lines.push(format!("Patch {} ({})", version.patch_version, version.status_label()));

    for phase in Phase::ALL {
        let instructions = version.team_instructions.phase(phase);
        if !instructions.is_empty() {
            lines.push(format!("  {}: {}", phase.label(), instructions.join(", ")));
        }
    }

    let positions =
        formation_positions(version.formation.in_possession.as_ref(), &store.meta().formations);
    if !positions.is_empty() {
        lines.push(String::new());
        lines.push("In possession:".to_string());
        for pos in positions {
            lines.push(format!(
                "  {:<4} ({:>3.0},{:>3.0}) {} - {} {}",
                pos.label,
                pos.x,
                pos.y,
                pos.role,
                pos.duty,
                store.duty_color(&pos.duty)
            ));
        }
    }

    if let Some(evidence) = store.best_evidence(version) {
        lines.push(String::new());
        let games = evidence.match_count.map(|n| format!(", {} matches", n)).unwrap_or_default();
        lines.push(format!("Evidence ({}{}):", evidence.kind.label(), games));
        for spec in STAT_CATALOG.iter() {
            if let Some(value) = evidence.stats.get(spec.metric) {
                lines.push(format!(
                    "  {:<16} {:>7} {}",
                    spec.label,
                    format_value(spec.metric, value),
                    bar(spec.metric, value)
                ));
            }
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

pub fn glossary(store: &CatalogStore, query: &str, category: &str) -> String {
    let terms = filter_glossary(store.glossary(), query, category);
    if terms.is_empty() {
        return "No glossary terms match.\n".to_string();
    }
    let mut lines = Vec::new();
    for term in terms {
        lines.push(format!("{} [{}]", term.term, term.category));
        lines.push(format!("  {}", term.definition));
        if let Some(context) = term.fm_context.as_deref().filter(|c| !c.is_empty()) {
            lines.push(format!("  In FM: {}", context));
        }
    }
    lines.push(String::new());
    lines.join("\n")
}

pub fn patches(store: &CatalogStore) -> String {
    let mut lines = Vec::new();
    for patch in store.patches() {
        let marker = if patch.is_current { " (current)" } else { "" };
        let title = patch.title.as_deref().unwrap_or("");
        lines.push(format!("{}{} {} {}", patch.version, marker, patch.release_date, title));
        if !patch.summary.is_empty() {
            lines.push(format!("  {}", patch.summary));
        }
        for change in &patch.tactical_changes {
            lines.push(format!("  [{}] {}: {}", change.impact, change.area, change.description));
        }
        let affected: Vec<&str> = store
            .tactics_affected_by_patch_notes(&patch.version)
            .iter()
            .map(|t| t.slug.as_str())
            .collect();
        if !affected.is_empty() {
            lines.push(format!("  Affects: {}", affected.join(", ")));
        }
    }
    lines.push(String::new());
    lines.join("\n")
}

pub fn comparison(store: &CatalogStore, a: &Tactic, b: &Tactic) -> String {
    let version_a = store.tactic_current_version(a);
    let version_b = store.tactic_current_version(b);
    let mut lines = vec![format!("{}  vs  {}", a.name, b.name), String::new()];

    let stats_a = version_a.and_then(|v| store.best_evidence(v)).map(|e| &e.stats);
    let stats_b = version_b.and_then(|v| store.best_evidence(v)).map(|e| &e.stats);
    let rows = stat_deltas(stats_a, stats_b);
    if rows.is_empty() {
        lines.push("No stats to compare.".to_string());
    }
    for row in rows {
        let verdict = match row.verdict {
            Some(Verdict::Better) => "A",
            Some(Verdict::Worse) => "B",
            Some(Verdict::Even) => "=",
            None => " ",
        };
        lines.push(format!(
            "{:>8} {:<16} {:<8} {:>8}  {}",
            row.a_text(),
            row.label(),
            row.delta_text(),
            row.b_text(),
            verdict
        ));
    }

    lines.push(String::new());
    for diff in instruction_diff(
        version_a.map(|v| &v.team_instructions),
        version_b.map(|v| &v.team_instructions),
    ) {
        lines.push(format!("{}:", diff.phase.label()));
        if diff.entries.is_empty() {
            lines.push("  None".to_string());
        }
        for entry in diff.entries {
            let prefix = match entry.presence {
                Presence::Both => "  ",
                Presence::OnlyA => "A:",
                Presence::OnlyB => "B:",
            };
            lines.push(format!("  {} {}", prefix, entry.instruction));
        }
    }
    lines.push(String::new());
    lines.join("\n")
}

pub fn recommendations(store: &CatalogStore, prefs: &Preferences) -> String {
    let picks = recommend(store.tactics(), prefs, store.current_patch());
    let summary = prefs.summary();
    let heading = if summary.is_empty() {
        format!("{} tactics", count_matches(store.tactics(), prefs))
    } else {
        format!("{} tactics ({})", count_matches(store.tactics(), prefs), summary)
    };
    format!("{}\n{}", heading, tactic_rows(&picks, store.current_patch()))
}

pub fn counts(store: &CatalogStore) -> String {
    let counts = filter_counts(store.tactics());
    let facets = [
        ("Formations", &counts.formations),
        ("Style tags", &counts.style_tags),
        ("Intensity", &counts.intensities),
        ("Patches", &counts.patches),
        ("Budget tiers", &counts.budget_tiers),
        ("Mentalities", &counts.mentalities),
    ];
    let mut lines = Vec::new();
    for (label, values) in facets {
        let rendered: Vec<String> = values.iter().map(|(k, n)| format!("{} ({})", k, n)).collect();
        lines.push(format!("{:<13} {}", label, rendered.join(", ")));
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Render target for routed screens.
pub struct Screen<'a> {
    pub store: &'a CatalogStore,
    pub out: String,
}

impl<'a> Screen<'a> {
    pub fn new(store: &'a CatalogStore) -> Self {
        Self { store, out: String::new() }
    }
}

fn library_screen(
    _params: &RouteParams,
    screen: &mut Screen<'_>,
) -> Result<(), RouteHandlerError> {
    let all: Vec<&Tactic> = screen.store.tactics().iter().collect();
    let sorted = sort_tactics(&all, &SortKey::Newest, screen.store.current_patch());
    screen.out = tactic_rows(&sorted, screen.store.current_patch());
    Ok(())
}

fn tactic_screen(
    params: &RouteParams,
    screen: &mut Screen<'_>,
) -> Result<(), RouteHandlerError> {
    let slug = params.get("slug").map(String::as_str).unwrap_or_default();
    let tactic = screen
        .store
        .tactic(slug)
        .ok_or_else(|| RouteHandlerError::NotFound(slug.to_string()))?;
    screen.out = tactic_detail(screen.store, tactic);
    Ok(())
}

fn compare_screen(
    _params: &RouteParams,
    screen: &mut Screen<'_>,
) -> Result<(), RouteHandlerError> {
    let all: Vec<&Tactic> = screen.store.tactics().iter().collect();
    screen.out = format!(
        "Pick two tactics to compare: fm26-tactics compare <a> <b>\n{}",
        tactic_rows(&all, screen.store.current_patch())
    );
    Ok(())
}

fn glossary_screen(
    _params: &RouteParams,
    screen: &mut Screen<'_>,
) -> Result<(), RouteHandlerError> {
    screen.out = glossary(screen.store, "", "");
    Ok(())
}

fn patches_screen(
    _params: &RouteParams,
    screen: &mut Screen<'_>,
) -> Result<(), RouteHandlerError> {
    screen.out = patches(screen.store);
    Ok(())
}

fn recommend_screen(
    _params: &RouteParams,
    screen: &mut Screen<'_>,
) -> Result<(), RouteHandlerError> {
    screen.out = recommendations(screen.store, &Preferences::default());
    Ok(())
}

/// Router over every application screen.
pub fn app_router<'a>() -> Result<Router<Screen<'a>>, RouteHandlerError> {
    let mut router = Router::new(|_e, screen: &mut Screen<'a>| {
        screen.out = format!("{}\n", ERROR_SCREEN);
    });
    type Handler = for<'s> fn(&RouteParams, &mut Screen<'s>) -> Result<(), RouteHandlerError>;
    let handlers: [Handler; 6] = [
        library_screen as Handler,
        tactic_screen as Handler,
        compare_screen as Handler,
        glossary_screen as Handler,
        patches_screen as Handler,
        recommend_screen as Handler,
    ];
    for (pattern, handler) in APP_ROUTES.iter().zip(handlers) {
        router
            .register(pattern, handler)
            .map_err(|e| RouteHandlerError::Render(e.to_string()))?;
    }
    Ok(router)
}
