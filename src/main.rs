use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use wikitrust::classify::{self, ClassificationResult};
use wikitrust::probe::{probe_all, HttpLinkProbe};
use wikitrust::wiki::summary::PageSummary;
use wikitrust::{batch, AnalysisResult, Analyzer, Settings};

#[derive(Parser)]
#[command(name = "wikitrust", about = "Trust assessment for wiki articles")]
struct Cli {
    /// Wiki language subdomain (overrides WIKITRUST_LANG)
    #[arg(long, global = true)]
    lang: Option<String>,

    /// Per-request link probe timeout in seconds (overrides WIKITRUST_PROBE_TIMEOUT_SECS)
    #[arg(long, global = true)]
    probe_timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more articles by title
    Analyze {
        #[arg(required = true)]
        titles: Vec<String>,
        /// Print the result record(s) as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check external URLs for reachability (HEAD, then GET)
    Probe {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Run the classifier on category titles, no network
    Classify {
        /// Category title (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,
        /// Summary text to score for AI phrasing
        #[arg(short, long, default_value = "")]
        text: String,
        /// Summary type field (standard, disambiguation, ...)
        #[arg(long = "type")]
        content_type: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::from_env().context("Invalid WIKITRUST_* configuration")?;
    if let Some(lang) = cli.lang {
        settings.lang = lang;
    }
    if let Some(secs) = cli.probe_timeout {
        settings.probe_timeout_secs = secs;
    }

    let result = match cli.command {
        Commands::Analyze { titles, json } => {
            let titles: Vec<String> = titles.iter().map(|t| t.trim().to_string()).collect();
            if titles.iter().any(|t| t.is_empty()) {
                bail!("Article titles must not be empty");
            }
            let analyzer = Analyzer::from_settings(&settings)?;

            if titles.len() == 1 {
                let title = &titles[0];
                let report = analyzer
                    .analyze(title)
                    .await
                    .with_context(|| format!("Could not resolve '{}'", title))?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print_report(&report);
                }
                Ok(())
            } else {
                run_batch(analyzer, titles, settings.batch_concurrency, json).await
            }
        }
        Commands::Probe { urls } => {
            let probe = HttpLinkProbe::new(&settings)?;
            let results = probe_all(&probe, &urls).await;
            for r in &results {
                let verdict = if r.is_broken { "BROKEN" } else { "ok" };
                println!("{:<6} {}", verdict, r.url);
            }
            let broken = results.iter().filter(|r| r.is_broken).count();
            println!("\n{} of {} link(s) broken", broken, results.len());
            Ok(())
        }
        Commands::Classify {
            categories,
            text,
            content_type,
            json,
        } => {
            let summary = PageSummary {
                title: String::new(),
                extract: text,
                content_type,
                canonical_url: None,
            };
            let c = classify::classify(&summary, &categories);
            if json {
                println!("{}", serde_json::to_string_pretty(&c)?);
            } else {
                print_classification(&c);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_elapsed(elapsed));
    }

    result
}

async fn run_batch(
    analyzer: Analyzer,
    titles: Vec<String>,
    concurrency: usize,
    json: bool,
) -> anyhow::Result<()> {
    if !json {
        println!("Analyzing {} titles...", titles.len());
    }
    let (items, stats) = batch::analyze_titles(Arc::new(analyzer), titles, concurrency).await?;

    if json {
        let records: Vec<serde_json::Value> = items
            .iter()
            .map(|item| match &item.outcome {
                Ok(report) => serde_json::to_value(report),
                Err(e) => Ok(serde_json::json!({ "title": item.title, "error": e })),
            })
            .collect::<Result<_, _>>()?;
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_overview(&items);
        println!(
            "\n{} analyzed ({} ok, {} errors)",
            stats.total, stats.ok, stats.errors
        );
    }
    Ok(())
}

fn print_report(r: &AnalysisResult) {
    println!("{}", r.title);
    println!("{}", "=".repeat(r.title.chars().count().max(8)));
    if let Some(url) = &r.url {
        println!("URL:        {}", url);
    }
    println!("Type:       {}", r.content_type);
    println!("AI risk:    {:.2}", r.ai_content_risk);
    println!("Subject:    {}", subject_status(r.is_living, r.is_dead, r.death_year));
    println!("Born:       {}", year_or_dash(r.birth_year));
    println!("Stub:       {}", if r.is_stub { "yes" } else { "no" });
    println!(
        "Links:      {} internal, {} external, {} broken",
        r.total_links_internal, r.total_links_external, r.broken_links_count
    );
    if !r.categories.is_empty() {
        println!("Categories: {}", r.categories.join(", "));
    }
    for url in &r.broken_external_links {
        println!("  broken:   {}", url);
    }
    if !r.partial_failures.is_empty() {
        println!("Degraded:   {} (query failed)", r.partial_failures.join(", "));
    }
    println!("\n{}", r.ai_explanation);
}

fn print_overview(items: &[batch::BatchItem]) {
    println!(
        "{:>3} | {:<28} | {:<14} | {:>4} | {:>5} | {:>5} | {:>6} | {:<12}",
        "#", "Title", "Type", "Risk", "Int", "Ext", "Broken", "Subject"
    );
    println!("{}", "-".repeat(100));

    for item in items {
        let title = fit_column(&item.title, 28);
        match &item.outcome {
            Ok(r) => println!(
                "{:>3} | {:<28} | {:<14} | {:>4.2} | {:>5} | {:>5} | {:>6} | {:<12}",
                item.index + 1,
                title,
                fit_column(r.content_type.as_str(), 14),
                r.ai_content_risk,
                r.total_links_internal,
                r.total_links_external,
                r.broken_links_count,
                subject_status(r.is_living, r.is_dead, r.death_year),
            ),
            Err(e) => println!("{:>3} | {:<28} | error: {}", item.index + 1, title, fit_column(e, 60)),
        }
    }
}

fn print_classification(c: &ClassificationResult) {
    println!("Type:     {}", c.content_type);
    println!("AI risk:  {:.2}", c.ai_risk);
    println!("Subject:  {}", subject_status(c.is_living, c.is_dead, c.death_year));
    println!("Born:     {}", year_or_dash(c.birth_year));
    println!("Stub:     {}", if c.is_stub { "yes" } else { "no" });
}

fn subject_status(living: bool, dead: bool, death_year: Option<i32>) -> String {
    match (living, dead, death_year) {
        (_, true, Some(y)) => format!("died {}", y),
        (_, true, None) => "deceased".into(),
        (true, false, _) => "living".into(),
        _ => "-".into(),
    }
}

fn year_or_dash(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "-".into())
}

/// Fit `s` into a table column of `width` characters, marking cuts with `…`.
fn fit_column(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}
