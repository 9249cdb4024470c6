use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use crate::analyze::{AnalysisResult, Analyzer};
use crate::probe::LinkChecker;
use crate::wiki::WikiApi;

/// Outcome for one title of a batch, tagged with its position in the input.
pub struct BatchItem {
    pub index: usize,
    pub title: String,
    pub outcome: Result<AnalysisResult, String>,
}

/// Batch stats returned after completion.
pub struct BatchStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

/// Analyze `titles` with at most `concurrency` analyses in flight.
///
/// Results stream back over a channel as they finish and are returned in
/// input order. A title that fails does not stop the rest.
pub async fn analyze_titles<A, P>(
    analyzer: Arc<Analyzer<A, P>>,
    titles: Vec<String>,
    concurrency: usize,
) -> anyhow::Result<(Vec<BatchItem>, BatchStats)>
where
    A: WikiApi + 'static,
    P: LinkChecker + 'static,
{
    let total = titles.len();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let pb = if total > 1 {
        ProgressBar::new(total as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let (tx, mut rx) = mpsc::channel::<BatchItem>(concurrency.max(1) * 2);

    let titles_by_index = titles.clone();
    for (index, title) in titles.into_iter().enumerate() {
        let analyzer = Arc::clone(&analyzer);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let outcome = analyzer.analyze(&title).await.map_err(|e| {
                warn!("Analysis failed for {}: {}", title, e);
                e.to_string()
            });
            let _ = tx.send(BatchItem { index, title, outcome }).await;
        });
    }

    // rx closes once every task has dropped its sender
    drop(tx);

    let mut items = Vec::with_capacity(total);
    let mut ok = 0usize;
    let mut errors = 0usize;

    while let Some(item) = rx.recv().await {
        if item.outcome.is_ok() {
            ok += 1;
        } else {
            errors += 1;
        }
        pb.set_message(item.title.clone());
        pb.inc(1);
        items.push(item);
    }

    pb.finish_and_clear();

    // A task that panicked never sent its item; report it instead of losing it.
    if items.len() < total {
        let mut seen = vec![false; total];
        for item in &items {
            seen[item.index] = true;
        }
        for (index, title) in titles_by_index.into_iter().enumerate() {
            if !seen[index] {
                warn!("Analysis task for {} ended without a result", title);
                errors += 1;
                items.push(BatchItem {
                    index,
                    title,
                    outcome: Err("analysis task aborted".to_string()),
                });
            }
        }
    }
    items.sort_by_key(|item| item.index);
    info!("Analyzed {} titles ({} ok, {} errors)", total, ok, errors);

    Ok((items, BatchStats { total, ok, errors }))
}
