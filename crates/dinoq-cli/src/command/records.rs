use std::path::PathBuf;

use dinoq_training::checkpoint::{CheckpointStore as _, JsonFileStore, RecordSummary};

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RecordsArg {
    /// Directory holding the training log
    #[arg(long, default_value = util::DEFAULT_CHECKPOINT_DIR)]
    checkpoint_dir: PathBuf,
    /// Number of most recent episodes to compute statistics over
    #[arg(long, default_value_t = 100)]
    last: usize,
}

pub(crate) fn run(arg: &RecordsArg) -> anyhow::Result<()> {
    let RecordsArg {
        checkpoint_dir,
        last,
    } = arg;

    let store = JsonFileStore::new(checkpoint_dir);
    let records = store.load_records();
    let summary = RecordSummary::new(&records, *last);

    eprintln!("Training log: {}", checkpoint_dir.display());
    eprintln!("  Episodes:         {}", summary.episodes);
    if let Some(generation) = summary.last_generation {
        eprintln!("  Last generation:  {generation}");
    }
    eprintln!("  Generation next:  {}", store.load_generation());
    eprintln!("  High score:       {}", store.load_high_score());
    if let Some(best) = &summary.best {
        eprintln!(
            "  Best episode:     generation {} scored {} at {}",
            best.generation, best.score, best.timestamp
        );
    }
    if let Some(recent) = summary.recent {
        eprintln!("  Last {} episodes:", summary.window);
        eprintln!("    Min:  {}", recent.min);
        eprintln!("    Max:  {}", recent.max);
        eprintln!("    Mean: {:.1}", recent.mean);
    }

    Ok(())
}
