use anyhow::Result;
use coderag_indexer::{RebuildReason, RunOutcome, RunReport, StatusReport};

pub fn print_run(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    match report.outcome {
        RunOutcome::UpToDate => println!("Up to date ({} ms)", report.duration_ms),
        RunOutcome::Rebuilt => {
            println!(
                "Rebuilt {} chunks from {} files in {} ms",
                report.chunks, report.files, report.duration_ms
            );
            println!("  reasons:    {}", join_reasons(&report.reasons));
            if let Some(kind) = report.embedding {
                println!("  embeddings: {kind}");
            }
            if report.metadata_failures > 0 {
                println!("  metadata:   {} paths not recorded", report.metadata_failures);
            }
        }
    }
    Ok(())
}

pub fn print_status(report: &StatusReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if report.decision.required {
        println!("Rebuild needed: {}", join_reasons(&report.decision.reasons));
    } else {
        println!("Up to date");
    }
    println!(
        "  changes:   {} files ({} chunks) changed, {} removed",
        report.changes.changed_files, report.changes.changed_chunks, report.changes.removed_files
    );
    println!(
        "  artifacts: lexical {}, vector {}, graph {}",
        present(report.artifacts.lexical),
        present(report.artifacts.vector),
        present(report.artifacts.graph)
    );
    println!("  tracked:   {} files", report.tracked_files);
    Ok(())
}

fn join_reasons(reasons: &[RebuildReason]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

const fn present(flag: bool) -> &'static str {
    if flag {
        "present"
    } else {
        "missing"
    }
}
