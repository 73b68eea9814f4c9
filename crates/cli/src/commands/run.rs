//! `evflat run`: flatten a JSON-lines event stream into rows.

use super::load_config;
use evflat_builder::{JobSummary, Producer};
use evflat_config::ProducerConfig;
use evflat_sink::{JsonlSink, RowSink};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

pub fn run(
    config_path: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path.as_deref())?;
    let output = output.unwrap_or_else(|| config.output.path.clone());
    let flush_every = config.output.flush_every;

    if output == "-" {
        let sink = JsonlSink::from_writer("stdout", std::io::stdout().lock(), flush_every);
        let summary = drive(&config, sink, input.as_deref())?;
        // stdout carries the rows
        report(&summary, "stdout", &mut std::io::stderr())?;
    } else {
        let sink = JsonlSink::create(Path::new(&output), flush_every)?;
        let summary = drive(&config, sink, input.as_deref())?;
        report(&summary, &output, &mut std::io::stdout())?;
    }

    Ok(())
}

fn drive<S: RowSink>(
    config: &ProducerConfig,
    sink: S,
    input: Option<&Path>,
) -> Result<JobSummary, Box<dyn std::error::Error>> {
    let mut producer = Producer::new(config, sink)?;

    match input.filter(|p| *p != Path::new("-")) {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| format!("Failed to open input {}: {e}", path.display()))?;
            tracing::info!(input = %path.display(), "Reading events");
            producer.run_lines(BufReader::new(file))?;
        }
        None => {
            tracing::info!("Reading events from stdin");
            producer.run_lines(std::io::stdin().lock())?;
        }
    }

    let (summary, _sink) = producer.finish()?;
    Ok(summary)
}

fn report(summary: &JobSummary, output: &str, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "Wrote {} row(s) to {output}", summary.rows_written)?;
    writeln!(out, "  Runs:              {}", summary.runs)?;
    writeln!(out, "  Events:            {}", summary.events)?;
    writeln!(out, "  Truncated events:  {}", summary.truncated_events)?;
    writeln!(out, "  Skipped lines:     {}", summary.skipped_lines)?;
    if let Some(finished) = summary.finished_at {
        let elapsed = finished - summary.started_at;
        writeln!(out, "  Elapsed:           {} ms", elapsed.num_milliseconds())?;
    }

    if summary.warnings.is_empty() {
        writeln!(out, "  Warnings:          none")?;
    } else {
        writeln!(out, "  Warnings:          {}", summary.warning_count())?;
        for (kind, count) in &summary.warnings {
            writeln!(out, "    {:<24} {count}", kind.as_str())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use evflat_sink::MemorySink;

    const STREAM: &str = concat!(
        r#"{"type":"run_begin","run":1,"trigger_menu":{"process":"HLT","table":"v1","paths":["HLT_IsoMu24_v4"]},"filter_menu":{"process":"RECO","table":"flags","paths":["Flag_goodVertices"]}}"#,
        "\n",
        r#"{"type":"event","run":1,"lumi":1,"event":1,"decisions":{"TriggerResults::HLT":[true],"TriggerResults::RECO":[true]}}"#,
        "\n",
    );

    #[test]
    fn drive_reads_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(STREAM.as_bytes())
            .unwrap();

        let summary = drive(&ProducerConfig::default(), MemorySink::new(), Some(path.as_path())).unwrap();
        assert_eq!(summary.runs, 1);
        assert_eq!(summary.rows_written, 1);
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = drive(
            &ProducerConfig::default(),
            MemorySink::new(),
            Some(dir.path().join("nope.jsonl").as_path()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to open input"));
    }

    #[test]
    fn report_lists_warning_kinds() {
        let mut producer = Producer::new(&ProducerConfig::default(), MemorySink::new()).unwrap();
        producer.run_lines(STREAM.as_bytes()).unwrap();
        let (summary, _) = producer.finish().unwrap();

        let mut out = Vec::new();
        report(&summary, "rows.jsonl", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Wrote 1 row(s) to rows.jsonl"));
        assert!(text.contains("missing_collection"));
    }
}
