//! The producer job: drives a [`RecordBuilder`] over a source stream.
//!
//! ```text
//!  run_begin ──▶ builder.begin_run(menus), install prescale table
//!  event ──────▶ builder.build(event) ──▶ sink.write(row)
//!  bad line ───▶ logged, counted, skipped
//! ```

use crate::builder::{Assembled, RecordBuilder};
use chrono::{DateTime, Utc};
use evflat_config::ProducerConfig;
use evflat_core::{
    ObjectKind, PrescaleTable, RunBegin, SourceError, SourceRecord, Warning, WarningKind,
};
use evflat_sink::RowSink;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::BufRead;
use tracing::{debug, info, warn};

/// Totals for one producer job.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub runs: u64,
    pub events: u64,
    pub rows_written: u64,
    pub skipped_lines: u64,
    /// Events in which at least one collection was capped.
    pub truncated_events: u64,
    pub warnings: BTreeMap<WarningKind, u64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobSummary {
    fn new() -> Self {
        Self {
            runs: 0,
            events: 0,
            rows_written: 0,
            skipped_lines: 0,
            truncated_events: 0,
            warnings: BTreeMap::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    fn tally(&mut self, warnings: &[Warning]) {
        for w in warnings {
            *self.warnings.entry(w.kind()).or_default() += 1;
        }
    }

    pub fn warning_count(&self) -> u64 {
        self.warnings.values().sum()
    }
}

/// Owns one builder and one sink; nothing is shared between producers.
pub struct Producer<S: RowSink> {
    builder: RecordBuilder,
    sink: S,
    prescales: PrescaleTable,
    summary: JobSummary,
}

impl<S: RowSink> Producer<S> {
    pub fn new(config: &ProducerConfig, sink: S) -> evflat_core::Result<Self> {
        let builder = RecordBuilder::new(config)?;
        info!(
            sink = sink.name(),
            vertices = builder.capacity(ObjectKind::Vertex),
            tracks = builder.capacity(ObjectKind::Track),
            genjets = builder.capacity(ObjectKind::GenJet),
            is_data = config.producer.is_data,
            "Producer ready"
        );
        Ok(Self {
            builder,
            sink,
            prescales: PrescaleTable::new(),
            summary: JobSummary::new(),
        })
    }

    /// Start a run: refresh menus and install the run's prescales.
    pub fn begin_run(&mut self, run: RunBegin) -> Vec<Warning> {
        let warnings = self
            .builder
            .begin_run(run.run, &run.trigger_menu, &run.filter_menu);
        if run.prescales.is_empty() {
            debug!(run = run.run, "Run carries no prescale table, lookups will fail");
        } else {
            debug!(run = run.run, paths = run.prescales.len(), "Prescale table installed");
        }
        self.prescales = run.prescales;
        self.summary.runs += 1;
        self.summary.tally(&warnings);
        warnings
    }

    /// Build, persist, and return one event's row.
    pub fn process_event<E: evflat_core::EventView + ?Sized>(
        &mut self,
        event: &E,
    ) -> evflat_core::Result<Assembled> {
        let assembled = self.builder.build(event, &self.prescales);
        self.summary.events += 1;
        self.summary.tally(&assembled.warnings);

        let row = &assembled.row;
        if row.vertices.is_truncated() || row.tracks.is_truncated() || row.genjets.is_truncated() {
            self.summary.truncated_events += 1;
        }

        self.sink.write(row)?;
        self.summary.rows_written += 1;
        Ok(assembled)
    }

    /// Dispatch one source record.
    pub fn handle(&mut self, record: SourceRecord) -> evflat_core::Result<()> {
        match record {
            SourceRecord::RunBegin(run) => {
                self.begin_run(run);
            }
            SourceRecord::Event(event) => {
                self.process_event(&event)?;
            }
        }
        Ok(())
    }

    /// Consume a JSON-lines source.
    ///
    /// Blank lines are ignored; lines that fail to parse are logged,
    /// counted in `skipped_lines`, and skipped. Read and sink failures
    /// stop the job.
    pub fn run_lines<R: BufRead>(&mut self, reader: R) -> evflat_core::Result<()> {
        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line.map_err(|e| SourceError::Read(format!("line {line_no}: {e}")))?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<SourceRecord>(&line) {
                Ok(record) => self.handle(record)?,
                Err(e) => {
                    let err = SourceError::Malformed {
                        line: line_no,
                        reason: e.to_string(),
                    };
                    warn!(error = %err, "Skipping source line");
                    self.summary.skipped_lines += 1;
                }
            }
        }
        Ok(())
    }

    pub fn builder(&self) -> &RecordBuilder {
        &self.builder
    }

    pub fn summary(&self) -> &JobSummary {
        &self.summary
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Flush the sink and close out the summary.
    pub fn finish(mut self) -> evflat_core::Result<(JobSummary, S)> {
        self.sink.flush()?;
        self.summary.finished_at = Some(Utc::now());
        info!(
            sink = self.sink.name(),
            runs = self.summary.runs,
            events = self.summary.events,
            rows = self.summary.rows_written,
            skipped = self.summary.skipped_lines,
            warnings = self.summary.warning_count(),
            "Job finished"
        );
        Ok((self.summary, self.sink))
    }
}
