//! Groups consecutive samples into the lines of the emitted table.
//!
//! A line is closed when the encoded value changes (a plateau ends) or when it already holds
//! [`MAX_TOKENS_PER_LINE`] tokens.

use core::mem;

use heapless::Vec;

use crate::{Error, Sample, Samples, WaveParams, MAX_TOKENS_PER_LINE};

/// What the `// N` comment after each line shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunLabel {
    /// Matches the tables already shipped in firmware: the first line is labelled 1, every
    /// later line with one past the index of its first sample.
    #[default]
    Legacy,
    /// The index of the first sample on the line.
    FirstSample,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub label: u32,
    pub start: u32,
    pub values: Vec<u16, MAX_TOKENS_PER_LINE>,
}

impl Run {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the last sample on the line.
    pub fn end(&self) -> u32 {
        self.start + self.values.len() as u32 - 1
    }
}

#[derive(Debug, Clone)]
pub struct RunCompactor {
    label: RunLabel,
    pending: Vec<u16, MAX_TOKENS_PER_LINE>,
    last_value: Option<u16>,
    run_start: u32,
    next_label: u32,
}

impl RunCompactor {
    pub fn new(label: RunLabel) -> Self {
        RunCompactor {
            label,
            pending: Vec::new(),
            last_value: None,
            run_start: 1,
            next_label: 1,
        }
    }

    /// Buffer one sample, returning the line it closed, if any.
    pub fn push(&mut self, sample: &Sample) -> Result<Option<Run>, Error> {
        let changed = self.last_value.map_or(false, |last| last != sample.value);
        let mut closed = None;
        if self.pending.is_full() || (changed && !self.pending.is_empty()) {
            closed = self.close();
            self.next_label = sample.t + 1;
        }
        if self.pending.is_empty() {
            self.run_start = sample.t;
        }
        self.pending
            .push(sample.value)
            .map_err(|_| Error::RunOverflow)?;
        self.last_value = Some(sample.value);
        Ok(closed)
    }

    /// Close whatever is still pending once the samples run out.
    pub fn finish(&mut self) -> Option<Run> {
        self.close()
    }

    fn close(&mut self) -> Option<Run> {
        if self.pending.is_empty() {
            return None;
        }
        let label = match self.label {
            RunLabel::Legacy => self.next_label,
            RunLabel::FirstSample => self.run_start,
        };
        let run = Run {
            label,
            start: self.run_start,
            values: mem::take(&mut self.pending),
        };
        trace!("line {}..={} // {}", run.start, run.end(), run.label);
        Some(run)
    }
}

pub struct Runs<I> {
    samples: I,
    compactor: RunCompactor,
}

impl<I: Iterator<Item = Sample>> Runs<I> {
    pub fn new(samples: I, label: RunLabel) -> Self {
        Runs {
            samples,
            compactor: RunCompactor::new(label),
        }
    }
}

impl<I: Iterator<Item = Sample>> Iterator for Runs<I> {
    type Item = Result<Run, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        for sample in self.samples.by_ref() {
            match self.compactor.push(&sample) {
                Ok(Some(run)) => return Some(Ok(run)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        self.compactor.finish().map(Ok)
    }
}

impl WaveParams {
    pub fn runs(&self, label: RunLabel) -> Runs<Samples> {
        Runs::new(self.samples(), label)
    }
}
