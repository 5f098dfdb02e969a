use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{info, warn};

use crate::cli::RepairArgs;
use crate::commands::load_catalog;
use crate::model::RepairKind;
use crate::util::{ContentLayout, ensure_directory};

const SAMPLE_CHANGES: usize = 5;

pub fn run(args: RepairArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let layout = ContentLayout::new(&args.content_root);
    let repairer = LineRepairer::new()?;

    let mut repaired = 0usize;
    for binding in catalog.select(&args.sources)? {
        let Some(kind) = binding.repair else {
            continue;
        };

        let input = layout.backup_dir().join(&binding.file);
        let output = layout.raw_dir().join(&binding.file);
        let changes = repair_file(&repairer, kind, &input, &output)?;

        info!(
            file = %binding.file,
            repair = ?kind,
            changes = changes.len(),
            output = %output.display(),
            "repaired source"
        );
        for change in changes.iter().take(SAMPLE_CHANGES) {
            info!(file = %binding.file, "{change}");
        }
        repaired += 1;
    }

    if repaired == 0 {
        warn!("no selected catalog source asks for a repair");
    }
    Ok(())
}

/// Rewrites `input` into `output` line by line, keeping line terminators.
/// Returns a description of each change.
pub(crate) fn repair_file(
    repairer: &LineRepairer,
    kind: RepairKind,
    input: &Path,
    output: &Path,
) -> Result<Vec<String>> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("failed to read backup source {}", input.display()))?;

    let mut repaired = String::with_capacity(source.len() + source.len() / 16);
    let mut changes = Vec::new();

    for (index, raw_line) in source.split_inclusive('\n').enumerate() {
        let line_number = index + 1;
        let content = raw_line.trim_end_matches(['\r', '\n']);
        let terminator = &raw_line[content.len()..];

        let fixed = match kind {
            RepairKind::DetachedNumbers => {
                repairer.detach_numbers(content, line_number, &mut changes)
            }
            RepairKind::SpacedHeadword => match repairer.respace_headword(content) {
                Some(fixed) => {
                    changes.push(format!("line {line_number}: {content} -> {fixed}"));
                    fixed
                }
                None => content.to_string(),
            },
        };

        repaired.push_str(&fixed);
        repaired.push_str(terminator);
    }

    if let Some(parent) = output.parent() {
        ensure_directory(parent)?;
    }
    fs::write(output, repaired).with_context(|| format!("failed to write {}", output.display()))?;
    Ok(changes)
}

/// Line-level OCR cleanups for scanned sources.
#[derive(Debug)]
pub(crate) struct LineRepairer {
    detached_number: Regex,
    headword_end: Regex,
    trailing_number: Regex,
}

impl LineRepairer {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            detached_number: Regex::new(r"\d+(?:\.|,|\s*/)")
                .context("failed to compile detached number regex")?,
            headword_end: Regex::new(r"[(\[а-я]").context("failed to compile headword end regex")?,
            trailing_number: Regex::new(r"(\d+)([.,]?)$")
                .context("failed to compile trailing number regex")?,
        })
    }

    /// `word1.` -> `word 1.`, `word2,` -> `word 2,` and `word1/` -> `word /`.
    /// Digits after whitespace, another digit or `(` are left alone.
    pub(crate) fn detach_numbers(
        &self,
        line: &str,
        line_number: usize,
        changes: &mut Vec<String>,
    ) -> String {
        let mut out = String::with_capacity(line.len() + 8);
        let mut last = 0;

        for found in self.detached_number.find_iter(line) {
            let attached = line[..found.start()]
                .chars()
                .next_back()
                .map(|ch| !ch.is_whitespace() && !ch.is_numeric() && ch != '(')
                .unwrap_or(false);
            if !attached {
                continue;
            }

            let original = found.as_str();
            let replacement = if original.ends_with('/') {
                " /".to_string()
            } else {
                format!(" {original}")
            };

            out.push_str(&line[last..found.start()]);
            out.push_str(&replacement);
            last = found.end();
            changes.push(format!("line {line_number}: '{original}' -> '{replacement}'"));
        }

        out.push_str(&line[last..]);
        out
    }

    /// Removes OCR spacing inside the headword block (text before the first
    /// `(`, `[` or lowercase Cyrillic letter) and re-separates a trailing
    /// homograph number. `None` when the line needs no change.
    pub(crate) fn respace_headword(&self, line: &str) -> Option<String> {
        let split = self.headword_end.find(line)?;
        let (head, rest) = line.split_at(split.start());
        if head.trim().is_empty() {
            return None;
        }

        let joined = head.replace(' ', "");
        let cleaned = self.trailing_number.replace(&joined, " $1$2");
        if cleaned == head {
            return None;
        }

        Some(format!("{cleaned} {}", rest.trim_start()))
    }
}
