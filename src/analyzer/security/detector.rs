//! # Regex Detector
//!
//! Runs compiled rules over the full source text and turns every match into a
//! [`Finding`] with a line number and a highlighted snippet.

use log::{debug, trace};

use super::core::{Finding, PatternRule, RuleSet};
use super::patterns::PatternCatalog;

/// Lines of context kept on each side of the matched line.
const SNIPPET_CONTEXT: usize = 2;
const HIGHLIGHT: &str = ">>> ";

/// A fixed selection of catalog rules.
#[derive(Debug, Clone)]
pub struct RegexDetector<'c> {
    rules: Vec<&'c PatternRule>,
}

impl RegexDetector<'static> {
    /// Base EVM / Solidity catalog.
    pub fn evm() -> Self {
        Self::for_sets(PatternCatalog::global(), &[RuleSet::Evm])
    }

    /// Solana / Rust catalog.
    pub fn solana() -> Self {
        Self::for_sets(PatternCatalog::global(), &[RuleSet::Solana])
    }
}

impl<'c> RegexDetector<'c> {
    /// Rules from `sets`, in the order given.
    pub fn for_sets(catalog: &'c PatternCatalog, sets: &[RuleSet]) -> Self {
        let rules = sets.iter().flat_map(|&set| catalog.rules_in(set)).collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[&'c PatternRule] {
        &self.rules
    }

    pub fn scan(&self, source: &str) -> Vec<Finding> {
        scan(source, self.rules.iter().copied())
    }
}

/// Apply `rules` to `source`. One raw finding per match; never fails on input.
pub fn scan<'r, I>(source: &str, rules: I) -> Vec<Finding>
where
    I: IntoIterator<Item = &'r PatternRule>,
{
    if source.is_empty() {
        return Vec::new();
    }

    let index = LineIndex::new(source);
    let mut findings = Vec::new();

    for rule in rules {
        for found in rule.pattern.find_iter(source) {
            let mat = match found {
                Ok(mat) => mat,
                Err(err) => {
                    // Backtrack budget exhausted; keep what this rule already found.
                    debug!("Rule '{}' stopped early: {}", rule.id, err);
                    break;
                }
            };
            let line = index.line_of(mat.start());
            trace!("Rule '{}' matched at line {}", rule.id, line);
            findings.push(rule.finding(line, index.snippet(line)));
        }
    }

    findings
}

/// Byte offsets of line starts, for offset to line lookups.
struct LineIndex<'a> {
    lines: Vec<&'a str>,
    line_offsets: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let mut line_offsets = vec![0];
        line_offsets.extend(source.match_indices('\n').map(|(i, _)| i + 1));

        let lines = source
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();

        Self { lines, line_offsets }
    }

    /// 1-indexed line containing byte `offset`: newlines before it, plus one.
    fn line_of(&self, offset: usize) -> usize {
        let idx = self
            .line_offsets
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));
        idx + 1
    }

    /// Lines `line-2 ..= line+2`, clipped, with the matched line highlighted.
    fn snippet(&self, line: usize) -> String {
        let target = line - 1;
        let start = target.saturating_sub(SNIPPET_CONTEXT);
        let end = (target + SNIPPET_CONTEXT + 1).min(self.lines.len());

        self.lines[start..end]
            .iter()
            .enumerate()
            .map(|(i, text)| {
                if start + i == target {
                    format!("{HIGHLIGHT}{text}")
                } else {
                    (*text).to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
