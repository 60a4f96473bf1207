//! Per-entity code coverage.

use super::Percentage;
use crate::model::{CodeCoverageResult, EntityKind};
use std::collections::BTreeMap;

/// Coverage state of one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStatus {
    Covered,
    NotCovered,
    /// No instrumentation data for the line.
    Ignored,
}

impl LineStatus {
    /// CSS class used on the detail page.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::Covered => "lineCov",
            Self::NotCovered => "lineNoCov",
            Self::Ignored => "srcLine",
        }
    }
}

/// Coverage of one class or trigger.
#[derive(Debug, Clone)]
pub struct CoverageResult {
    name: String,
    base_name: String,
    kind: EntityKind,
    num_locations: u32,
    num_locations_not_covered: u32,
    lines: BTreeMap<u32, LineStatus>,
    warning: Option<String>,
}

impl CoverageResult {
    /// `name` is the namespace-qualified key; `base_name` is the bare entity name.
    #[must_use]
    pub fn new(name: impl Into<String>, base_name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            base_name: base_name.into(),
            kind,
            num_locations: 0,
            num_locations_not_covered: 0,
            lines: BTreeMap::new(),
            warning: None,
        }
    }

    /// Record coverage counts and uncovered lines.
    ///
    /// Counts from a later record replace earlier ones; uncovered lines merge.
    pub fn add_coverage(&mut self, record: &CodeCoverageResult) {
        self.num_locations = record.num_locations;
        self.num_locations_not_covered = record.num_locations_not_covered;
        for loc in &record.locations_not_covered {
            self.lines.insert(loc.line, LineStatus::NotCovered);
        }
    }

    pub fn set_warning(&mut self, message: impl Into<String>) {
        self.warning = Some(message.into());
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub const fn num_locations(&self) -> u32 {
        self.num_locations
    }

    #[must_use]
    pub const fn num_locations_covered(&self) -> u32 {
        self.num_locations
            .saturating_sub(self.num_locations_not_covered)
    }

    #[must_use]
    pub const fn num_locations_not_covered(&self) -> u32 {
        self.num_locations_not_covered
    }

    /// Covered share of instrumented locations, absent when there are none.
    #[must_use]
    pub fn percentage(&self) -> Option<Percentage> {
        Percentage::from_ratio(
            u64::from(self.num_locations_covered()),
            u64::from(self.num_locations),
        )
    }

    #[must_use]
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    #[must_use]
    pub fn line_status(&self, line: u32) -> LineStatus {
        self.lines.get(&line).copied().unwrap_or(LineStatus::Ignored)
    }
}
