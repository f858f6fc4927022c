//! Routing matrices and the cross-point connection rules.

use std::collections::BTreeSet;

use ember_glow::{ConnectionOperation, Path};

use super::ModelError;

/// Matrix topology together with its variant-specific metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixKind {
    /// At most one source per target.
    OneToN,
    /// At most one source per target and each source on at most one target.
    OneToOne,
    /// Any set of sources per target.
    NToN {
        /// Node holding per-signal parameters.
        parameters: Option<Path>,
    },
    /// Any set of sources per target with inline per-signal parameters.
    Dynamic {
        /// Sub-identifier of the inline parameters below the matrix.
        parameters_sub_identifier: u32,
    },
}

impl MatrixKind {
    const fn is_exclusive(&self) -> bool {
        matches!(self, Self::OneToN | Self::OneToOne)
    }
}

/// A target or source of a matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    number: u32,
    connected_sources: BTreeSet<u32>,
}

impl Signal {
    fn new(number: u32) -> Self {
        Self {
            number,
            connected_sources: BTreeSet::new(),
        }
    }

    /// Signal number, unique within its collection.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Sources currently routed to this signal, in ascending order.
    #[must_use]
    pub fn connected_sources(&self) -> &BTreeSet<u32> {
        &self.connected_sources
    }
}

/// Routing matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    kind: MatrixKind,
    target_count: u32,
    source_count: u32,
    targets: Vec<Signal>,
    sources: Vec<Signal>,
    labels: Option<Path>,
}

impl Matrix {
    /// Matrix whose targets and sources are numbered `0..count`.
    #[must_use]
    pub fn linear(kind: MatrixKind, target_count: u32, source_count: u32) -> Self {
        Self {
            kind,
            target_count,
            source_count,
            targets: (0..target_count).map(Signal::new).collect(),
            sources: (0..source_count).map(Signal::new).collect(),
            labels: None,
        }
    }

    /// Matrix that materializes only the listed signals of a larger declared
    /// capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateSignal`] when a number is listed twice
    /// in the same collection.
    pub fn sparse(
        kind: MatrixKind,
        target_count: u32,
        source_count: u32,
        targets: impl IntoIterator<Item = u32>,
        sources: impl IntoIterator<Item = u32>,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            kind,
            target_count,
            source_count,
            targets: unique_signals(targets)?,
            sources: unique_signals(sources)?,
            labels: None,
        })
    }

    /// Points the matrix at its labels node.
    #[must_use]
    pub fn with_labels(mut self, labels: Path) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Topology.
    #[must_use]
    pub const fn kind(&self) -> &MatrixKind {
        &self.kind
    }

    /// Declared target capacity.
    #[must_use]
    pub const fn target_count(&self) -> u32 {
        self.target_count
    }

    /// Declared source capacity.
    #[must_use]
    pub const fn source_count(&self) -> u32 {
        self.source_count
    }

    /// Materialized targets.
    #[must_use]
    pub fn targets(&self) -> &[Signal] {
        &self.targets
    }

    /// Materialized sources.
    #[must_use]
    pub fn sources(&self) -> &[Signal] {
        &self.sources
    }

    /// Path of the labels node, if any.
    #[must_use]
    pub fn labels(&self) -> Option<&Path> {
        self.labels.as_ref()
    }

    /// The target numbered `number`.
    #[must_use]
    pub fn target(&self, number: u32) -> Option<&Signal> {
        self.targets.iter().find(|signal| signal.number == number)
    }

    fn has_source(&self, number: u32) -> bool {
        self.sources.iter().any(|signal| signal.number == number)
    }

    /// Applies one connection request to `target`.
    ///
    /// Unknown sources are filtered out first. Returns the numbers of every
    /// target whose state should be reported, the requested target first, or
    /// `None` when the request is a no-op: the target is unknown, sources were
    /// named and none of them exist, or a `Connect` or `Disconnect` leaves the
    /// target as it was. An `Absolute` request always reports its target.
    pub fn connect(
        &mut self,
        target: u32,
        requested: &[u32],
        operation: ConnectionOperation,
    ) -> Option<Vec<u32>> {
        let index = self
            .targets
            .iter()
            .position(|signal| signal.number == target)?;

        let mut filtered: Vec<u32> = Vec::with_capacity(requested.len());
        for &source in requested {
            if self.has_source(source) && !filtered.contains(&source) {
                filtered.push(source);
            }
        }
        if !requested.is_empty() && filtered.is_empty() {
            return None;
        }

        let current = &self.targets[index].connected_sources;
        let next: BTreeSet<u32> = match operation {
            ConnectionOperation::Disconnect => current
                .iter()
                .copied()
                .filter(|source| !filtered.contains(source))
                .collect(),
            ConnectionOperation::Absolute | ConnectionOperation::Connect
                if self.kind.is_exclusive() =>
            {
                match filtered.last() {
                    Some(&last) => BTreeSet::from([last]),
                    None if operation == ConnectionOperation::Absolute => BTreeSet::new(),
                    None => current.clone(),
                }
            }
            ConnectionOperation::Absolute => filtered.iter().copied().collect(),
            ConnectionOperation::Connect => {
                current.iter().copied().chain(filtered.iter().copied()).collect()
            }
        };
        if operation != ConnectionOperation::Absolute && next == *current {
            return None;
        }

        let mut affected = vec![target];
        if matches!(self.kind, MatrixKind::OneToOne) {
            for (position, signal) in self.targets.iter_mut().enumerate() {
                if position == index {
                    continue;
                }
                let before = signal.connected_sources.len();
                signal
                    .connected_sources
                    .retain(|source| !next.contains(source));
                if signal.connected_sources.len() != before {
                    affected.push(signal.number);
                }
            }
        }
        self.targets[index].connected_sources = next;
        Some(affected)
    }
}

fn unique_signals(numbers: impl IntoIterator<Item = u32>) -> Result<Vec<Signal>, ModelError> {
    let mut seen = BTreeSet::new();
    numbers
        .into_iter()
        .map(|number| {
            if seen.insert(number) {
                Ok(Signal::new(number))
            } else {
                Err(ModelError::DuplicateSignal { number })
            }
        })
        .collect()
}
