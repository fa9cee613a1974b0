use std::fmt;

/// A single sequence entry read from the input file.
///
/// Records are immutable once read. The identifier doubles as the key for the
/// record's output paths, so it must be unique within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: String,
    residues: String,
}

impl Record {
    pub fn new(id: impl Into<String>, residues: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            residues: residues.into(),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn residues(&self) -> &str {
        &self.residues
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} residues)", self.id, self.residues.len())
    }
}
