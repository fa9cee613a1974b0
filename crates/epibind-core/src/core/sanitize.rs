//! Canonicalization of ambiguous residue codes.
//!
//! The prediction service only accepts the twenty standard amino acids. The
//! ambiguity codes `X` (any), `B` (Asx) and `J` (Xle) are replaced with alanine
//! before submission. Every other character passes through unchanged.

/// Residue codes the prediction service rejects.
pub const AMBIGUOUS_RESIDUES: [char; 3] = ['X', 'B', 'J'];

/// Replacement written in place of every ambiguous residue.
pub const CANONICAL_SUBSTITUTE: char = 'A';

/// Replaces every ambiguous residue code with [`CANONICAL_SUBSTITUTE`].
///
/// Total and idempotent; the output has the same length as the input.
pub fn sanitize_residues(residues: &str) -> String {
    residues
        .chars()
        .map(|c| {
            if AMBIGUOUS_RESIDUES.contains(&c) {
                CANONICAL_SUBSTITUTE
            } else {
                c
            }
        })
        .collect()
}
