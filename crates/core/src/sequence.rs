//! Sequence storage is an explicit non-goal: base strings are retrieved
//! from an external store keyed by contig and coordinate range.

use crate::piece::ContigId;
use serde::{Deserialize, Serialize};

/// Opaque identifier for a resolved sequence (cap -> sequence -> contig
/// resolution, per the flower API contract in §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceId(pub u64);

/// External sequence-string lookup, consumed (not implemented) by this
/// crate. The repeat-mask filter (§4.5 step 3) is the only caller.
pub trait SequenceStore {
    /// Resolve a contig to its owning sequence, if known.
    fn sequence_for_contig(&self, contig: ContigId) -> Option<SequenceId>;

    /// Fetch `length` bases of `contig` starting at `start` (1-based,
    /// inclusive), on the forward strand if `strand` else the reverse
    /// complement. Returns `None` if out of range.
    fn get_string(&self, contig: ContigId, start: i64, length: i64, strand: bool) -> Option<String>;
}

/// Returns `true` if `bases` contains a lowercase base or an `N`/`n`.
/// Dashes (gap characters) are ignored. Mirrors the source tool's
/// `containsRepeatBases` check used by the repeat-mask filter.
pub fn contains_repeat_bases(bases: &str) -> bool {
    bases
        .bytes()
        .any(|b| b != b'-' && (b.is_ascii_lowercase() || b == b'N'))
}
