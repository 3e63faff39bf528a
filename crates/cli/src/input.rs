//! Plain-text input parsing: a minimal FASTA reader and a whitespace
//! delimited pairwise-alignment format, wired to `cactus_core`'s
//! `SequenceStore`/`Alignment` types. Not a production genome-alignment
//! front end (§1 non-goal) — just enough to drive the pipeline from
//! files on disk.

use cactus_core::alignment::{AlignedPair, Alignment};
use cactus_core::piece::{ContigId, Piece};
use cactus_core::sequence::{SequenceId, SequenceStore};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

pub struct FastaSequences {
    by_contig: HashMap<ContigId, String>,
}

impl FastaSequences {
    pub fn get(&self, contig: ContigId) -> Option<&str> {
        self.by_contig.get(&contig).map(|s| s.as_str())
    }
}

impl SequenceStore for FastaSequences {
    fn sequence_for_contig(&self, contig: ContigId) -> Option<SequenceId> {
        self.by_contig.contains_key(&contig).then_some(SequenceId(contig.0))
    }

    fn get_string(&self, contig: ContigId, start: i64, length: i64, strand: bool) -> Option<String> {
        let seq = self.by_contig.get(&contig)?;
        let bytes = seq.as_bytes();
        let lo = usize::try_from(start - 1).ok()?;
        let len = usize::try_from(length).ok()?;
        let hi = lo.checked_add(len)?;
        if hi > bytes.len() {
            return None;
        }
        let slice = &bytes[lo..hi];
        if strand {
            Some(String::from_utf8_lossy(slice).into_owned())
        } else {
            Some(reverse_complement(slice))
        }
    }
}

fn reverse_complement(bases: &[u8]) -> String {
    bases
        .iter()
        .rev()
        .map(|&b| match b {
            b'A' => 'T',
            b'a' => 't',
            b'T' => 'A',
            b't' => 'a',
            b'C' => 'G',
            b'c' => 'g',
            b'G' => 'C',
            b'g' => 'c',
            other => other as char,
        })
        .collect()
}

/// Parsed FASTA contigs in file order, alongside the sequence store and a
/// name -> id table for resolving the alignment file.
pub struct ParsedFasta {
    pub contigs: Vec<(ContigId, i64)>,
    pub names: HashMap<String, ContigId>,
    pub sequences: FastaSequences,
}

pub fn parse_fasta(path: &Path) -> io::Result<ParsedFasta> {
    let text = fs::read_to_string(path)?;
    let mut contigs = Vec::new();
    let mut names = HashMap::new();
    let mut by_contig = HashMap::new();

    let mut current_name: Option<String> = None;
    let mut current_seq = String::new();
    let mut next_id = 0u64;

    let mut flush = |name: Option<String>, seq: String, contigs: &mut Vec<(ContigId, i64)>, names: &mut HashMap<String, ContigId>, by_contig: &mut HashMap<ContigId, String>, next_id: &mut u64| {
        if let Some(name) = name {
            let id = ContigId(*next_id);
            *next_id += 1;
            contigs.push((id, seq.len() as i64));
            names.insert(name, id);
            by_contig.insert(id, seq);
        }
    };

    for line in text.lines() {
        if let Some(name) = line.strip_prefix('>') {
            flush(current_name.take(), std::mem::take(&mut current_seq), &mut contigs, &mut names, &mut by_contig, &mut next_id);
            current_name = Some(name.trim().to_string());
        } else {
            current_seq.push_str(line.trim());
        }
    }
    flush(current_name.take(), current_seq, &mut contigs, &mut names, &mut by_contig, &mut next_id);

    Ok(ParsedFasta {
        contigs,
        names,
        sequences: FastaSequences { by_contig },
    })
}

/// Parse a whitespace-delimited alignment file: one aligned pair per
/// line, `contigA startA endA strandA contigB startB endB strandB
/// [score]`, 1-based inclusive coordinates, strand is `+`/`-`. Each line
/// becomes its own single-pair `Alignment`.
pub fn parse_alignments(path: &Path, names: &HashMap<String, ContigId>) -> io::Result<Vec<Alignment>> {
    let text = fs::read_to_string(path)?;
    let mut alignments = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("alignment file line {}: expected at least 8 fields", lineno + 1),
            ));
        }
        let piece_a = parse_piece(&fields[0..4], names, lineno)?;
        let piece_b = parse_piece(&fields[4..8], names, lineno)?;
        let score = fields.get(8).and_then(|s| s.parse().ok()).unwrap_or(1.0);
        alignments.push(Alignment::new(vec![AlignedPair::new_match(piece_a, piece_b)], score));
    }
    Ok(alignments)
}

fn parse_piece(fields: &[&str], names: &HashMap<String, ContigId>, lineno: usize) -> io::Result<Piece> {
    let bad = |msg: &str| io::Error::new(io::ErrorKind::InvalidData, format!("alignment file line {}: {}", lineno + 1, msg));
    let contig = *names.get(fields[0]).ok_or_else(|| bad("unknown contig name"))?;
    let start: i64 = fields[1].parse().map_err(|_| bad("invalid start"))?;
    let end: i64 = fields[2].parse().map_err(|_| bad("invalid end"))?;
    let forward = match fields[3] {
        "+" => true,
        "-" => false,
        _ => return Err(bad("strand must be + or -")),
    };
    if forward {
        Ok(Piece::new(contig, start, end))
    } else {
        Ok(Piece::new(contig, -end, -start))
    }
}
