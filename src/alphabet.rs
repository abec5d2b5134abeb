//! The amino acid alphabet and its index mapping.
//!
//! Models and count matrices use the standard phylogenetics ordering
//! A R N D C Q E G H I L K M F P S T W Y V, i.e. the row and column order
//! of PAML-formatted replacement matrices.

/// Number of amino acid states.
pub const ALPHABET_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AminoAcid {
    Ala,
    Arg,
    Asn,
    Asp,
    Cys,
    Gln,
    Glu,
    Gly,
    His,
    Ile,
    Leu,
    Lys,
    Met,
    Phe,
    Pro,
    Ser,
    Thr,
    Trp,
    Tyr,
    Val,
}

/// All amino acids in matrix order.
pub const AMINO_ACIDS: [AminoAcid; ALPHABET_SIZE] = [
    AminoAcid::Ala,
    AminoAcid::Arg,
    AminoAcid::Asn,
    AminoAcid::Asp,
    AminoAcid::Cys,
    AminoAcid::Gln,
    AminoAcid::Glu,
    AminoAcid::Gly,
    AminoAcid::His,
    AminoAcid::Ile,
    AminoAcid::Leu,
    AminoAcid::Lys,
    AminoAcid::Met,
    AminoAcid::Phe,
    AminoAcid::Pro,
    AminoAcid::Ser,
    AminoAcid::Thr,
    AminoAcid::Trp,
    AminoAcid::Tyr,
    AminoAcid::Val,
];

const ONE_LETTER: [u8; ALPHABET_SIZE] = [
    b'A', b'R', b'N', b'D', b'C', b'Q', b'E', b'G', b'H', b'I', b'L', b'K', b'M', b'F', b'P',
    b'S', b'T', b'W', b'Y', b'V',
];

impl AminoAcid {
    /// Decode a one-letter code, case-insensitively. Returns `None` for
    /// gaps, ambiguity codes and anything else outside the 20 states.
    pub fn try_decode(s: u8) -> Option<Self> {
        let upper = s.to_ascii_uppercase();
        ONE_LETTER
            .iter()
            .position(|&code| code == upper)
            .map(|index| AMINO_ACIDS[index])
    }

    /// One-letter code of this amino acid.
    pub fn encode(&self) -> u8 {
        ONE_LETTER[self.index()]
    }

    /// Row/column index in a replacement matrix.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Amino acid for a matrix row/column index.
    pub fn from_index(index: usize) -> Option<Self> {
        AMINO_ACIDS.get(index).copied()
    }
}

impl std::fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.encode() as char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_all_20() {
        for (index, &code) in ONE_LETTER.iter().enumerate() {
            let aa = AminoAcid::try_decode(code).unwrap();
            assert_eq!(aa.index(), index);
            assert_eq!(aa.encode(), code);
        }
    }

    #[test]
    fn decode_is_case_insensitive() {
        assert_eq!(AminoAcid::try_decode(b'w'), Some(AminoAcid::Trp));
        assert_eq!(AminoAcid::try_decode(b'W'), Some(AminoAcid::Trp));
    }

    #[test]
    fn decode_rejects_non_residues() {
        assert_eq!(AminoAcid::try_decode(b'X'), None);
        assert_eq!(AminoAcid::try_decode(b'-'), None);
        assert_eq!(AminoAcid::try_decode(b'*'), None);
    }

    #[test]
    fn index_round_trip() {
        for index in 0..ALPHABET_SIZE {
            assert_eq!(AminoAcid::from_index(index).unwrap().index(), index);
        }
        assert_eq!(AminoAcid::from_index(ALPHABET_SIZE), None);
    }
}
