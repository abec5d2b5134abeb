//! Reading substitution count matrices from flat numeric text.

use std::io::BufRead;

use ndarray::Array2;

use crate::alphabet::ALPHABET_SIZE;
use crate::core::CountMatrix;
use crate::errors::{ModelMatcherError, Result};

/// Read a 20×20 substitution count matrix.
///
/// The payload is whitespace-separated non-negative integers in row-major
/// order; lines starting with `#` are comments. Fails with `Format` unless
/// exactly 400 values are present.
pub fn read_count_matrix(reader: impl BufRead) -> Result<CountMatrix> {
    let mut values: Vec<u64> = Vec::with_capacity(ALPHABET_SIZE * ALPHABET_SIZE);

    for line in reader.lines() {
        let line = line.map_err(|e| ModelMatcherError::Format(format!("read failed: {}", e)))?;
        if line.starts_with('#') {
            continue;
        }
        for token in line.split_whitespace() {
            let value = token.parse::<u64>().map_err(|_| {
                ModelMatcherError::Format(format!("invalid count token '{}'", token))
            })?;
            values.push(value);
        }
    }

    if values.len() != ALPHABET_SIZE * ALPHABET_SIZE {
        return Err(ModelMatcherError::Format(format!(
            "expected {} count values, got {}",
            ALPHABET_SIZE * ALPHABET_SIZE,
            values.len()
        )));
    }

    let counts = Array2::from_shape_vec((ALPHABET_SIZE, ALPHABET_SIZE), values)
        .map_err(|e| ModelMatcherError::Format(format!("count matrix shape: {}", e)))?;
    Ok(CountMatrix::from_array(counts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_counts(fill: u64) -> String {
        let row = vec![fill.to_string(); 20].join(" ");
        let mut text = String::from("# sampled counts\n");
        for _ in 0..20 {
            text.push_str(&row);
            text.push('\n');
        }
        text
    }

    #[test]
    fn reads_a_full_matrix() {
        let counts = read_count_matrix(flat_counts(2).as_bytes()).unwrap();
        assert_eq!(counts.n_states(), 20);
        assert_eq!(counts.total(), 800);
        assert_eq!(counts.get(19, 19), 2);
    }

    #[test]
    fn too_few_values_is_a_format_error() {
        let input = "1 2 3\n4 5 6\n";
        assert!(matches!(
            read_count_matrix(input.as_bytes()),
            Err(ModelMatcherError::Format(_))
        ));
    }

    #[test]
    fn negative_count_is_a_format_error() {
        let mut text = flat_counts(1);
        text = text.replacen(" 1", " -1", 1);
        assert!(matches!(
            read_count_matrix(text.as_bytes()),
            Err(ModelMatcherError::Format(_))
        ));
    }
}
