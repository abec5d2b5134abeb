//! Reading replacement models in PAML format.

use std::io::BufRead;

use crate::core::RateMatrix;
use crate::errors::{ModelMatcherError, Result};

/// Token count at which a line is treated as the frequency row.
///
/// PAML exchangeability rows hold at most 19 values; the frequency row is the
/// first line with 20 or more. This heuristic assumes the 20-state amino acid
/// alphabet.
const FREQUENCY_LINE_TOKENS: usize = 20;

/// Read an amino acid replacement model in PAML format (also used by PhyML)
/// and return a [`RateMatrix`] named `model_name`.
///
/// Lines starting with `#` are comments. Numeric lines with fewer than 20
/// tokens accumulate lower-triangular exchangeability values; the first line
/// with 20 or more tokens is the frequency row and ends the read. Fails with
/// `Format` if the stream is exhausted before a frequency row appears or a
/// token does not parse as a number.
pub fn read_model(reader: impl BufRead, model_name: &str) -> Result<RateMatrix> {
    let mut r_vals: Vec<f64> = Vec::new();
    let mut freqs: Option<Vec<f64>> = None;

    for line in reader.lines() {
        let line = line.map_err(|e| ModelMatcherError::Format(format!("read failed: {}", e)))?;
        if line.starts_with('#') {
            continue;
        }

        let vals = line
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| {
                    ModelMatcherError::Format(format!("invalid numeric token '{}'", token))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if vals.len() < FREQUENCY_LINE_TOKENS {
            r_vals.extend(vals);
        } else {
            freqs = Some(vals);
            break;
        }
    }

    let freqs = freqs.ok_or_else(|| {
        ModelMatcherError::Format(
            "no frequency line found; is the input really a PAML-formatted model?".to_string(),
        )
    })?;

    RateMatrix::from_r_and_freq(model_name, &r_vals, &freqs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models;

    /// Render a model table back into PAML text: one lower-triangular row per
    /// line, then the frequency row.
    fn paml_text(rates: &[f64; 190], freqs: &[f64; 20]) -> String {
        let mut text = String::from("# synthetic model file\n");
        let mut index = 0;
        for i in 1..20 {
            let row: Vec<String> = (0..i).map(|_| {
                let value = format!("{:.6}", rates[index]);
                index += 1;
                value
            }).collect();
            text.push_str(&row.join(" "));
            text.push('\n');
        }
        text.push('\n');
        let freq_row: Vec<String> = freqs.iter().map(|f| format!("{:.6}", f)).collect();
        text.push_str(&freq_row.join(" "));
        text.push('\n');
        text
    }

    #[test]
    fn round_trips_the_wag_matrix() {
        let wag = models::instantiate("WAG").unwrap();

        // Rebuild the file content from the parsed model and read it back.
        let mut rates = [0.; 190];
        let mut index = 0;
        for i in 1..20 {
            for j in 0..i {
                rates[index] = wag.exchangeabilities()[[i, j]];
                index += 1;
            }
        }
        let mut freqs = [0.; 20];
        for (i, f) in wag.frequencies().iter().enumerate() {
            freqs[i] = *f;
        }

        let text = paml_text(&rates, &freqs);
        let restored = read_model(text.as_bytes(), "WAG-file").unwrap();

        let max_diff = (restored.q() - wag.q())
            .iter()
            .fold(0., |max: f64, &d| max.max(d.abs()));
        assert!(max_diff < 1e-6, "Q differs by {}", max_diff);

        // The restored model decomposes and reconstructs as well.
        let eigen = restored.eigen().unwrap();
        assert!(eigen.reconstruction_error(restored.q()) < 1e-6);
    }

    #[test]
    fn skips_comment_lines() {
        let input = "# a comment\n1.0\n# another\n2.0 3.0\n".to_string()
            + &vec!["0.25"; 20].join(" ")
            + "\n";
        let model = read_model(input.as_bytes(), "tiny");
        // 3 exchangeabilities cannot fill the 190 required for 20 frequencies.
        assert!(matches!(model, Err(ModelMatcherError::MalformedModel(_))));
    }

    #[test]
    fn missing_frequency_line_is_a_format_error() {
        let input = "1.0\n2.0 3.0\n4.0 5.0 6.0\n";
        assert!(matches!(
            read_model(input.as_bytes(), "truncated"),
            Err(ModelMatcherError::Format(_))
        ));
    }

    #[test]
    fn non_numeric_token_is_a_format_error() {
        let input = "1.0\nnot-a-number 3.0\n";
        assert!(matches!(
            read_model(input.as_bytes(), "bad"),
            Err(ModelMatcherError::Format(_))
        ));
    }
}
