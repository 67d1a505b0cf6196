//! Register Value Decoding
//!
//! Fixed decode algorithm for multi-word numeric points: words are low word
//! first, magnitude = sum(word[i] * 65536^i).
//!
//! The signed path reflects the LOW WORD ONLY through 65536 when its raw
//! value exceeds 32767; higher words keep accumulating unsigned. This is a
//! deliberate, preserved sign convention - not full-width two's complement -
//! and deployed configurations depend on its exact behavior.

/// Decode an ordered word list (low word first) into a signed magnitude
pub fn decode_words(words: &[u16], signed: bool) -> i128 {
    let mut val: i128 = 0;
    for (i, word) in words.iter().enumerate() {
        let mut r = i128::from(*word);
        if i == 0 && signed && r > 32767 {
            r -= 65536;
        }
        val += r << (16 * i as u32);
    }
    val
}

/// Linear transformation: `scale * magnitude + offset`
pub fn scale_magnitude(magnitude: i128, scale: f64, offset: f64) -> f64 {
    scale * magnitude as f64 + offset
}

/// Render with a fixed number of decimal places
pub fn render_precision(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

// ============================================================================
// Tests
// ============================================================================
