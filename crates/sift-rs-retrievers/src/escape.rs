//! Escape normalization shared by retriever text outputs.

/// Convert between newline characters and their literal `\n` form.
///
/// With `reverse == false` newlines become the two characters `\n`, which is
/// how text outputs are handed to the host. With `reverse == true` literal
/// `\n` sequences become newlines again.
pub fn handle_escape_characters(input: &str, reverse: bool) -> String {
    if reverse {
        input.replace("\\n", "\n")
    } else {
        input.replace('\n', "\\n")
    }
}
