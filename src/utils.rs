/// Converts a 1-based line and column, as reported by parsers, back into a byte offset
/// into the source text. Positions past the end of a line or of the text are clamped.
/// This is only called when an error occurs, as it walks the source text line by line.
pub fn offset_of_line_column(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let within = text
                .char_indices()
                .nth(column.saturating_sub(1))
                .map_or(text.len(), |(byte, _)| byte);
            return offset + within;
        }
        offset += text.len();
    }
    source.len()
}
