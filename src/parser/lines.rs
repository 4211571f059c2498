//! Line splitting that keeps byte offsets and line numbers

/// A line of a file with its byte offset and 1-based number
pub struct Line<'a> {
    pub content: &'a str,
    pub offset: usize,
    pub number: usize,
}

/// Split text into lines, keeping offsets; `content` excludes the line ending
pub fn split_lines(text: &str) -> Vec<Line<'_>> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .enumerate()
        .map(|(i, raw)| {
            let content = raw.trim_end_matches('\n').trim_end_matches('\r');
            let line = Line {
                content,
                offset,
                number: i + 1,
            };
            offset += raw.len();
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_offsets() {
        let lines = split_lines("ab\r\ncd\n\nef");
        let contents: Vec<_> = lines.iter().map(|l| l.content).collect();
        assert_eq!(contents, vec!["ab", "cd", "", "ef"]);
        assert_eq!(lines[1].offset, 4);
        assert_eq!(lines[3].number, 4);
    }
}
