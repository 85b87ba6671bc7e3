use annotate_snippets::{
	display_list::{DisplayList, FormatOptions},
	snippet::{Annotation, AnnotationType, Slice, Snippet, SourceAnnotation},
};
use std::fmt::Display;
use std::ops::Range;

/// Байтовый диапазон во всём тексте сценария.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct GlobalSpan(pub Range<usize>);

/// Байтовый диапазон внутри одной строки сценария.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LocalSpan(pub Range<usize>);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Spanned<T> {
	pub span: GlobalSpan,
	pub inner: T,
}

impl LocalSpan {
	pub fn globalize_span(self, start: usize) -> GlobalSpan {
		GlobalSpan(self.0.start + start..self.0.end + start)
	}
}

impl<T> Spanned<T> {
	pub fn new(t: T, span: GlobalSpan) -> Self {
		Spanned { span, inner: t }
	}
}

impl<T: Display> Spanned<T> {
	/// Сообщение об ошибке с подчёркнутым местом в исходной строке.
	pub fn error_snippet(&self, string: &str, color: bool) -> String {
		let text = self.inner.to_string();
		let (line_no, line_range) = find_line(string, self.span.0.start);
		let line = &string[line_range.clone()];
		let line_chars = line.chars().count();

		let start = char_position(line, self.span.0.start.saturating_sub(line_range.start));
		let end = char_position(line, self.span.0.end.saturating_sub(line_range.start)).max(start + 1);
		let start = start.min(line_chars.saturating_sub(1));
		let end = end.min(line_chars).max(start + 1);

		let annotations = if line_chars == 0 {
			vec![]
		} else {
			vec![SourceAnnotation {
				label: "",
				annotation_type: AnnotationType::Error,
				range: (start, end),
			}]
		};

		let snippet = Snippet {
			title: Some(Annotation {
				label: Some(&text),
				id: None,
				annotation_type: AnnotationType::Error,
			}),
			footer: vec![],
			slices: vec![Slice {
				source: line,
				line_start: line_no,
				origin: None,
				fold: false,
				annotations,
			}],
			opt: FormatOptions {
				color,
				..Default::default()
			},
		};
		DisplayList::from(snippet).to_string()
	}

	pub fn print_error_snippet(&self, string: &str) {
		println!("{}", self.error_snippet(string, true));
	}
}

/// Номер строки с единицы и байтовый диапазон строки, в которой лежит `pos`.
fn find_line(string: &str, pos: usize) -> (usize, Range<usize>) {
	let mut pos = pos.min(string.len());
	while !string.is_char_boundary(pos) {
		pos -= 1;
	}
	let start = string[..pos].rfind('\n').map(|index| index + 1).unwrap_or(0);
	let end = string[pos..].find('\n').map(|index| pos + index).unwrap_or_else(|| string.len());
	let line_no = string[..start].matches('\n').count() + 1;
	(line_no, start..end)
}

/// `annotate-snippets` считает позиции в символах, а `peg` в байтах.
fn char_position(line: &str, byte_pos: usize) -> usize {
	line.char_indices().take_while(|(index, _)| *index < byte_pos).count()
}
