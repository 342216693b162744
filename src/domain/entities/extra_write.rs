use crate::domain::entities::value::CellValue;
use crate::domain::reconcile::error::ReconcileError;

const ROW_PLACEHOLDER: &str = "row";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    RowNumber,
}

/// `{row}` is the 1-based destination row; `{{` and `}}` are literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl RowTemplate {
    pub fn parse(source: &str) -> Result<Self, ReconcileError> {
        let invalid = |reason: String| ReconcileError::Template {
            template: source.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => name.push(c),
                            None => return Err(invalid("unclosed `{`".to_string())),
                        }
                    }
                    if name != ROW_PLACEHOLDER {
                        return Err(invalid(format!(
                            "unknown placeholder `{{{name}}}`, only `{{row}}` is supported"
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::RowNumber);
                }
                '}' => return Err(invalid("single `}` must be written as `}}`".to_string())),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn render(&self, row_number: usize) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::RowNumber => out.push_str(&row_number.to_string()),
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteContent {
    Literal(CellValue),
    Template(RowTemplate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraWrite {
    pub column: String,
    pub content: WriteContent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraWrites {
    writes: Vec<ExtraWrite>,
}

impl ExtraWrites {
    pub fn new(writes: Vec<ExtraWrite>) -> Self {
        Self { writes }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtraWrite> {
        self.writes.iter()
    }
}
