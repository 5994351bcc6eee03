/// One cell of a table row (or one sub-element of a card), as read from the
/// live page. Nested structure is kept apart from the flattened text because
/// the flattened text merges sub-fields such as jersey number and class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCell {
    pub text: String,
    pub anchor_text: Option<String>,
    pub href: Option<String>,
    pub divs: Vec<String>,
    pub image_src: Option<String>,
}

impl RawCell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn linked(text: impl Into<String>, href: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            anchor_text: Some(text.clone()),
            href: Some(href.into()),
            text,
            ..Self::default()
        }
    }

    pub fn with_divs(text: impl Into<String>, divs: &[&str]) -> Self {
        Self {
            text: text.into(),
            divs: divs.iter().map(|d| d.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub cells: Vec<RawCell>,
}

impl RawRow {
    pub fn new(cells: Vec<RawCell>) -> Self {
        Self { cells }
    }

    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        Self {
            cells: texts.iter().map(|t| RawCell::text(t.as_ref())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, index: usize) -> Option<&RawCell> {
        self.cells.get(index)
    }
}
