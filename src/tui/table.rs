use comfy_table::{ContentArrangement, presets};

/// A table cell before coercion to text.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
    Bytes(Vec<u8>),
}

impl Cell {
    pub fn render(&self) -> String {
        match self {
            Cell::Bool(true) => "✅".to_string(),
            Cell::Bool(false) => "❌".to_string(),
            Cell::Int(n) => n.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::List(items) => {
                let quoted: Vec<String> = items.iter().map(|s| format!("{:?}", s)).collect();
                format!("[{}]", quoted.join(", "))
            }
            Cell::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::Int(v.into())
    }
}

impl From<u32> for Cell {
    fn from(v: u32) -> Self {
        Cell::Int(v.into())
    }
}

impl From<usize> for Cell {
    fn from(v: usize) -> Self {
        Cell::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<&String> for Cell {
    fn from(v: &String) -> Self {
        Cell::Text(v.clone())
    }
}

impl From<Option<String>> for Cell {
    fn from(v: Option<String>) -> Self {
        Cell::Text(v.unwrap_or_else(|| "-".to_string()))
    }
}

impl From<Vec<String>> for Cell {
    fn from(v: Vec<String>) -> Self {
        Cell::List(v)
    }
}

impl From<&[u8]> for Cell {
    fn from(v: &[u8]) -> Self {
        Cell::Bytes(v.to_vec())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    /// Columns sized to their content.
    Auto,
    Fixed(u16),
    /// As wide as the terminal, 80 columns when that cannot be measured.
    Full,
}

#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    width: Width,
}

impl Table {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            width: Width::Auto,
        }
    }

    pub fn width(mut self, width: Width) -> Self {
        self.width = width;
        self
    }

    /// Builds the table text, calling `row` once per item.
    pub fn render<T, F>(&self, items: &[T], mut row: F) -> String
    where
        F: FnMut(&T) -> Vec<Cell>,
    {
        let mut table = comfy_table::Table::new();
        table.load_preset(presets::ASCII_FULL);
        table.set_header(self.headers.clone());
        match self.width {
            Width::Auto => {}
            Width::Fixed(w) => {
                table.set_content_arrangement(ContentArrangement::Dynamic);
                table.set_width(w);
            }
            Width::Full => {
                let w = crossterm::terminal::size().map(|(w, _)| w).unwrap_or(80);
                table.set_content_arrangement(ContentArrangement::DynamicFullWidth);
                table.set_width(w);
            }
        }
        for item in items {
            let cells: Vec<String> = row(item).iter().map(Cell::render).collect();
            table.add_row(cells);
        }
        table.to_string()
    }
}
