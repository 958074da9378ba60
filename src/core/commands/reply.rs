// Platform-neutral reply model. The Discord layer renders these into
// messages; handlers only ever build them.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Embed {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
    pub thumbnail: Option<String>,
    pub fields: Vec<EmbedField>,
}

impl Embed {
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Look up a field value by name.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub content: Option<String>,
    pub embed: Option<Embed>,
    pub attachment: Option<Attachment>,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn warning(message: impl std::fmt::Display) -> Self {
        Self::text(format!(":warning: {}", message))
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            ..Default::default()
        }
    }

    pub fn table(table: &Table) -> Self {
        Self::text(table.compile())
    }

    pub fn attachment(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::default().with_attachment(filename, bytes)
    }

    pub fn with_attachment(mut self, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.attachment = Some(Attachment {
            filename: filename.into(),
            bytes,
        });
        self
    }

    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// Fixed-width text table, compiled into a fenced code block.
#[derive(Debug, Clone, Default)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.rows.push(row.into_iter().map(|c| c.to_string()).collect());
    }

    /// Render as a fenced block. Long cells are shortened and trailing rows
    /// dropped so the block, fences included, stays within `MAX_TABLE_CHARS`.
    pub fn compile(&self) -> String {
        let header = shorten_row(&self.header);
        let mut rows: Vec<Vec<String>> = self.rows.iter().map(|row| shorten_row(row)).collect();

        loop {
            let out = render_table(&header, &rows);
            if rows.is_empty() || out.chars().count() <= MAX_TABLE_CHARS {
                return out;
            }
            rows.pop();
        }
    }
}

/// Longest table Discord will accept as one message.
pub const MAX_TABLE_CHARS: usize = 2000;
const MAX_CELL_CHARS: usize = 40;

fn shorten_row(cells: &[String]) -> Vec<String> {
    cells
        .iter()
        .map(|cell| match cell.char_indices().nth(MAX_CELL_CHARS - 1) {
            Some((cut, _)) if cell.chars().count() > MAX_CELL_CHARS => format!("{}…", &cell[..cut]),
            _ => cell.clone(),
        })
        .collect()
}

fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let columns = header.len();
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().take(columns).enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let render_row = |cells: &[String]| -> String {
        (0..columns)
            .map(|idx| {
                let cell = cells.get(idx).map(String::as_str).unwrap_or("");
                format!("{:<width$}", cell, width = widths[idx])
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let separator = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut lines = vec![render_row(header), separator];
    lines.extend(rows.iter().map(|row| render_row(row)));

    format!("```\n{}\n```", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_columns_to_widest_cell() {
        let mut table = Table::new(["Word", "Count"]);
        table.add(["a", "2"]);
        table.add(["longer", "10"]);

        let expected = "```\n\
                        Word   | Count\n\
                        -------+------\n\
                        a      | 2\n\
                        longer | 10\n\
                        ```";
        assert_eq!(table.compile(), expected);
    }

    #[test]
    fn empty_table_keeps_header() {
        let table = Table::new(["Word", "Count"]);
        assert_eq!(table.compile(), "```\nWord | Count\n-----+------\n```");
    }

    #[test]
    fn long_cells_are_shortened() {
        let mut table = Table::new(["Word", "Count"]);
        table.add(["x".repeat(100), "1".to_string()]);

        let out = table.compile();
        let row = out.lines().nth(3).unwrap();
        assert!(row.starts_with(&format!("{}…", "x".repeat(39))));
        assert!(row.ends_with("| 1"));
    }

    #[test]
    fn thirty_long_words_fit_in_one_message() {
        let mut table = Table::new(["Word", "Count"]);
        for i in 0..30 {
            table.add([format!("https://example.com/{:0>60}", i), "3".to_string()]);
        }

        let out = table.compile();
        assert!(out.chars().count() <= MAX_TABLE_CHARS);
        assert_eq!(out.lines().count(), 30 + 3);
        assert!(out.ends_with("\n```"));
    }

    #[test]
    fn oversized_tables_drop_trailing_rows_and_keep_the_closing_fence() {
        let mut table = Table::new(["A", "B", "C", "D"]);
        for i in 0..30 {
            table.add(vec![format!("row{:0>50}", i); 4]);
        }

        let out = table.compile();
        assert!(out.chars().count() <= MAX_TABLE_CHARS);
        assert!(out.starts_with("```\nA"));
        assert!(out.ends_with("\n```"));
        let rows: Vec<&str> = out.lines().skip(3).filter(|l| *l != "```").collect();
        assert!(!rows.is_empty() && rows.len() < 30);
        assert!(rows[0].starts_with("row000"));
    }

    #[test]
    fn warning_prefix() {
        assert_eq!(Reply::warning("no matches").content_str(), ":warning: no matches");
    }
}
