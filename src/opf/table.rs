/*! `db` tables

The `db` member of an OPF archive holds a single column of cells:
```text
#4
labeled_object (MATRIX,true,)-ordinal|NOMINAL,onset|NOMINAL,object|NOMINAL
00:00:01:000,00:00:02:000,(1,0,ball)
```
The second line defines the fields (`<column>-<name>|<type>,...`), then each line is a
cell: onset, offset and the parenthesized field values. Commas inside values are
escaped with a backslash.
!*/
use std::path::Path;

use crate::error::Error;

/// Names of the two leading fields, holding the cell's onset and offset.
pub const TIME_FIELDS: [&str; 2] = ["time_start", "time_end"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbTable {
    prefix: String,
    column_definitions: String,
    field_names: Vec<String>,
    rows: Vec<Vec<String>>,
    /// number of values each row had before padding, times included
    widths: Vec<usize>,
}

/// Split on commas that are not escaped by a backslash. Escapes are kept.
fn split_unescaped(values: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for c in values.chars() {
        if c == ',' && !escaped {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
        escaped = c == '\\';
    }
    fields.push(current);
    fields
}

impl DbTable {
    pub fn parse(db: &str) -> Result<Self, Error> {
        let mut lines = db.trim_end().split('\n');
        let prefix = lines
            .next()
            .filter(|line| !line.is_empty())
            .ok_or_else(|| Error::Custom("empty db".to_string()))?;
        let column_definitions = lines
            .next()
            .ok_or_else(|| Error::Custom("db has no column definition line".to_string()))?;

        let (_, field_definitions) = column_definitions.split_once('-').ok_or_else(|| {
            Error::Custom(format!(
                "malformed column definition: {:?}",
                column_definitions
            ))
        })?;

        let field_names: Vec<String> = TIME_FIELDS
            .iter()
            .map(|name| name.to_string())
            .chain(field_definitions.split(',').map(|definition| {
                definition
                    .split('|')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            }))
            .collect();

        let (rows, widths): (Vec<Vec<String>>, Vec<usize>) = lines
            .filter(|line| !line.is_empty())
            .map(|line| {
                let mut parts = line.splitn(3, ',');
                let mut values: Vec<String> = Vec::with_capacity(field_names.len());
                values.push(parts.next().unwrap_or_default().to_string());
                values.push(parts.next().unwrap_or_default().to_string());
                if let Some(rest) = parts.next() {
                    values.extend(split_unescaped(
                        rest.trim_matches(&['(', ')'][..]),
                    ));
                }
                let width = values.len();
                // rows missing commas are padded
                if values.len() < field_names.len() {
                    values.resize(field_names.len(), String::new());
                }
                (values, width)
            })
            .unzip();

        Ok(Self {
            prefix: prefix.to_string(),
            column_definitions: column_definitions.to_string(),
            field_names,
            rows,
            widths,
        })
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Value of `field` in every row.
    pub fn column(&self, field: &str) -> Option<Vec<&str>> {
        let idx = self.field_names.iter().position(|name| name == field)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map_or("", String::as_str))
                .collect(),
        )
    }

    /// Back to the `db` text format. Padded rows get their original number of values back.
    pub fn to_db_text(&self) -> String {
        let mut text = format!("{}\n{}\n", self.prefix, self.column_definitions);
        for (row, width) in self.rows.iter().zip(&self.widths) {
            let row = &row[..(*width).min(row.len())];
            let (times, values) = row.split_at(row.len().min(2));
            text.push_str(&times.join(","));
            text.push_str(&format!(",({})\n", values.join(",")));
        }
        text
    }

    /// Export as a csv file with a header row.
    pub fn write_csv<P: AsRef<Path>>(&self, dst: P) -> Result<(), Error> {
        let mut out = csv::WriterBuilder::new().from_path(dst)?;
        out.write_record(&self.field_names)?;
        for row in &self.rows {
            out.write_record(row)?;
        }
        out.flush()?;
        Ok(())
    }
}
