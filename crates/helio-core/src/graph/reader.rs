//! Tab-separated table reader for the entity and relationship files.
//!
//! Both tables have three leading columns and a header row. Rows that do
//! not carry all three are rejected and counted, never padded.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use super::error::GraphError;
use super::models::{Entity, Relationship};

/// Rows read from one table plus the number rejected as malformed.
#[derive(Debug, Clone, Default)]
pub struct TableRead<T> {
    pub rows: Vec<T>,
    pub rejected: usize,
}

/// Read `id, name, kind` rows.
pub fn read_entities(reader: impl BufRead) -> Result<TableRead<Entity>, GraphError> {
    read_table(reader, "entity", |[id, name, kind]| Entity::new(id, name, kind))
}

/// Read `source, metaedge, target` rows.
pub fn read_relationships(reader: impl BufRead) -> Result<TableRead<Relationship>, GraphError> {
    read_table(reader, "relationship", |[source, metaedge, target]| {
        Relationship::new(source, metaedge, target)
    })
}

/// Read the entity table at `path`.
pub fn read_entities_from_path(path: &Path) -> Result<TableRead<Entity>, GraphError> {
    let file = File::open(path).map_err(|e| GraphError::io(path, e))?;
    read_entities(BufReader::new(file)).map_err(|e| attach_path(e, path))
}

/// Read the relationship table at `path`.
pub fn read_relationships_from_path(path: &Path) -> Result<TableRead<Relationship>, GraphError> {
    let file = File::open(path).map_err(|e| GraphError::io(path, e))?;
    read_relationships(BufReader::new(file)).map_err(|e| attach_path(e, path))
}

fn attach_path(err: GraphError, path: &Path) -> GraphError {
    match err {
        GraphError::Io { source, .. } => GraphError::io(path, source),
        other => other,
    }
}

fn read_table<T>(
    reader: impl BufRead,
    table: &str,
    build: impl Fn([&str; 3]) -> T,
) -> Result<TableRead<T>, GraphError> {
    let mut read = TableRead {
        rows: Vec::new(),
        rejected: 0,
    };

    // Line 1 is the header
    for (index, raw) in reader.split(b'\n').enumerate().skip(1) {
        let raw = raw.map_err(|e| GraphError::io(format!("<{} table>", table), e))?;
        let row = index + 1;
        let line = match String::from_utf8(raw) {
            Ok(line) => line,
            Err(_) => {
                warn!(table, row, "rejecting row that is not valid UTF-8");
                read.rejected += 1;
                continue;
            }
        };
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        match split_row(line) {
            Some(columns) => read.rows.push(build(columns)),
            None => {
                warn!(table, row, "rejecting malformed row: {:?}", line);
                read.rejected += 1;
            }
        }
    }

    Ok(read)
}

/// First three columns, none blank. Values are kept as written.
fn split_row(line: &str) -> Option<[&str; 3]> {
    let mut columns = line.split('\t');
    let mut next = || columns.next().filter(|c| !c.trim().is_empty());
    Some([next()?, next()?, next()?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Category;

    #[test]
    fn test_reads_entities_skipping_header() {
        let table = "id\tname\tkind\nDisease::D1\tAsthma\tDisease\nCompound::C1\tAlbuterol\tCompound\n";
        let read = read_entities(table.as_bytes()).unwrap();

        assert_eq!(read.rejected, 0);
        assert_eq!(read.rows.len(), 2);
        assert_eq!(read.rows[0].entity_id, "Disease::D1");
        assert_eq!(read.rows[1].kind, Category::Compound);
    }

    #[test]
    fn test_rejects_short_and_empty_rows() {
        let table = "source\tmetaedge\ttarget\nC1\tCtD\tD1\nC2\tCtD\n\nC3\t\tD1\r\nD1\tDaG\tG1\textra\n";
        let read = read_relationships(table.as_bytes()).unwrap();

        assert_eq!(read.rejected, 2);
        assert_eq!(
            read.rows,
            vec![
                Relationship::new("C1", "CtD", "D1"),
                Relationship::new("D1", "DaG", "G1"),
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_row_rejected_alone() {
        let table = b"source\tmetaedge\ttarget\nC1\tCtD\tD1\nC2\tCtD\tD\xff1\nD1\tDaG\tG1\n";
        let read = read_relationships(&table[..]).unwrap();

        assert_eq!(read.rejected, 1);
        assert_eq!(
            read.rows,
            vec![
                Relationship::new("C1", "CtD", "D1"),
                Relationship::new("D1", "DaG", "G1"),
            ]
        );
    }

    #[test]
    fn test_names_keep_surrounding_spaces() {
        let table = "id\tname\tkind\nA1\t lung \tAnatomy\nA2\t  \tAnatomy\n";
        let read = read_entities(table.as_bytes()).unwrap();

        assert_eq!(read.rejected, 1);
        assert_eq!(read.rows[0].name, " lung ");
    }

    #[test]
    fn test_read_failure_names_table() {
        struct Broken;
        impl std::io::Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"))
            }
        }

        let err = read_entities(BufReader::new(Broken)).unwrap_err();
        assert!(err.to_string().contains("<entity table>"));
    }

    #[test]
    fn test_header_only_table() {
        let read = read_entities("id\tname\tkind\n".as_bytes()).unwrap();
        assert!(read.rows.is_empty());
        assert_eq!(read.rejected, 0);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_entities_from_path(Path::new("/nonexistent/nodes.tsv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/nodes.tsv"));
    }
}
