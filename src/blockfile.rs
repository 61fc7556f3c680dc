//! User-supplied block definitions
//!
//! Instead of asking a partitioning oracle, the caller may say which rows
//! form which block. Three whitespace-separated text layouts are understood:
//!
//! - `List`: `<block id> <row count>` followed by that many row ids, repeated
//! - `Pair`: `<block id> <row id>` pairs
//! - `PairName`: `<block id> <row name>` pairs, resolved through the row names
//!   of the matrix
//!
//! An optional permutation (`<old row id> <new row id>` pairs) remaps row ids
//! before they are used.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use crate::error::{DecompError, DecompResult};

/// Layout of a block definition text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockFileFormat {
    List,
    Pair,
    PairName,
}

impl FromStr for BlockFileFormat {
    type Err = DecompError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "list" => Ok(BlockFileFormat::List),
            "pair" => Ok(BlockFileFormat::Pair),
            "pairname" => Ok(BlockFileFormat::PairName),
            _ => Err(DecompError::InvalidConfig(format!(
                "block file format {} is not one of List, Pair, PairName",
                s
            ))),
        }
    }
}

/// Whitespace tokens tagged with their 1-based line number
fn tokens(text: &str) -> Vec<(usize, &str)> {
    text.lines()
        .enumerate()
        .flat_map(|(i, line)| line.split_whitespace().map(move |tok| (i + 1, tok)))
        .collect()
}

fn parse_num<T: FromStr>(line: usize, token: &str, what: &str) -> DecompResult<T> {
    token.parse().map_err(|_| DecompError::InvalidBlockFile {
        line,
        message: format!("expected {}, found {:?}", what, token),
    })
}

/// Reads `<old> <new>` row id pairs
pub fn parse_permutation(text: &str) -> DecompResult<HashMap<usize, usize>> {
    let toks = tokens(text);
    let mut permutation = HashMap::new();
    for pair in toks.chunks(2) {
        match *pair {
            [(line, old), (_, new)] => {
                let old: usize = parse_num(line, old, "row id")?;
                let new: usize = parse_num(line, new, "row id")?;
                permutation.insert(old, new);
            }
            [(line, tok)] => {
                return Err(DecompError::InvalidBlockFile {
                    line,
                    message: format!("row id {:?} has no replacement", tok),
                })
            }
            _ => unreachable!("chunks(2) yields one or two tokens"),
        }
    }
    Ok(permutation)
}

/// Rows per user block label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockDefinition {
    blocks: BTreeMap<i64, Vec<usize>>,
}

impl BlockDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(blocks: BTreeMap<i64, Vec<usize>>) -> Self {
        Self { blocks }
    }

    /// Adds `row` to block `label`
    pub fn insert(&mut self, label: i64, row: usize) {
        self.blocks.entry(label).or_default().push(row);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Parses a definition in `format`
    ///
    /// `row_names` is required for `PairName`; names it does not contain are
    /// skipped with a warning. In `List` files a block id that appears again
    /// keeps its first section, so rows only listed later go to the core.
    pub fn parse(
        text: &str,
        format: BlockFileFormat,
        row_names: Option<&[String]>,
    ) -> DecompResult<Self> {
        let toks = tokens(text);
        let mut def = Self::new();

        match format {
            BlockFileFormat::List => {
                let mut it = toks.into_iter();
                // line of the last token consumed, for truncation errors
                let mut last_line;
                while let Some((line, tok)) = it.next() {
                    last_line = line;
                    let label: i64 = parse_num(line, tok, "block id")?;
                    let (line, tok) = it.next().ok_or(DecompError::InvalidBlockFile {
                        line: last_line,
                        message: format!("block {} has no row count", label),
                    })?;
                    last_line = line;
                    let count: usize = parse_num(line, tok, "row count")?;
                    // a repeated label keeps its first section
                    let repeated = def.blocks.contains_key(&label);
                    if repeated {
                        tracing::warn!(
                            component = "blockfile",
                            operation = "parse",
                            status = "warning",
                            line,
                            block = label,
                            "Block {} is listed again; the later section is ignored",
                            label
                        );
                    }
                    let mut rows = Vec::new();
                    for _ in 0..count {
                        let (line, tok) = it.next().ok_or(DecompError::InvalidBlockFile {
                            line: last_line,
                            message: format!("block {} lists fewer than {} rows", label, count),
                        })?;
                        last_line = line;
                        rows.push(parse_num(line, tok, "row id")?);
                    }
                    if !repeated {
                        def.blocks.insert(label, rows);
                    }
                }
            }
            BlockFileFormat::Pair => {
                for pair in toks.chunks(2) {
                    match *pair {
                        [(line, label), (_, row)] => {
                            let label = parse_num(line, label, "block id")?;
                            def.insert(label, parse_num(line, row, "row id")?);
                        }
                        [(line, tok)] => {
                            return Err(DecompError::InvalidBlockFile {
                                line,
                                message: format!("block id {:?} has no row", tok),
                            })
                        }
                        _ => unreachable!("chunks(2) yields one or two tokens"),
                    }
                }
            }
            BlockFileFormat::PairName => {
                let names = row_names.ok_or_else(|| {
                    DecompError::InvalidConfig("PairName block files need row names".to_string())
                })?;
                let lookup: HashMap<&str, usize> = names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name.as_str(), i))
                    .collect();

                for pair in toks.chunks(2) {
                    match *pair {
                        [(line, label), (_, name)] => {
                            let label = parse_num(line, label, "block id")?;
                            match lookup.get(name) {
                                Some(&row) => def.insert(label, row),
                                None => tracing::warn!(
                                    component = "blockfile",
                                    operation = "parse",
                                    status = "warning",
                                    line,
                                    row_name = name,
                                    "Row name {} in block file is not in the matrix",
                                    name
                                ),
                            }
                        }
                        [(line, tok)] => {
                            return Err(DecompError::InvalidBlockFile {
                                line,
                                message: format!("block id {:?} has no row name", tok),
                            })
                        }
                        _ => unreachable!("chunks(2) yields one or two tokens"),
                    }
                }
            }
        }

        Ok(def)
    }

    /// Replaces every row id that appears in `permutation`
    pub fn apply_permutation(&mut self, permutation: &HashMap<usize, usize>) {
        for rows in self.blocks.values_mut() {
            for row in rows.iter_mut() {
                if let Some(&new) = permutation.get(row) {
                    *row = new;
                }
            }
        }
    }

    /// Validates against a matrix of `n_rows` rows and returns the non-empty
    /// blocks in ascending label order, rows sorted
    ///
    /// # Errors
    ///
    /// `Structure` if a row is out of range or claimed twice.
    pub fn resolve(&self, n_rows: usize) -> DecompResult<Vec<(i64, Vec<usize>)>> {
        let mut owner: Vec<Option<i64>> = vec![None; n_rows];
        let mut resolved = Vec::with_capacity(self.blocks.len());

        for (&label, rows) in &self.blocks {
            for &row in rows {
                if row >= n_rows {
                    return Err(DecompError::Structure(format!(
                        "block {} lists row {} but the matrix has {} rows",
                        label, row, n_rows
                    )));
                }
                if let Some(previous) = owner[row].replace(label) {
                    return Err(DecompError::Structure(format!(
                        "row {} is listed in block {} and block {}",
                        row, previous, label
                    )));
                }
            }
            if rows.is_empty() {
                continue;
            }
            let mut rows = rows.clone();
            rows.sort_unstable();
            resolved.push((label, rows));
        }

        Ok(resolved)
    }
}
