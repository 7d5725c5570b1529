use super::error::{ParseErrorKind, StructureFileError, parse_float, parse_int};
use super::MAX_HEADER_RESERVATION;
use super::traits::StructureFile;
use crate::core::models::lattice::Lattice;
use crate::core::models::structure::{AtomicStructure, Structure};
use nalgebra::{Point3, Vector3};
use std::io::{BufRead, Write};

const PROPERTIES: &str = "Properties=species:S:1:pos:R:3";

/// Extended XYZ: a plain XYZ file whose comment line carries `Lattice="..."` and
/// `pbc="..."` key/value pairs. Files without these keys are read as non-periodic.
pub struct ExtXyzFile;

/// Returns the value of a `key="value"` pair on the comment line.
fn quoted_value<'a>(comment: &'a str, key: &str) -> Option<&'a str> {
    let pattern = format!("{}=\"", key);
    let start = comment.find(&pattern)? + pattern.len();
    let remainder = &comment[start..];
    let end = remainder.find('"')?;
    Some(&remainder[..end])
}

fn parse_lattice(value: &str, line: usize) -> Result<Lattice, StructureFileError> {
    let invalid = || StructureFileError::Parse {
        line,
        kind: ParseErrorKind::InvalidLattice(value.to_string()),
    };
    let numbers = value
        .split_whitespace()
        .map(|token| token.parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    if numbers.len() != 9 {
        return Err(invalid());
    }
    Ok(Lattice::from_vectors(
        Vector3::new(numbers[0], numbers[1], numbers[2]),
        Vector3::new(numbers[3], numbers[4], numbers[5]),
        Vector3::new(numbers[6], numbers[7], numbers[8]),
    ))
}

fn parse_pbc(value: &str, line: usize) -> Result<[bool; 3], StructureFileError> {
    let invalid = || StructureFileError::Parse {
        line,
        kind: ParseErrorKind::InvalidPbc(value.to_string()),
    };
    let flags = value
        .split_whitespace()
        .map(|token| match token {
            "T" | "True" | "true" | "1" => Ok(true),
            "F" | "False" | "false" | "0" => Ok(false),
            _ => Err(invalid()),
        })
        .collect::<Result<Vec<_>, _>>()?;
    flags.try_into().map_err(|_| invalid())
}

fn format_pbc(pbc: [bool; 3]) -> String {
    pbc.iter()
        .map(|&p| if p { "T" } else { "F" })
        .collect::<Vec<_>>()
        .join(" ")
}

impl StructureFile for ExtXyzFile {
    type Error = StructureFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let mut lines = reader
            .lines()
            .enumerate()
            .map(|(index, line)| line.map(|content| (index + 1, content)));

        let (count_line_num, count_line) = lines
            .next()
            .transpose()?
            .ok_or_else(|| StructureFileError::MissingRecord("atom count line".into()))?;
        let count = parse_int(count_line.trim(), count_line_num)?;

        let (comment_line_num, comment) = lines
            .next()
            .transpose()?
            .ok_or_else(|| StructureFileError::MissingRecord("comment line".into()))?;

        let lattice = quoted_value(&comment, "Lattice")
            .map(|value| parse_lattice(value, comment_line_num))
            .transpose()?;
        let pbc = match quoted_value(&comment, "pbc") {
            Some(value) => parse_pbc(value, comment_line_num)?,
            None => [lattice.is_some(); 3],
        };

        let mut structure = Structure::with_capacity(
            lattice.unwrap_or_default(),
            pbc,
            count.min(MAX_HEADER_RESERVATION),
        );
        for read in 0..count {
            let (line_num, line) = lines.next().transpose()?.ok_or_else(|| {
                StructureFileError::MissingRecord(format!(
                    "expected {} atom lines, found {}",
                    count, read
                ))
            })?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 4 {
                return Err(StructureFileError::Parse {
                    line: line_num,
                    kind: ParseErrorKind::TooFewColumns {
                        expected: 4,
                        found: tokens.len(),
                    },
                });
            }
            let x = parse_float(tokens[1], line_num, 2)?;
            let y = parse_float(tokens[2], line_num, 3)?;
            let z = parse_float(tokens[3], line_num, 4)?;
            structure.push(tokens[0], Point3::new(x, y, z));
        }

        Ok(structure)
    }

    fn write_to(
        structure: &impl AtomicStructure,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", structure.len())?;

        let lattice = structure.lattice();
        if *lattice != Lattice::default() {
            let m = lattice.matrix();
            write!(writer, "Lattice=\"")?;
            for row in 0..3 {
                for col in 0..3 {
                    let separator = if row == 0 && col == 0 { "" } else { " " };
                    write!(writer, "{}{:.8}", separator, m[(row, col)])?;
                }
            }
            write!(writer, "\" ")?;
        }
        writeln!(
            writer,
            "{} pbc=\"{}\"",
            PROPERTIES,
            format_pbc(structure.pbc())
        )?;

        for (symbol, position) in structure.symbols().iter().zip(structure.positions()) {
            writeln!(
                writer,
                "{:<2} {:>16.8} {:>16.8} {:>16.8}",
                symbol, position.x, position.y, position.z
            )?;
        }
        Ok(())
    }
}
