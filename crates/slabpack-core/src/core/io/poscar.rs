use super::error::{ParseErrorKind, StructureFileError, parse_float, parse_int};
use super::MAX_HEADER_RESERVATION;
use super::traits::StructureFile;
use crate::core::models::lattice::Lattice;
use crate::core::models::structure::{AtomicStructure, Structure};
use nalgebra::{Point3, Vector3};
use std::io::{BufRead, Write};

/// VASP 5 POSCAR/CONTCAR files.
///
/// Element symbols are required on line 6. Structures are written in Cartesian
/// mode with species grouped in runs of consecutive identical symbols, so atom
/// order survives a round trip. POSCAR files are always read as fully periodic.
pub struct PoscarFile;

struct NumberedLines<I> {
    inner: I,
}

impl<I> NumberedLines<I>
where
    I: Iterator<Item = std::io::Result<(usize, String)>>,
{
    fn expect(&mut self, record: &str) -> Result<(usize, String), StructureFileError> {
        self.inner
            .next()
            .transpose()?
            .ok_or_else(|| StructureFileError::MissingRecord(record.to_string()))
    }
}

fn parse_vector(line: &str, line_num: usize) -> Result<Vector3<f64>, StructureFileError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(StructureFileError::Parse {
            line: line_num,
            kind: ParseErrorKind::TooFewColumns {
                expected: 3,
                found: tokens.len(),
            },
        });
    }
    Ok(Vector3::new(
        parse_float(tokens[0], line_num, 1)?,
        parse_float(tokens[1], line_num, 2)?,
        parse_float(tokens[2], line_num, 3)?,
    ))
}

/// Groups consecutive identical symbols into `(symbol, count)` runs.
fn species_runs(symbols: &[String]) -> Vec<(&str, usize)> {
    let mut runs: Vec<(&str, usize)> = Vec::new();
    for symbol in symbols {
        match runs.last_mut() {
            Some((last, count)) if *last == symbol.as_str() => *count += 1,
            _ => runs.push((symbol.as_str(), 1)),
        }
    }
    runs
}

impl StructureFile for PoscarFile {
    type Error = StructureFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let mut lines = NumberedLines {
            inner: reader
                .lines()
                .enumerate()
                .map(|(index, line)| line.map(|content| (index + 1, content))),
        };

        lines.expect("comment line")?;

        let (scale_line_num, scale_line) = lines.expect("scale factor")?;
        let scale = parse_float(scale_line.trim(), scale_line_num, 1)?;
        if scale <= 0.0 {
            return Err(StructureFileError::Parse {
                line: scale_line_num,
                kind: ParseErrorKind::UnsupportedScale(scale),
            });
        }

        let mut vectors = [Vector3::zeros(); 3];
        for vector in &mut vectors {
            let (line_num, line) = lines.expect("lattice vector")?;
            *vector = parse_vector(&line, line_num)? * scale;
        }
        let lattice = Lattice::from_vectors(vectors[0], vectors[1], vectors[2]);

        let (_, species_line) = lines.expect("element symbols")?;
        let species: Vec<String> = species_line
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if species
            .first()
            .is_none_or(|s| !s.chars().next().is_some_and(char::is_alphabetic))
        {
            return Err(StructureFileError::MissingRecord(
                "element symbols on line 6 (VASP 4 files are not supported)".into(),
            ));
        }

        let (counts_line_num, counts_line) = lines.expect("species counts")?;
        let counts = counts_line
            .split_whitespace()
            .map(|token| parse_int(token, counts_line_num))
            .collect::<Result<Vec<_>, _>>()?;
        if counts.len() != species.len() {
            return Err(StructureFileError::Inconsistency(format!(
                "{} element symbols but {} species counts",
                species.len(),
                counts.len()
            )));
        }

        let (_, mut mode_line) = lines.expect("coordinate mode")?;
        if mode_line.trim_start().starts_with(['S', 's']) {
            mode_line = lines.expect("coordinate mode")?.1;
        }
        let is_direct = mode_line.trim_start().starts_with(['D', 'd']);

        let total = counts
            .iter()
            .try_fold(0usize, |sum, &count| sum.checked_add(count))
            .ok_or_else(|| {
                StructureFileError::Inconsistency(format!(
                    "species counts on line {} overflow the total atom count",
                    counts_line_num
                ))
            })?;
        let mut structure =
            Structure::with_capacity(lattice, [true; 3], total.min(MAX_HEADER_RESERVATION));
        for (symbol, &count) in species.iter().zip(&counts) {
            for _ in 0..count {
                let (line_num, line) = lines.expect("atomic position")?;
                let coordinates = parse_vector(&line, line_num)?;
                let position = if is_direct {
                    lattice.to_cartesian(&coordinates)
                } else {
                    Point3::from(coordinates * scale)
                };
                structure.push(symbol.as_str(), position);
            }
        }

        Ok(structure)
    }

    fn write_to(
        structure: &impl AtomicStructure,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let runs = species_runs(structure.symbols());
        let comment: String = runs
            .iter()
            .map(|(symbol, count)| format!("{}{}", symbol, count))
            .collect();
        writeln!(writer, "{}", comment)?;
        writeln!(writer, "1.0")?;

        for i in 0..3 {
            let v = structure.lattice().vector(i);
            writeln!(writer, " {:16.10} {:16.10} {:16.10}", v.x, v.y, v.z)?;
        }
        for (symbol, _) in &runs {
            write!(writer, " {:>4}", symbol)?;
        }
        writeln!(writer)?;
        for (_, count) in &runs {
            write!(writer, " {:>4}", count)?;
        }
        writeln!(writer)?;

        writeln!(writer, "Cartesian")?;
        for position in structure.positions() {
            writeln!(
                writer,
                " {:16.10} {:16.10} {:16.10}",
                position.x, position.y, position.z
            )?;
        }
        Ok(())
    }
}
