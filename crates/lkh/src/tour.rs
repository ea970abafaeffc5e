//! TSPLIB tour-file parser/writer.
//!
//! LKH writes its best tour here. A `TOUR_SECTION` may hold several tours,
//! each closed by `-1`; the solver output for routing problems holds exactly
//! one, with depot copies encoded as ids above the problem's `DIMENSION`.

use std::{
    fmt::{Display, Formatter},
    fs,
    path::Path,
};

use crate::{LkhError, LkhResult, spec_writer::SpecWriter};
use lkh_derive::{LkhKeyword, WithMethods};

const TOUR_SECTION_HEADER: &str = "TOUR_SECTION";
const TOUR_END_MARKER: &str = "-1";
const EOF_MARKER: &str = "EOF";
const MIN_VALID_TSPLIB_NODE_ID: isize = 1;

/// TSPLIB `.tour` `TYPE` values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, LkhKeyword)]
pub enum TsplibTourType {
    Tour,
}

/// TSPLIB `.tour` file model.
#[derive(Clone, Debug, Default, PartialEq, WithMethods)]
pub struct TsplibTour {
    pub name: Option<String>,
    pub comment_lines: Vec<String>,
    pub tour_type: Option<TsplibTourType>,
    pub dimension: Option<usize>,
    /// Known optimum (`OPTIMUM`); LKH reports the tour cost here.
    pub optimum: Option<f64>,
    /// Node ids exactly as stored in TSPLIB (1-based), one entry per tour.
    pub tours: Vec<Vec<usize>>,
    pub emit_eof: bool,
}

impl TsplibTour {
    /// Creates an empty tour model.
    pub fn new() -> Self {
        Self {
            emit_eof: true,
            ..Default::default()
        }
    }

    /// Reads and parses a TSPLIB/LKH tour file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> LkhResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_text(&text)
    }

    /// Parses a TSPLIB/LKH tour from text content.
    pub fn from_text(text: &str) -> LkhResult<Self> {
        Self::parse(text)
    }

    /// The first tour in `TOUR_SECTION`, the one LKH reports as its best.
    pub fn first_tour(&self) -> Option<&[usize]> {
        self.tours.first().map(Vec::as_slice)
    }

    /// Serializes and writes this tour to disk.
    pub fn write_to_file(&self, path: &Path) -> LkhResult<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }

    fn parse(text: &str) -> LkhResult<Self> {
        let mut tour = Self::new();
        tour.emit_eof = false;
        let mut in_tour_section = false;
        let mut current: Vec<usize> = Vec::new();

        'lines: for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if line.eq_ignore_ascii_case(EOF_MARKER) {
                tour.emit_eof = true;
                break;
            }

            if !in_tour_section {
                if line.eq_ignore_ascii_case(TOUR_SECTION_HEADER) {
                    in_tour_section = true;
                    continue;
                }

                if let Some((key, value)) = line
                    .split_once(':')
                    .or_else(|| line.split_once('='))
                    .map(|(key, value)| (key.trim().to_ascii_uppercase(), value.trim()))
                {
                    match key.as_str() {
                        "NAME" => tour.name = Some(value.to_string()),
                        "COMMENT" => tour.comment_lines.push(value.to_string()),
                        "TYPE" => {
                            tour.tour_type = Some(value.parse().map_err(|_| {
                                LkhError::invalid_data(format!("Unsupported tour TYPE '{value}'"))
                            })?);
                        }
                        "DIMENSION" => {
                            let parsed = value.parse::<usize>().map_err(|e| {
                                LkhError::invalid_data(format!(
                                    "Bad DIMENSION value '{value}': {e}"
                                ))
                            })?;
                            tour.dimension = Some(parsed);
                        }
                        "OPTIMUM" => {
                            let parsed = value.parse::<f64>().map_err(|e| {
                                LkhError::invalid_data(format!("Bad OPTIMUM value '{value}': {e}"))
                            })?;
                            tour.optimum = Some(parsed);
                        }
                        _ => {}
                    }
                }

                continue;
            }

            for token in line.split_whitespace() {
                if token.eq_ignore_ascii_case(EOF_MARKER) {
                    tour.emit_eof = true;
                    break 'lines;
                }
                if token == TOUR_END_MARKER {
                    tour.tours.push(std::mem::take(&mut current));
                    continue;
                }

                let id: isize = token.parse().map_err(|e| {
                    LkhError::invalid_data(format!("Bad tour token '{token}': {e}"))
                })?;

                // Permissive: non-positive ids other than the terminator are skipped.
                if id < MIN_VALID_TSPLIB_NODE_ID {
                    continue;
                }
                current.push(id as usize);
            }
        }

        // Tolerate a final tour whose `-1` terminator was never written.
        if !current.is_empty() {
            tour.tours.push(current);
        }

        if !in_tour_section {
            return Err(LkhError::invalid_data("Missing TOUR_SECTION"));
        }

        tour.tours.retain(|t| !t.is_empty());
        if tour.tours.is_empty() {
            return Err(LkhError::invalid_data("TOUR_SECTION holds no node ids"));
        }

        if let (Some(dimension), Some(first)) = (tour.dimension, tour.tours.first())
            && dimension != first.len()
        {
            return Err(LkhError::invalid_data(format!(
                "DIMENSION is {dimension}, but the first tour has {} nodes",
                first.len()
            )));
        }

        Ok(tour)
    }
}

impl Display for TsplibTour {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut writer = SpecWriter::new(f);

        writer.opt_kv_colon("NAME", self.name.as_deref())?;
        writer.opt_kv_colon("TYPE", self.tour_type)?;

        for comment in &self.comment_lines {
            writer.kv_colon("COMMENT", comment)?;
        }

        writer.opt_kv_colon("DIMENSION", self.dimension)?;
        writer.opt_kv_colon("OPTIMUM", self.optimum)?;

        if !self.tours.is_empty() {
            writer.line(TOUR_SECTION_HEADER)?;
            for tour in &self.tours {
                for id in tour {
                    writer.line(id)?;
                }
                writer.line(TOUR_END_MARKER)?;
            }
        }

        if self.emit_eof {
            writer.line(EOF_MARKER)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        path::PathBuf,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::{TsplibTour, TsplibTourType};

    fn unique_temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("lkh-tests-{name}-{nanos}"))
    }

    #[test]
    fn from_file_reads_tour_section() {
        let dir = unique_temp_dir("parse-ok");
        fs::create_dir_all(&dir).expect("create temp dir");

        let tour_path = dir.join("run.tour");
        fs::write(
            &tour_path,
            "NAME : test\nTYPE : TOUR\nDIMENSION : 3\nTOUR_SECTION\n2\n1\n3\n-1\nEOF\n",
        )
        .expect("write tour file");

        let tour = TsplibTour::from_file(&tour_path).expect("parse tsplib tour");
        assert_eq!(tour.first_tour(), Some([2, 1, 3].as_slice()));

        fs::remove_dir_all(&dir).expect("cleanup temp dir");
    }

    #[test]
    fn parse_reads_headers_from_lkh3_cvrp_output() {
        let text = r#"
NAME : problem.111984.tour
COMMENT : Length = 111984
COMMENT : Found by LKH-3 [Keld Helsgaun] Sun Feb  8 16:58:45 2026
TYPE : TOUR
DIMENSION : 7
TOUR_SECTION
1
3
6
2
7
4
5
-1
EOF
"#;

        let tour = TsplibTour::from_text(text).expect("parse tour");
        assert_eq!(tour.name.as_deref(), Some("problem.111984.tour"));
        assert_eq!(tour.comment_lines.len(), 2);
        assert_eq!(tour.tour_type, Some(TsplibTourType::Tour));
        assert_eq!(tour.dimension, Some(7));
        assert_eq!(tour.tours, vec![vec![1, 3, 6, 2, 7, 4, 5]]);
        assert!(tour.emit_eof);
    }

    #[test]
    fn parse_collects_every_terminated_tour() {
        let text = "TOUR_SECTION\n1 2 3 -1\n3 2 1 -1\n-1\nEOF\n";
        let tour = TsplibTour::from_text(text).expect("parse tour");
        assert_eq!(tour.tours, vec![vec![1, 2, 3], vec![3, 2, 1]]);
    }

    #[test]
    fn parse_is_permissive_about_missing_terminator_and_bad_ids() {
        let tour = TsplibTour::from_text("TOUR_SECTION\n0\n-5\n2\n1\n").expect("parse tour");
        assert_eq!(tour.tours, vec![vec![2, 1]]);
        assert!(!tour.emit_eof);
    }

    #[test]
    fn parse_rejects_missing_or_empty_tour_section() {
        assert!(TsplibTour::from_text("NAME : x\nEOF\n").is_err());
        assert!(TsplibTour::from_text("TOUR_SECTION\n-1\nEOF\n").is_err());
        assert!(TsplibTour::from_text("TYPE : TSP\nTOUR_SECTION\n1\n-1\n").is_err());
    }

    #[test]
    fn parse_rejects_dimension_mismatch() {
        let err = TsplibTour::from_text("DIMENSION : 4\nTOUR_SECTION\n1\n2\n-1\n")
            .expect_err("mismatch should fail");
        assert!(err.to_string().contains("DIMENSION is 4"));
    }

    #[test]
    fn display_writes_tsplib_tour_format() {
        let tour = TsplibTour::new()
            .with_name("sample.tour")
            .with_comment_lines(["Length = 42"])
            .with_tour_type(TsplibTourType::Tour)
            .with_dimension(3_usize)
            .with_optimum(42.0)
            .with_tours(vec![vec![1_usize, 2, 3]]);

        let text = tour.to_string();

        assert!(text.contains("NAME: sample.tour"));
        assert!(text.contains("TYPE: TOUR"));
        assert!(text.contains("COMMENT: Length = 42"));
        assert!(text.contains("DIMENSION: 3"));
        assert!(text.contains("OPTIMUM: 42"));
        assert!(text.contains("TOUR_SECTION\n1\n2\n3\n-1\n"));
        assert!(text.ends_with("EOF\n"));
        assert_eq!(TsplibTour::from_text(&text).expect("reparse"), tour);
    }
}
