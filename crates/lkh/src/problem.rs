//! TSPLIB problem-file model with a writer and a permissive reader.
//!
//! The headers and sections LKH-3 needs for decoding routes are modeled as
//! typed fields. Anything else, such as `SERVICE_TIME` or
//! `TIME_WINDOW_SECTION`, is kept verbatim and written back unchanged.

use std::{
    collections::HashSet,
    fmt::{Display, Formatter},
    fs,
    path::Path,
    str::FromStr,
};

use crate::{LkhError, LkhResult, spec_writer::SpecWriter};
use lkh_derive::{LkhKeyword, WithMethods};

const EUC2D_SCALE: f64 = 1_000.0;
const TSPLIB_NODE_ID_BASE: usize = 1;
const SECTION_END_MARKER: &str = "-1";
const EOF_MARKER: &str = "EOF";

/// TSPLIB / LKH-3 `TYPE` values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, LkhKeyword)]
pub enum TsplibProblemType {
    Tsp,
    Atsp,
    Sop,
    Hcp,
    Cvrp,
    Acvrp,
    Dcvrp,
    Cvrptw,
    Ovrp,
    Vrpb,
    #[lkh("mTSP")]
    Mtsp,
    Tour,
}

/// TSPLIB `EDGE_WEIGHT_TYPE` values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, LkhKeyword)]
#[lkh(separator = "_")]
pub enum EdgeWeightType {
    Explicit,
    #[lkh("EUC_2D")]
    Euc2d,
    #[lkh("EUC_3D")]
    Euc3d,
    #[lkh("MAX_2D")]
    Max2d,
    #[lkh("MAN_2D")]
    Man2d,
    #[lkh("CEIL_2D")]
    Ceil2d,
    Geo,
    Att,
    Special,
}

/// TSPLIB `EDGE_WEIGHT_FORMAT` values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, LkhKeyword)]
#[lkh(separator = "_")]
pub enum EdgeWeightFormat {
    Function,
    FullMatrix,
    UpperRow,
    LowerRow,
    UpperDiagRow,
    LowerDiagRow,
}

/// TSPLIB `NODE_COORD_TYPE` values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, LkhKeyword)]
#[lkh(separator = "_")]
pub enum NodeCoordType {
    TwodCoords,
    ThreedCoords,
    NoCoords,
}

/// Entry in `NODE_COORD_SECTION`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeCoord {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl NodeCoord {
    pub const fn twod(id: usize, x: f64, y: f64) -> Self {
        Self { id, x, y, z: None }
    }

    pub const fn threed(id: usize, x: f64, y: f64, z: f64) -> Self {
        Self {
            id,
            x,
            y,
            z: Some(z),
        }
    }
}

impl Display for NodeCoord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.id, self.x, self.y)?;
        if let Some(z) = self.z {
            write!(f, " {z}")?;
        }
        Ok(())
    }
}

/// Entry in `DEMAND_SECTION`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DemandEntry {
    pub id: usize,
    pub demand: i64,
}

impl Display for DemandEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.id, self.demand)
    }
}

/// Entry in `FIXED_EDGES_SECTION`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FixedEdge {
    pub from: usize,
    pub to: usize,
}

impl Display for FixedEdge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.from, self.to)
    }
}

/// TSPLIB problem model used as LKH input.
#[derive(Clone, Debug, PartialEq, WithMethods)]
pub struct TsplibProblem {
    pub name: String,
    pub problem_type: TsplibProblemType,
    pub comment_lines: Vec<String>,
    /// Count of genuine nodes. Tour ids above this are solver dummies.
    pub dimension: Option<usize>,
    pub capacity: Option<i64>,
    pub vehicles: Option<usize>,
    pub edge_weight_type: Option<EdgeWeightType>,
    pub edge_weight_format: Option<EdgeWeightFormat>,
    pub node_coord_type: Option<NodeCoordType>,
    pub node_coord_section: Vec<NodeCoord>,
    pub demand_section: Vec<DemandEntry>,
    /// 1-based depot ids.
    pub depot_section: Vec<usize>,
    pub fixed_edges_section: Vec<FixedEdge>,
    pub edge_weight_section: Vec<Vec<i64>>,
    /// Header keys without a typed field, in file order.
    pub extra_keys: Vec<(String, String)>,
    /// Sections without a typed field: header plus raw data lines.
    pub extra_sections: Vec<(String, Vec<String>)>,
    pub emit_eof: bool,
}

impl TsplibProblem {
    pub fn new(name: impl Into<String>, problem_type: TsplibProblemType) -> Self {
        Self {
            name: name.into(),
            problem_type,
            comment_lines: Vec::new(),
            dimension: None,
            capacity: None,
            vehicles: None,
            edge_weight_type: None,
            edge_weight_format: None,
            node_coord_type: None,
            node_coord_section: Vec::new(),
            demand_section: Vec::new(),
            depot_section: Vec::new(),
            fixed_edges_section: Vec::new(),
            edge_weight_section: Vec::new(),
            extra_keys: Vec::new(),
            extra_sections: Vec::new(),
            emit_eof: true,
        }
    }

    /// Builds a `EUC_2D` problem, scaling coordinates by 1000 and rounding so
    /// LKH's integer distances keep three decimals of precision.
    pub fn from_euc2d_points<I>(
        name: impl Into<String>,
        problem_type: TsplibProblemType,
        points: I,
    ) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let node_coord_section: Vec<NodeCoord> = points
            .into_iter()
            .enumerate()
            .map(|(idx, (x, y))| {
                NodeCoord::twod(
                    idx + TSPLIB_NODE_ID_BASE,
                    (x * EUC2D_SCALE).round(),
                    (y * EUC2D_SCALE).round(),
                )
            })
            .collect();

        Self::new(name, problem_type)
            .with_dimension(node_coord_section.len())
            .with_edge_weight_type(EdgeWeightType::Euc2d)
            .with_node_coord_type(NodeCoordType::TwodCoords)
            .with_node_coord_section(node_coord_section)
    }

    /// Reads and parses a TSPLIB problem file.
    pub fn from_file(path: impl AsRef<Path>) -> LkhResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_text(&text)
    }

    /// Parses TSPLIB problem text.
    pub fn from_text(text: &str) -> LkhResult<Self> {
        ProblemParser::default().parse(text)
    }

    pub fn write_to_file(&self, path: &Path) -> LkhResult<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }

    pub fn depots(&self) -> &[usize] {
        &self.depot_section
    }

    /// Lists every way this problem breaks the shape LKH expects. An empty
    /// list means the problem is structurally sound.
    pub fn structural_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let dimension = match self.dimension {
            None => {
                issues.push("DIMENSION is missing".to_string());
                None
            }
            Some(0) => {
                issues.push("DIMENSION must be at least 1".to_string());
                None
            }
            Some(dimension) => Some(dimension),
        };

        let mut seen = HashSet::new();
        for &depot in &self.depot_section {
            if !seen.insert(depot) {
                issues.push(format!("depot {depot} is listed more than once"));
            }
            if let Some(dimension) = dimension
                && !(TSPLIB_NODE_ID_BASE..=dimension).contains(&depot)
            {
                issues.push(format!("depot {depot} is outside 1..={dimension}"));
            }
        }

        if let Some(dimension) = dimension {
            let sections = [
                ("NODE_COORD_SECTION", self.node_coord_section.len()),
                ("DEMAND_SECTION", self.demand_section.len()),
            ];
            for (section, len) in sections {
                if len > 0 && len != dimension {
                    issues.push(format!(
                        "{section} has {len} entries but DIMENSION is {dimension}"
                    ));
                }
            }
        }

        issues
    }
}

impl Display for TsplibProblem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut writer = SpecWriter::new(f);

        if !self.name.is_empty() {
            writer.kv_colon("NAME", &self.name)?;
        }
        writer.kv_colon("TYPE", self.problem_type)?;

        for comment in &self.comment_lines {
            writer.kv_colon("COMMENT", comment)?;
        }

        writer.opt_kv_colon("DIMENSION", self.dimension)?;
        writer.opt_kv_colon("CAPACITY", self.capacity)?;
        writer.opt_kv_colon("VEHICLES", self.vehicles)?;
        writer.opt_kv_colon("EDGE_WEIGHT_TYPE", self.edge_weight_type)?;
        writer.opt_kv_colon("EDGE_WEIGHT_FORMAT", self.edge_weight_format)?;
        writer.opt_kv_colon("NODE_COORD_TYPE", self.node_coord_type)?;
        for (key, value) in &self.extra_keys {
            if value.is_empty() {
                writer.line(key)?;
            } else {
                writer.kv_colon(key, value)?;
            }
        }
        writer.section("NODE_COORD_SECTION", &self.node_coord_section)?;
        writer.section("DEMAND_SECTION", &self.demand_section)?;

        if !self.depot_section.is_empty() {
            writer.section("DEPOT_SECTION", &self.depot_section)?;
            writer.line(SECTION_END_MARKER)?;
        }

        if !self.fixed_edges_section.is_empty() {
            writer.section("FIXED_EDGES_SECTION", &self.fixed_edges_section)?;
            writer.line(SECTION_END_MARKER)?;
        }

        if !self.edge_weight_section.is_empty() {
            writer.line("EDGE_WEIGHT_SECTION")?;
            for row in &self.edge_weight_section {
                writer.row(row)?;
            }
        }

        for (header, lines) in &self.extra_sections {
            writer.line(header)?;
            for line in lines {
                writer.line(line)?;
            }
        }

        if self.emit_eof {
            writer.line(EOF_MARKER)?;
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Section {
    NodeCoord,
    Demand,
    Depot,
    FixedEdges,
    EdgeWeight,
    /// Index into `extra_sections`.
    Extra(usize),
}

impl Section {
    fn from_header(header: &str) -> Option<Self> {
        let section = match header {
            "NODE_COORD_SECTION" => Self::NodeCoord,
            "DEMAND_SECTION" => Self::Demand,
            "DEPOT_SECTION" => Self::Depot,
            "FIXED_EDGES_SECTION" => Self::FixedEdges,
            "EDGE_WEIGHT_SECTION" => Self::EdgeWeight,
            _ => return None,
        };
        Some(section)
    }
}

#[derive(Default)]
struct ProblemParser {
    section: Option<Section>,
}

impl ProblemParser {
    fn parse(mut self, text: &str) -> LkhResult<TsplibProblem> {
        let mut problem = TsplibProblem::new(String::new(), TsplibProblemType::Tsp);
        problem.emit_eof = false;

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if line.eq_ignore_ascii_case(EOF_MARKER) {
                problem.emit_eof = true;
                break;
            }

            if line.starts_with(|c: char| c.is_ascii_alphabetic()) {
                self.keyword_line(&mut problem, line)?;
            } else {
                self.data_line(&mut problem, line)?;
            }
        }

        Ok(problem)
    }

    fn keyword_line(&mut self, problem: &mut TsplibProblem, line: &str) -> LkhResult<()> {
        let (key, value) = match line.split_once(':') {
            Some((key, value)) => (key.trim().to_ascii_uppercase(), value.trim()),
            None => (line.to_ascii_uppercase(), ""),
        };

        if let Some(section) = Section::from_header(&key) {
            self.section = Some(section);
            return Ok(());
        }
        if key.ends_with("_SECTION") {
            problem.extra_sections.push((key, Vec::new()));
            self.section = Some(Section::Extra(problem.extra_sections.len() - 1));
            return Ok(());
        }
        self.section = None;

        match key.as_str() {
            "NAME" => problem.name = value.to_string(),
            "COMMENT" => problem.comment_lines.push(value.to_string()),
            "TYPE" => problem.problem_type = parse_keyword(value)?,
            "DIMENSION" => problem.dimension = Some(parse_number(&key, value)?),
            "CAPACITY" => problem.capacity = Some(parse_number(&key, value)?),
            "VEHICLES" => problem.vehicles = Some(parse_number(&key, value)?),
            "EDGE_WEIGHT_TYPE" => problem.edge_weight_type = Some(parse_keyword(value)?),
            "EDGE_WEIGHT_FORMAT" => problem.edge_weight_format = Some(parse_keyword(value)?),
            "NODE_COORD_TYPE" => problem.node_coord_type = Some(parse_keyword(value)?),
            _ => {
                log::debug!("problem.parse: keeping unmodeled key={key}");
                problem.extra_keys.push((key.clone(), value.to_string()));
            }
        }

        Ok(())
    }

    fn data_line(&mut self, problem: &mut TsplibProblem, line: &str) -> LkhResult<()> {
        let Some(section) = self.section else {
            return Err(LkhError::invalid_data(format!(
                "Data line '{line}' outside of any section"
            )));
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        match section {
            Section::NodeCoord => {
                let id = parse_number("NODE_COORD_SECTION id", tokens[0])?;
                let coords = tokens[1..]
                    .iter()
                    .map(|token| parse_number::<f64>("NODE_COORD_SECTION coordinate", token))
                    .collect::<LkhResult<Vec<_>>>()?;
                let coord = match coords.as_slice() {
                    [x, y] => NodeCoord::twod(id, *x, *y),
                    [x, y, z] => NodeCoord::threed(id, *x, *y, *z),
                    _ => {
                        return Err(LkhError::invalid_data(format!(
                            "Bad NODE_COORD_SECTION line '{line}'"
                        )));
                    }
                };
                problem.node_coord_section.push(coord);
            }
            Section::Demand => {
                let [id, demand] = tokens.as_slice() else {
                    return Err(LkhError::invalid_data(format!(
                        "Bad DEMAND_SECTION line '{line}'"
                    )));
                };
                problem.demand_section.push(DemandEntry {
                    id: parse_number("DEMAND_SECTION id", id)?,
                    demand: parse_number("DEMAND_SECTION demand", demand)?,
                });
            }
            Section::Depot => {
                for token in tokens {
                    if token == SECTION_END_MARKER {
                        self.section = None;
                        break;
                    }
                    problem
                        .depot_section
                        .push(parse_number("DEPOT_SECTION id", token)?);
                }
            }
            Section::FixedEdges => {
                if tokens[0] == SECTION_END_MARKER {
                    self.section = None;
                    return Ok(());
                }
                let [from, to] = tokens.as_slice() else {
                    return Err(LkhError::invalid_data(format!(
                        "Bad FIXED_EDGES_SECTION line '{line}'"
                    )));
                };
                problem.fixed_edges_section.push(FixedEdge {
                    from: parse_number("FIXED_EDGES_SECTION id", from)?,
                    to: parse_number("FIXED_EDGES_SECTION id", to)?,
                });
            }
            Section::EdgeWeight => {
                let row = tokens
                    .iter()
                    .map(|token| parse_number("EDGE_WEIGHT_SECTION weight", token))
                    .collect::<LkhResult<Vec<i64>>>()?;
                problem.edge_weight_section.push(row);
            }
            Section::Extra(index) => {
                if let Some((_, lines)) = problem.extra_sections.get_mut(index) {
                    lines.push(line.to_string());
                }
            }
        }

        Ok(())
    }
}

fn parse_keyword<T: FromStr<Err = String>>(value: &str) -> LkhResult<T> {
    value.parse().map_err(LkhError::invalid_data)
}

fn parse_number<T>(what: &str, value: &str) -> LkhResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| LkhError::invalid_data(format!("Bad {what} value '{value}': {e}")))
}
