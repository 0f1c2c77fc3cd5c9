//! Reader for the line-oriented `.net` descriptor written by the feed-forward
//! backprop trainer.
//!
//! Layout, in order:
//!
//! ```text
//! <problem description>
//! input  1 is <name> in [..]        zero or more declaration lines
//! output 1 is <name> in [..]
//! # ...                             ends the header
//! <numInputs>
//! <min> <max>                       numInputs lines
//! <numOutputs>
//! <min> <max>                       numOutputs lines
//! ...                               skipped up to a line containing '$'
//! $
//! #planes=<N> <s0> ... <sN-1>
//! bias <k> <count>                  N-1 blocks, one value per line
//! wgt <k> <src> <dst>               N-1 blocks, row-major, one value per line
//! ```

use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{FormatError, NnhsError, Result, Section};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::network::metadata::{Declaration, Direction};
use crate::network::model::{ModelParts, NetworkModel, Range};
use crate::parser::load_config::LoadConfig;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Loads a descriptor with the default [`LoadConfig`].
pub fn load_model(path: impl AsRef<Path>) -> Result<NetworkModel> {
    load_model_with(path, &LoadConfig::default())
}

/// Loads a descriptor from disk. The whole file is read before parsing, so a
/// failure never leaves a partially built model behind.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD. Free-text lines
/// written in a legacy encoding still load; a bad byte in a numeric line
/// fails there with a line-numbered `FormatError`.
pub fn load_model_with(path: impl AsRef<Path>, config: &LoadConfig) -> Result<NetworkModel> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| NnhsError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let model = parse_str(&String::from_utf8_lossy(&bytes), config)?;

    let net = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    info!(net = %net, topology = %model.topology(), "loaded network");
    Ok(model)
}

/// Parses a descriptor from any reader. Decoding is lossy, as in
/// [`load_model_with`].
pub fn parse_reader<R: Read>(mut reader: R, config: &LoadConfig) -> Result<NetworkModel> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_str(&String::from_utf8_lossy(&bytes), config)
}

/// Parses a descriptor held in memory.
pub fn parse_str(text: &str, config: &LoadConfig) -> Result<NetworkModel> {
    let mut cursor = LineCursor::new(text);

    // ── Header ─────────────────────────────────────────────────────────────
    let problem = cursor.next(Section::Description, "a problem description line")?;
    let (inputs, outputs) = read_declarations(&mut cursor, problem)?;
    debug!(inputs = inputs.len(), outputs = outputs.len(), "read variable declarations");

    // ── Ranges ─────────────────────────────────────────────────────────────
    let input_range = read_ranges(&mut cursor, Section::InputRanges)?;
    check_declared(&cursor, config, "input", inputs.len(), input_range.len())?;
    let output_range = read_ranges(&mut cursor, Section::OutputRanges)?;
    check_declared(&cursor, config, "output", outputs.len(), output_range.len())?;
    debug!(inputs = input_range.len(), outputs = output_range.len(), "read ranges");

    // ── Topology ───────────────────────────────────────────────────────────
    skip_to_plane_marker(&mut cursor)?;
    let layer_sizes = read_plane_sizes(&mut cursor, input_range.len(), output_range.len())?;
    debug!(planes = layer_sizes.len(), ?layer_sizes, "read plane sizes");

    let transitions = layer_sizes.len() - 1;
    let mut biases = Vec::with_capacity(transitions);
    for k in 0..transitions {
        biases.push(read_bias_block(&mut cursor, k, layer_sizes[k + 1])?);
    }
    let mut layers = Vec::with_capacity(transitions);
    for (k, bias) in biases.into_iter().enumerate() {
        let weights = read_weight_block(&mut cursor, k, layer_sizes[k + 1], layer_sizes[k])?;
        layers.push(Layer::new(weights, bias)?);
    }
    debug!(transitions, "read biases and weights");

    let model = NetworkModel::new(ModelParts {
        problem: problem.trim_end().to_string(),
        inputs,
        outputs,
        input_range,
        output_range,
        layer_sizes,
        layers,
    })?;

    if let Err(err) = model.check_ranges() {
        if config.reject_degenerate_ranges {
            return Err(err);
        }
        warn!(error = %err, "accepting model with degenerate range");
    }
    Ok(model)
}

// ---------------------------------------------------------------------------
// Line cursor
// ---------------------------------------------------------------------------

/// Hands out lines while tracking the 1-based number of the last one returned.
struct LineCursor<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str) -> Self {
        LineCursor { lines: text.lines(), line_no: 0 }
    }

    fn next(&mut self, section: Section, expected: &str) -> std::result::Result<&'a str, FormatError> {
        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;
                Ok(line)
            }
            None => Err(FormatError::new(self.line_no + 1, section, expected, "end of file")),
        }
    }

    /// Error pointing at the last line handed out.
    fn error(&self, section: Section, expected: impl Into<String>, found: &str) -> FormatError {
        FormatError::new(self.line_no, section, expected, found.trim_end())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn read_declarations(
    cursor: &mut LineCursor<'_>,
    problem: &str,
) -> std::result::Result<(Vec<Declaration>, Vec<Declaration>), FormatError> {
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    // A description that already starts with '#' closes the header itself.
    if problem.starts_with('#') {
        return Ok((inputs, outputs));
    }
    loop {
        let line = cursor.next(Section::Declarations, "a header line starting with '#'")?;
        if line.starts_with('#') {
            return Ok((inputs, outputs));
        }
        // The keyword must be a whole token: "inputs: 12" is free text.
        let keyword = line.split_whitespace().next().and_then(Direction::from_keyword);
        if keyword.is_none() {
            continue;
        }
        match Declaration::parse(line) {
            Some((Direction::Input, decl)) => inputs.push(decl),
            Some((Direction::Output, decl)) => outputs.push(decl),
            None => {
                return Err(cursor.error(
                    Section::Declarations,
                    "'input|output <n> <word> <name> ...'",
                    line,
                ))
            }
        }
    }
}

fn check_declared(
    cursor: &LineCursor<'_>,
    config: &LoadConfig,
    kind: &str,
    declared: usize,
    counted: usize,
) -> std::result::Result<(), FormatError> {
    if declared == counted {
        return Ok(());
    }
    if config.strict_declarations {
        let section = if kind == "input" { Section::InputRanges } else { Section::OutputRanges };
        return Err(FormatError::new(
            cursor.line_no,
            section,
            format!("{counted} declared {kind} variables"),
            format!("{declared} '{kind}' lines"),
        ));
    }
    warn!(kind, declared, counted, "declared variables do not match range count");
    Ok(())
}

fn read_ranges(cursor: &mut LineCursor<'_>, section: Section) -> std::result::Result<Vec<Range>, FormatError> {
    let count = read_count(cursor, section)?;
    (0..count).map(|_| read_range(cursor, section)).collect()
}

fn read_count(cursor: &mut LineCursor<'_>, section: Section) -> std::result::Result<usize, FormatError> {
    let line = cursor.next(section, "a positive integer count")?;
    match line.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(cursor.error(section, "a positive integer count", line)),
    }
}

fn read_range(cursor: &mut LineCursor<'_>, section: Section) -> std::result::Result<Range, FormatError> {
    let line = cursor.next(section, "'<min> <max>'")?;
    let values: Vec<f64> = line
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| cursor.error(section, "two numbers '<min> <max>'", line))?;
    match values[..] {
        [min, max] => Ok(Range::new(min, max)),
        _ => Err(cursor.error(section, "two numbers '<min> <max>'", line)),
    }
}

fn skip_to_plane_marker(cursor: &mut LineCursor<'_>) -> std::result::Result<(), FormatError> {
    loop {
        let line = cursor.next(Section::PlaneMarker, "a line containing '$'")?;
        if line.contains('$') {
            return Ok(());
        }
    }
}

fn read_plane_sizes(
    cursor: &mut LineCursor<'_>,
    num_inputs: usize,
    num_outputs: usize,
) -> std::result::Result<Vec<usize>, FormatError> {
    const PATTERN: &str = "'... = <N> <s0> ... <sN-1>'";
    let line = cursor.next(Section::PlaneSizes, PATTERN)?;
    let rhs = line
        .split('=')
        .nth(1)
        .ok_or_else(|| cursor.error(Section::PlaneSizes, PATTERN, line))?;
    let numbers: Vec<usize> = rhs
        .split_whitespace()
        .map(str::parse::<usize>)
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| cursor.error(Section::PlaneSizes, "non-negative integers after '='", line))?;

    let (&num_planes, sizes) = numbers
        .split_first()
        .ok_or_else(|| cursor.error(Section::PlaneSizes, PATTERN, line))?;
    if num_planes < 2 {
        return Err(cursor.error(Section::PlaneSizes, "at least 2 planes", line));
    }
    if sizes.len() != num_planes {
        return Err(cursor.error(Section::PlaneSizes, format!("{num_planes} plane sizes"), line));
    }
    if sizes.contains(&0) {
        return Err(cursor.error(Section::PlaneSizes, "non-zero plane sizes", line));
    }
    if sizes[0] != num_inputs {
        return Err(cursor.error(
            Section::PlaneSizes,
            format!("first plane of {num_inputs} neurons"),
            line,
        ));
    }
    if sizes[num_planes - 1] != num_outputs {
        return Err(cursor.error(
            Section::PlaneSizes,
            format!("last plane of {num_outputs} neurons"),
            line,
        ));
    }
    Ok(sizes.to_vec())
}

fn read_bias_block(
    cursor: &mut LineCursor<'_>,
    k: usize,
    size: usize,
) -> std::result::Result<Vec<f64>, FormatError> {
    let section = Section::BiasBlock(k);
    let header = cursor.next(section, "'bias <plane> <count>'")?;
    let tokens: Vec<&str> = header.split_whitespace().collect();
    let count = match tokens[..] {
        [_, _, count] => count.parse::<usize>().ok(),
        _ => None,
    }
    .ok_or_else(|| cursor.error(section, "'bias <plane> <count>'", header))?;
    if count != size {
        return Err(cursor.error(section, format!("bias count {size}"), header));
    }
    (0..count).map(|_| read_value(cursor, section)).collect()
}

/// Reads one weight block into a `rows x cols` matrix (rows = destination).
///
/// The trainer writes the header as `wgt <k> <src> <dst>`; the transposed
/// `wgt <k> <dst> <src>` is accepted too. Values are always destination-major.
fn read_weight_block(
    cursor: &mut LineCursor<'_>,
    k: usize,
    rows: usize,
    cols: usize,
) -> std::result::Result<Matrix, FormatError> {
    let section = Section::WeightBlock(k);
    let header = cursor.next(section, "'wgt <plane> <dim> <dim>'")?;
    let tokens: Vec<&str> = header.split_whitespace().collect();
    let dims = match tokens[..] {
        [_, _, a, b] => a.parse::<usize>().ok().zip(b.parse::<usize>().ok()),
        _ => None,
    }
    .ok_or_else(|| cursor.error(section, "'wgt <plane> <dim> <dim>'", header))?;
    if dims != (cols, rows) && dims != (rows, cols) {
        return Err(cursor.error(section, format!("dimensions {cols} {rows}"), header));
    }

    let values = (0..rows * cols)
        .map(|_| read_value(cursor, section))
        .collect::<std::result::Result<Vec<f64>, _>>()?;
    Matrix::from_row_major(rows, cols, values)
        .ok_or_else(|| cursor.error(section, format!("{} weights", rows * cols), header))
}

fn read_value(cursor: &mut LineCursor<'_>, section: Section) -> std::result::Result<f64, FormatError> {
    let line = cursor.next(section, "a single number")?;
    line.trim()
        .parse::<f64>()
        .map_err(|_| cursor.error(section, "a single number", line))
}
