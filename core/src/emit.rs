use core::fmt::Write;

use heapless::String;

use crate::{Error, Run, RunLabel, WaveParams, COMMENT_COLUMN, SENTINEL, TOKEN_WIDTH};

const NAME_LEN: usize = 32;
const TOKEN_LEN: usize = 8;
const LINE_LEN: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFormat {
    name: String<NAME_LEN>,
    progmem: bool,
    label: RunLabel,
}

impl Default for TableFormat {
    fn default() -> Self {
        TableFormat {
            name: String::from("sin_wave"),
            progmem: false,
            label: RunLabel::Legacy,
        }
    }
}

const C_KEYWORDS: [&str; 44] = [
    "_Alignas", "_Alignof", "_Atomic", "_Bool", "_Complex", "_Generic", "_Imaginary",
    "_Noreturn", "_Static_assert", "_Thread_local", "auto", "break", "case", "char", "const",
    "continue", "default", "do", "double", "else", "enum", "extern", "float", "for", "goto",
    "if", "inline", "int", "long", "register", "restrict", "return", "short", "signed",
    "sizeof", "static", "struct", "switch", "typedef", "union", "unsigned", "void",
    "volatile", "while",
];

fn is_identifier(name: &str) -> bool {
    if C_KEYWORDS.contains(&name) {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl TableFormat {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn name(mut self, name: &str) -> Result<Self, Error> {
        if !is_identifier(name) {
            return Err(Error::InvalidName);
        }
        self.name.clear();
        self.name.push_str(name).map_err(|_| Error::InvalidName)?;
        Ok(self)
    }

    /// Place the array in AVR program memory.
    pub fn progmem(mut self, progmem: bool) -> Self {
        self.progmem = progmem;
        self
    }

    pub fn label(mut self, label: RunLabel) -> Self {
        self.label = label;
        self
    }

    pub fn array_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    pub samples: usize,
    pub lines: usize,
    pub plateaus: usize,
    pub peak: u16,
}

fn write_run<W: Write>(w: &mut W, run: &Run) -> Result<(), Error> {
    let mut line: String<LINE_LEN> = String::new();
    for value in run.values.iter() {
        let mut token: String<TOKEN_LEN> = String::new();
        write!(token, "0x{:x}", value)?;
        write!(line, "{:>width$}, ", token.as_str(), width = TOKEN_WIDTH)?;
    }
    writeln!(
        w,
        "\t{:<width$}// {}",
        line.as_str(),
        run.label,
        width = COMMENT_COLUMN
    )?;
    Ok(())
}

/// Write the complete C array declaration for `params`.
pub fn write_table<W: Write>(
    w: &mut W,
    params: &WaveParams,
    format: &TableFormat,
) -> Result<TableStats, Error> {
    let attr = if format.progmem { " PROGMEM" } else { "" };
    writeln!(w, "uint16_t {}[]{} = {{", format.name, attr)?;

    let mut stats = TableStats::default();
    let mut last = None;
    for run in params.runs(format.label) {
        let run = run?;
        write_run(w, &run)?;

        // A line never spans a value change, so each line holds a single value.
        if let Some(&value) = run.values.first() {
            if last != Some(value) {
                stats.plateaus += 1;
                last = Some(value);
            }
            stats.peak = stats.peak.max(value);
        }
        stats.lines += 1;
        stats.samples += run.len();
    }

    writeln!(w, "\t0x{:X}", SENTINEL)?;
    writeln!(w, "}};")?;
    debug!("{:?}", stats);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRMWARE_TABLE: &str = include_str!("../testdata/sin_wave.h");

    fn render(params: &WaveParams, format: &TableFormat) -> std::string::String {
        let mut out = std::string::String::new();
        write_table(&mut out, params, format).unwrap();
        out
    }

    fn tokens(line: &str) -> std::vec::Vec<u16> {
        let body = line.split("//").next().unwrap();
        body.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| u16::from_str_radix(t.trim_start_matches("0x"), 16).unwrap())
            .collect()
    }

    #[test]
    fn matches_firmware_table() {
        assert_eq!(
            render(&WaveParams::default(), &TableFormat::default()),
            FIRMWARE_TABLE
        );
    }

    #[test]
    fn progmem_header() {
        let out = render(&WaveParams::default(), &TableFormat::new().progmem(true));
        assert_eq!(out.lines().next(), Some("uint16_t sin_wave[] PROGMEM = {"));
        assert!(out.lines().skip(1).eq(FIRMWARE_TABLE.lines().skip(1)));
    }

    #[test]
    fn line_layout() {
        let out = render(&WaveParams::default(), &TableFormat::default());
        let lines: std::vec::Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "uint16_t sin_wave[] = {");
        assert_eq!(lines[lines.len() - 2], "\t0xFFFF");
        assert_eq!(lines[lines.len() - 1], "};");
        for line in &lines[1..lines.len() - 2] {
            assert!(line.starts_with('\t'));
            assert_eq!(line.find("//"), Some(1 + COMMENT_COLUMN));
        }
        assert_eq!(
            lines[1],
            "\t0x3ff, 0x3ff, 0x3ff, 0x3ff, 0x3ff, 0x3ff, 0x3ff,            // 1"
        );
        assert_eq!(
            lines[7],
            "\t  0xf,   0xf,   0xf,                                        // 28"
        );
    }

    #[test]
    fn tokens_reproduce_samples() {
        for (leds, period, resolution) in [(10, 2.0, 50.0), (6, 1.0, 64.0), (15, 2.0, 25.0)] {
            let params = WaveParams::new(leds, period, resolution).unwrap();
            let out = render(&params, &TableFormat::default());
            let lines: std::vec::Vec<_> = out.lines().collect();
            let body = &lines[1..lines.len() - 2];

            let mut values = std::vec::Vec::new();
            for line in body {
                let line_tokens = tokens(line);
                assert!(!line_tokens.is_empty() && line_tokens.len() <= 9);
                values.extend(line_tokens);
            }
            let expected: std::vec::Vec<u16> = params.samples().map(|s| s.value).collect();
            assert_eq!(values.len(), params.total_slices() as usize);
            assert_eq!(values, expected);

            // a value change always opens a new line
            for line in body {
                let line_tokens = tokens(line);
                assert!(line_tokens.windows(2).all(|w| w[0] == w[1]));
            }
        }
    }

    #[test]
    fn wide_tokens_are_not_truncated() {
        let params = WaveParams::new(15, 2.0, 50.0).unwrap();
        let out = render(&params, &TableFormat::default());
        assert!(out.lines().nth(1).unwrap().starts_with("\t0x7fff, 0x7fff,"));
    }

    #[test]
    fn first_sample_labels() {
        let out = render(
            &WaveParams::default(),
            &TableFormat::new().label(RunLabel::FirstSample),
        );
        let labels: std::vec::Vec<u32> = out
            .lines()
            .filter_map(|l| l.split("// ").nth(1))
            .map(|n| n.parse().unwrap())
            .collect();
        assert_eq!(&labels[..4], [1, 8, 13, 17]);
        assert_eq!(labels.last(), Some(&93));
    }

    #[test]
    fn empty_table() {
        let params = WaveParams::new(10, 0.01, 10.0).unwrap();
        let mut out = std::string::String::new();
        let stats = write_table(&mut out, &params, &TableFormat::default()).unwrap();
        assert_eq!(out, "uint16_t sin_wave[] = {\n\t0xFFFF\n};\n");
        assert_eq!(stats, TableStats::default());
    }

    #[test]
    fn stats() {
        let mut out = std::string::String::new();
        let stats = write_table(&mut out, &WaveParams::default(), &TableFormat::default()).unwrap();
        assert_eq!(
            stats,
            TableStats {
                samples: 100,
                lines: 22,
                plateaus: 21,
                peak: 0x3ff,
            }
        );
    }

    #[test]
    fn array_names() {
        let format = TableFormat::new().name("gauge_2").unwrap();
        assert_eq!(format.array_name(), "gauge_2");
        let out = render(&WaveParams::default(), &format);
        assert!(out.starts_with("uint16_t gauge_2[] = {\n"));

        assert_eq!(TableFormat::new().name("2fast"), Err(Error::InvalidName));
        assert_eq!(TableFormat::new().name(""), Err(Error::InvalidName));
        assert_eq!(TableFormat::new().name("sin wave"), Err(Error::InvalidName));
        assert_eq!(TableFormat::new().name("int"), Err(Error::InvalidName));
        assert_eq!(TableFormat::new().name("return"), Err(Error::InvalidName));
        assert_eq!(TableFormat::new().name("_Bool"), Err(Error::InvalidName));
        assert!(TableFormat::new().name("int_table").is_ok());
        assert_eq!(
            TableFormat::new().name("a_name_that_is_far_too_long_for_the_buffer"),
            Err(Error::InvalidName)
        );
    }
}
