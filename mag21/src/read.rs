//!
//! # Mag Line Reader
//!
//! Splits Magic cell content into lines, classifies each by its leading keyword,
//! and parses its fields into a [Statement].
//! Each line is handled independently here; context such as the current layer
//! or the open instance is tracked by the [crate::CellParser].
//!

// Local imports
use crate::geom::{Int, Label, Rect, Transform};

/// Iterate over the non-empty lines of `src`, trimmed,
/// paired with their (1-based) line numbers.
pub fn lines(src: &str) -> impl Iterator<Item = (usize, &str)> {
    src.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// # Statement Keywords
///
/// Leading tokens of the statements we parse. Matching is case-sensitive.
/// The `<< layer >>` and `<< end >>` markers are recognized by their brackets instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Magic,
    Tech,
    Timestamp,
    Rect,
    Rlabel,
    Use,
    Transform,
    Box,
}
impl Keyword {
    /// Convert to the keyword's source-text
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Magic => "magic",
            Self::Tech => "tech",
            Self::Timestamp => "timestamp",
            Self::Rect => "rect",
            Self::Rlabel => "rlabel",
            Self::Use => "use",
            Self::Transform => "transform",
            Self::Box => "box",
        }
    }
    /// Create from source-text `txt`. Returns `None` for anything else.
    pub fn from_str(txt: &str) -> Option<Self> {
        match txt {
            "magic" => Some(Self::Magic),
            "tech" => Some(Self::Tech),
            "timestamp" => Some(Self::Timestamp),
            "rect" => Some(Self::Rect),
            "rlabel" => Some(Self::Rlabel),
            "use" => Some(Self::Use),
            "transform" => Some(Self::Transform),
            "box" => Some(Self::Box),
            _ => None,
        }
    }
}
impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// # Parsed Statement
///
/// One successfully-parsed line, borrowing its strings from the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'src> {
    /// `magic [version [extra...]]`. Magic itself writes a bare `magic`.
    Magic {
        version: Option<&'src str>,
        extra: Option<&'src str>,
    },
    /// `tech <name...>`
    Tech(&'src str),
    /// `timestamp <int>`
    Timestamp(i64),
    /// `<< name >>`
    Layer(&'src str),
    /// `<< end >>`
    End,
    /// `rect x1 y1 x2 y2`
    Rect(Rect),
    /// `rlabel layer x1 y1 x2 y2 rotation text...`
    Label(Label),
    /// `use cell_type [instance_name [path]]`
    Use {
        cell_type: &'src str,
        instance_name: Option<&'src str>,
        path: Option<&'src str>,
    },
    /// `transform A B C D E F`
    Transform(Transform),
    /// `box x1 y1 x2 y2`
    Box(Rect),
}

/// # Line-Parsing Errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// No recognized keyword
    Unrecognized,
    /// Recognized keyword, invalid fields
    Malformed { keyword: String, reason: String },
}
impl LineError {
    fn malformed(keyword: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            keyword: keyword.into(),
            reason: reason.into(),
        }
    }
}

/// Classify and parse one trimmed, non-empty line
pub fn parse_line(line: &str) -> Result<Statement<'_>, LineError> {
    if line.starts_with("<<") && line.ends_with(">>") {
        return parse_marker(line);
    }
    let mut fields = Fields::new(line);
    let keyword = match fields.next().and_then(Keyword::from_str) {
        Some(k) => k,
        None => return Err(LineError::Unrecognized),
    };
    let mut p = LineParser { keyword, fields };
    match keyword {
        Keyword::Magic => p.parse_magic(),
        Keyword::Tech => p.parse_tech(),
        Keyword::Timestamp => p.parse_timestamp(),
        Keyword::Rect => Ok(Statement::Rect(p.parse_rect()?)),
        Keyword::Rlabel => p.parse_rlabel(),
        Keyword::Use => p.parse_use(),
        Keyword::Transform => p.parse_transform(),
        Keyword::Box => Ok(Statement::Box(p.parse_rect()?)),
    }
}

/// Parse a `<< name >>` marker, including the `<< end >>` terminator
fn parse_marker(line: &str) -> Result<Statement<'_>, LineError> {
    let name = line
        .trim_matches(|c: char| c == '<' || c == '>' || c.is_whitespace())
        .trim();
    match name {
        "" => Err(LineError::malformed("<<", "empty layer name")),
        "end" => Ok(Statement::End),
        _ => Ok(Statement::Layer(name)),
    }
}

/// # Field Tokenizer
///
/// Splits a line at runs of whitespace, one token at a time,
/// and offers the un-split remainder at any point.
struct Fields<'src> {
    rest: &'src str,
}
impl<'src> Fields<'src> {
    fn new(line: &'src str) -> Self {
        Self { rest: line }
    }
    /// Get and return the next token, if any
    fn next(&mut self) -> Option<&'src str> {
        let s = self.rest.trim_start();
        if s.is_empty() {
            self.rest = s;
            return None;
        }
        let end = s.find(char::is_whitespace).unwrap_or(s.len());
        let (tok, rest) = s.split_at(end);
        self.rest = rest;
        Some(tok)
    }
    /// The remainder of the line, less leading whitespace
    fn rest(&self) -> &'src str {
        self.rest.trim()
    }
}

/// Per-line parser, wrapping a keyword and the [Fields] that follow it
struct LineParser<'src> {
    keyword: Keyword,
    fields: Fields<'src>,
}
impl<'src> LineParser<'src> {
    /// Error-Generation Helper
    fn fail<T>(&self, reason: impl Into<String>) -> Result<T, LineError> {
        Err(LineError::malformed(self.keyword.to_str(), reason))
    }
    /// Get the next token, failing if none remain
    fn token(&mut self, what: &str) -> Result<&'src str, LineError> {
        match self.fields.next() {
            Some(tok) => Ok(tok),
            None => self.fail(format!("missing {}", what)),
        }
    }
    /// Get the next token as an integer
    fn int(&mut self, what: &str) -> Result<Int, LineError> {
        let tok = self.token(what)?;
        match tok.parse::<Int>() {
            Ok(i) => Ok(i),
            Err(_) => self.fail(format!("invalid integer {} `{}`", what, tok)),
        }
    }
    /// Get the next token as a finite floating-point number
    fn float(&mut self, what: &str) -> Result<f64, LineError> {
        let tok = self.token(what)?;
        match tok.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(f),
            _ => self.fail(format!("invalid number {} `{}`", what, tok)),
        }
    }
    /// Assert no tokens remain
    fn done(&mut self) -> Result<(), LineError> {
        match self.fields.next() {
            None => Ok(()),
            Some(tok) => self.fail(format!("unexpected trailing field `{}`", tok)),
        }
    }
    fn parse_magic(&mut self) -> Result<Statement<'src>, LineError> {
        let version = self.fields.next();
        let extra = Some(self.fields.rest()).filter(|s| !s.is_empty());
        Ok(Statement::Magic { version, extra })
    }
    fn parse_tech(&mut self) -> Result<Statement<'src>, LineError> {
        match self.fields.rest() {
            "" => self.fail("missing technology name"),
            name => Ok(Statement::Tech(name)),
        }
    }
    fn parse_timestamp(&mut self) -> Result<Statement<'src>, LineError> {
        let tok = self.token("timestamp")?;
        let ts = match tok.parse::<i64>() {
            Ok(ts) => ts,
            Err(_) => return self.fail(format!("invalid timestamp `{}`", tok)),
        };
        self.done()?;
        Ok(Statement::Timestamp(ts))
    }
    /// Parse exactly four integer corner-coordinates, as for `rect` and `box`
    fn parse_rect(&mut self) -> Result<Rect, LineError> {
        let x1 = self.int("x1")?;
        let y1 = self.int("y1")?;
        let x2 = self.int("x2")?;
        let y2 = self.int("y2")?;
        self.done()?;
        Ok(Rect::new(x1, y1, x2, y2))
    }
    fn parse_rlabel(&mut self) -> Result<Statement<'src>, LineError> {
        let layer = self.token("layer")?;
        let x1 = self.int("x1")?;
        let y1 = self.int("y1")?;
        let x2 = self.int("x2")?;
        let y2 = self.int("y2")?;
        let rotation = self.int("rotation")?;
        let text = match self.fields.rest() {
            "" => return self.fail("missing text"),
            t => t,
        };
        Ok(Statement::Label(Label {
            layer: layer.to_string(),
            rect: Rect::new(x1, y1, x2, y2),
            rotation,
            text: text.to_string(),
        }))
    }
    fn parse_use(&mut self) -> Result<Statement<'src>, LineError> {
        let cell_type = self.token("cell type")?;
        let instance_name = self.fields.next();
        let path = self.fields.next();
        Ok(Statement::Use {
            cell_type,
            instance_name,
            path,
        })
    }
    fn parse_transform(&mut self) -> Result<Statement<'src>, LineError> {
        let mut c = [0.0; 6];
        for (idx, name) in ["A", "B", "C", "D", "E", "F"].iter().enumerate() {
            c[idx] = self.float(name)?;
        }
        self.done()?;
        Ok(Statement::Transform(Transform::from_coefficients(c)))
    }
}
