//! Filename template compilation
//!
//! A template is a filename with placeholders, e.g.
//! `@objName_@texName_@texType_*.@id.ext`. It is parsed into an ordered list
//! of [`Segment`]s and compiled into a [`Matcher`] backed by an anchored regex.
//!
//! | Token      | Compiles to                     |
//! |------------|---------------------------------|
//! | `@objName` | `(?P<obj>[^_]+)?`               |
//! | `@texName` | `(?P<tex>[^_]+)`                |
//! | `@texType` | `(?P<type>[^_]+)`               |
//! | `@id`      | `(?P<id>\d+)?`                  |
//! | `*`        | `[^_]+`                         |
//! | `.ext`     | `\.\w{2,4}`                     |
//!
//! `_` stands for the configured separator. Everything else is escaped and
//! matched literally.

use crate::error::PatternError;
use regex::Regex;
use std::fmt::Write as _;
use std::ops::Range;

pub const DEFAULT_SEPARATOR: char = '_';

const WILDCARD: char = '*';
const EXTENSION_MARKER: &str = ".ext";
const PLACEHOLDER_SIGIL: char = '@';

/// Named capture in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    ObjectName,
    TextureName,
    TextureType,
    TileId,
}

impl Placeholder {
    pub const ALL: [Placeholder; 4] = [
        Placeholder::ObjectName,
        Placeholder::TextureName,
        Placeholder::TextureType,
        Placeholder::TileId,
    ];

    /// The token as written in a template.
    pub fn token(self) -> &'static str {
        match self {
            Self::ObjectName => "@objName",
            Self::TextureName => "@texName",
            Self::TextureType => "@texType",
            Self::TileId => "@id",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, Self::TextureName | Self::TextureType)
    }

    fn group(self) -> &'static str {
        match self {
            Self::ObjectName => "obj",
            Self::TextureName => "tex",
            Self::TextureType => "type",
            Self::TileId => "id",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| &p.token()[PLACEHOLDER_SIGIL.len_utf8()..] == name)
    }
}

/// One structural piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Wildcard,
    Capture(Placeholder),
    Extension,
}

/// A parsed, validated template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    separator: char,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template using the default `_` separator.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        Self::parse_with_separator(source, DEFAULT_SEPARATOR)
    }

    pub fn parse_with_separator(source: &str, separator: char) -> Result<Self, PatternError> {
        if separator.is_alphanumeric()
            || separator == PLACEHOLDER_SIGIL
            || separator == WILDCARD
            || separator.is_whitespace()
        {
            return Err(PatternError::InvalidSeparator(separator));
        }
        if source.trim().is_empty() {
            return Err(PatternError::Empty);
        }

        let segments = tokenize(source)?;
        validate(&segments)?;

        Ok(Self {
            source: source.to_string(),
            separator,
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn has_placeholder(&self, placeholder: Placeholder) -> bool {
        self.segments.contains(&Segment::Capture(placeholder))
    }

    /// Render the anchored regex for this template.
    pub fn to_regex(&self) -> String {
        let run = format!("[^{}]+", regex::escape(&self.separator.to_string()));
        let mut pattern = String::from("^");

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
                Segment::Wildcard => pattern.push_str(&run),
                Segment::Capture(Placeholder::TileId) => {
                    let _ = write!(pattern, r"(?P<{}>\d+)?", Placeholder::TileId.group());
                }
                Segment::Capture(p) if p.is_required() => {
                    let _ = write!(pattern, "(?P<{}>{})", p.group(), run);
                }
                Segment::Capture(p) => {
                    let _ = write!(pattern, "(?P<{}>{})?", p.group(), run);
                }
                Segment::Extension => pattern.push_str(r"\.\w{2,4}"),
            }
        }

        pattern.push('$');
        pattern
    }

    pub fn compile(&self) -> Result<Matcher, PatternError> {
        let regex = Regex::new(&self.to_regex())?;
        Ok(Matcher {
            template: self.clone(),
            regex,
        })
    }
}

/// Parse and compile a template in one step.
pub fn compile(source: &str) -> Result<Matcher, PatternError> {
    Template::parse(source)?.compile()
}

fn tokenize(source: &str) -> Result<Vec<Segment>, PatternError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = source;

    while let Some(ch) = rest.chars().next() {
        if let Some((segment, len)) = next_token(rest)? {
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(segment);
            rest = &rest[len..];
            continue;
        }
        literal.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Recognize a token at the start of `rest`, returning it and its byte length.
fn next_token(rest: &str) -> Result<Option<(Segment, usize)>, PatternError> {
    if rest.starts_with(WILDCARD) {
        return Ok(Some((Segment::Wildcard, WILDCARD.len_utf8())));
    }
    if rest.starts_with(EXTENSION_MARKER) {
        return Ok(Some((Segment::Extension, EXTENSION_MARKER.len())));
    }
    if let Some(after) = rest.strip_prefix(PLACEHOLDER_SIGIL) {
        let name_len = after
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(after.len());
        if name_len == 0 {
            // A bare '@' is literal
            return Ok(None);
        }
        let name = &after[..name_len];
        return match Placeholder::from_name(name) {
            Some(p) => Ok(Some((Segment::Capture(p), PLACEHOLDER_SIGIL.len_utf8() + name_len))),
            None => Err(PatternError::UnknownPlaceholder(format!("{PLACEHOLDER_SIGIL}{name}"))),
        };
    }
    Ok(None)
}

fn validate(segments: &[Segment]) -> Result<(), PatternError> {
    for placeholder in Placeholder::ALL {
        let count = segments
            .iter()
            .filter(|s| **s == Segment::Capture(placeholder))
            .count();
        if count > 1 {
            return Err(PatternError::DuplicatePlaceholder(placeholder.token()));
        }
        if count == 0 && placeholder.is_required() {
            return Err(PatternError::MissingPlaceholder(placeholder.token()));
        }
    }

    let extensions = segments.iter().filter(|s| **s == Segment::Extension).count();
    let ends_with_extension = segments.last() == Some(&Segment::Extension);
    if extensions > 1 || (extensions == 1 && !ends_with_extension) {
        return Err(PatternError::MisplacedExtension);
    }
    Ok(())
}

/// A numeric tile token and where it sits in the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileId {
    pub value: String,
    /// Byte range of `value` within the matched file name
    pub span: Range<usize>,
}

/// Captures extracted from one matching file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMatch {
    pub object_name: Option<String>,
    pub texture_name: String,
    pub texture_type: String,
    pub tile_id: Option<TileId>,
}

/// Compiled template.
#[derive(Debug, Clone)]
pub struct Matcher {
    template: Template,
    regex: Regex,
}

impl Matcher {
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// The generated regex source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

    /// Match a whole file name; `None` if it does not fit the template.
    pub fn captures(&self, file_name: &str) -> Option<TemplateMatch> {
        let caps = self.regex.captures(file_name)?;
        let group = |p: Placeholder| caps.name(p.group()).filter(|m| !m.as_str().is_empty());

        let texture_name = group(Placeholder::TextureName)?.as_str().to_string();
        let texture_type = group(Placeholder::TextureType)?.as_str().to_string();
        let object_name = group(Placeholder::ObjectName).map(|m| m.as_str().to_string());
        let tile_id = group(Placeholder::TileId).map(|m| TileId {
            value: m.as_str().to_string(),
            span: m.range(),
        });

        Some(TemplateMatch {
            object_name,
            texture_name,
            texture_type,
            tile_id,
        })
    }
}
