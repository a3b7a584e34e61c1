//! Tagged kernel declaration scanner.
//!
//! Sources are scanned line by line. A tag line arms the scanner, the next
//! line carrying the declaration keyword starts a capture, and the capture
//! ends once the parameter list's parentheses balance. Anything that does not
//! complete before the next tag (or end of input) is dropped with a warning.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::model::{KernelSignature, SourceFile};
use crate::project::{ConfigError, MarkerConfig};

/// Trailing identifier before the parameter list, namespaces allowed.
static TRAILING_IDENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"((?:[A-Za-z_][A-Za-z0-9_]*\s*::\s*)*[A-Za-z_][A-Za-z0-9_]*)\s*$")
        .expect("trailing identifier pattern is valid")
});

/// Scanner position between lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    /// A tag was seen; waiting for the declaration keyword.
    Armed { tag_line: usize, template: bool },
    /// Accumulating declaration text until the parameter list closes.
    Capturing { tag_line: usize, template: bool, buffer: String },
}

/// A declaration whose parameter list closed, before naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedDeclaration {
    pub tag_line: usize,
    pub template: bool,
    /// Normalized text preceding the opening parenthesis.
    pub head: String,
    /// Normalized text between the outer parentheses.
    pub parameters: String,
}

impl ScanState {
    /// Transition for a tag line. Any pending declaration is abandoned.
    pub fn on_tag(self, line_no: usize, source: &SourceFile) -> ScanState {
        match self {
            ScanState::Idle => {}
            ScanState::Armed { tag_line, .. } => warn!(
                source = %source.name,
                tag_line,
                "tag without declaration before next tag; dropping"
            ),
            ScanState::Capturing { tag_line, .. } => warn!(
                source = %source.name,
                tag_line,
                "unterminated declaration before next tag; dropping"
            ),
        }
        ScanState::Armed { tag_line: line_no, template: false }
    }

    /// Transition for a comment-stripped code fragment.
    ///
    /// Returns the next state and, when a parameter list just closed, the
    /// captured declaration (the state is then back to `Idle`).
    pub fn on_code(
        self,
        code: &str,
        scanner: &SignatureScanner,
    ) -> (ScanState, Option<CapturedDeclaration>) {
        match self {
            ScanState::Idle => (ScanState::Idle, None),
            ScanState::Armed { tag_line, template } => {
                match code.find(&scanner.markers.declaration_keyword) {
                    Some(pos) => {
                        let template = template || scanner.mentions_template(&code[..pos]);
                        let buffer = code[pos..].trim().to_string();
                        scanner.check_complete(tag_line, template, buffer)
                    }
                    None => {
                        let template = template || scanner.mentions_template(code);
                        (ScanState::Armed { tag_line, template }, None)
                    }
                }
            }
            ScanState::Capturing { tag_line, template, mut buffer } => {
                let piece = code.trim();
                if !piece.is_empty() {
                    if !buffer.is_empty() {
                        buffer.push(' ');
                    }
                    buffer.push_str(piece);
                }
                scanner.check_complete(tag_line, template, buffer)
            }
        }
    }
}

/// Extracts kernel signatures from annotated source text.
#[derive(Debug, Clone)]
pub struct SignatureScanner {
    markers: MarkerConfig,
    template: Option<Regex>,
}

impl SignatureScanner {
    pub fn new(markers: &MarkerConfig) -> Result<Self, ConfigError> {
        markers.validate()?;
        let template = if markers.template_keyword.trim().is_empty() {
            None
        } else {
            Some(keyword_regex(markers.template_keyword.trim())?)
        };
        Ok(Self { markers: markers.clone(), template })
    }

    /// Scan `text` and return every well-formed tagged declaration in source order.
    ///
    /// Malformed declarations never fail the scan; they are logged and skipped.
    pub fn extract(&self, text: &str, source: &SourceFile) -> Vec<KernelSignature> {
        let tag = self.markers.tag.as_str();
        let mut out = Vec::new();
        let mut state = ScanState::Idle;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let code = strip_line_comment(raw, &self.markers.line_comment);

            // The tag usually lives inside a comment, so it is matched on the raw line.
            // Only code after an uncommented tag is fed on to the declaration matcher.
            let fragment = match raw.find(tag) {
                Some(pos) => {
                    state = state.on_tag(line_no, source);
                    let end = pos + tag.len();
                    if end <= code.len() {
                        &code[end..]
                    } else {
                        ""
                    }
                }
                None => code,
            };

            let (next, captured) = state.on_code(fragment, self);
            state = next;
            if let Some(decl) = captured {
                match name_declaration(&decl, source) {
                    Some(sig) => out.push(sig),
                    None => warn!(
                        source = %source.name,
                        tag_line = decl.tag_line,
                        head = %decl.head,
                        "declaration has no nameable identifier; dropping"
                    ),
                }
            }
        }

        match state {
            ScanState::Idle => {}
            ScanState::Armed { tag_line, .. } => {
                warn!(source = %source.name, tag_line, "tag without declaration at end of input")
            }
            ScanState::Capturing { tag_line, .. } => {
                warn!(source = %source.name, tag_line, "unterminated declaration at end of input")
            }
        }

        debug!(source = %source.name, kernels = out.len(), "scanned source");
        out
    }

    fn mentions_template(&self, code: &str) -> bool {
        self.template.as_ref().map(|re| re.is_match(code)).unwrap_or(false)
    }

    fn check_complete(
        &self,
        tag_line: usize,
        template: bool,
        buffer: String,
    ) -> (ScanState, Option<CapturedDeclaration>) {
        match split_declaration(&buffer, &self.markers.attribute_keywords) {
            Some((head, parameters)) => (
                ScanState::Idle,
                Some(CapturedDeclaration { tag_line, template, head, parameters }),
            ),
            None => (ScanState::Capturing { tag_line, template, buffer }, None),
        }
    }
}

/// Convenience wrapper for one-off scans with a given marker set.
pub fn extract_signatures(
    text: &str,
    source: &SourceFile,
    markers: &MarkerConfig,
) -> Result<Vec<KernelSignature>, ConfigError> {
    Ok(SignatureScanner::new(markers)?.extract(text, source))
}

/// Drop everything from the first line-comment marker onwards.
pub fn strip_line_comment<'a>(line: &'a str, marker: &str) -> &'a str {
    if marker.is_empty() {
        return line;
    }
    match line.find(marker) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove `keyword(...)` annotations.
///
/// Returns `None` while an annotation's parentheses are still open, which
/// means the declaration continues on a later line.
pub fn strip_attributes(text: &str, keywords: &[String]) -> Option<String> {
    let mut out = text.to_string();
    for keyword in keywords.iter().map(|k| k.trim()).filter(|k| !k.is_empty()) {
        let mut search_from = 0;
        while let Some(rel) = out[search_from..].find(keyword) {
            let start = search_from + rel;
            let after = start + keyword.len();
            if !is_word_start(&out, start) {
                search_from = after;
                continue;
            }
            let open = after + (out[after..].len() - out[after..].trim_start().len());
            if !out[open..].starts_with('(') {
                search_from = after;
                continue;
            }
            let close = matching_paren(&out, open)?;
            out.replace_range(start..=close, " ");
            search_from = start;
        }
    }
    Some(out)
}

/// Split a captured buffer into the text before the parameter list and the
/// parameter list itself, once the list has closed.
pub fn split_declaration(buffer: &str, attribute_keywords: &[String]) -> Option<(String, String)> {
    let stripped = strip_attributes(buffer, attribute_keywords)?;
    let text = collapse_whitespace(&stripped);
    let open = text.find('(')?;
    let close = matching_paren(&text, open)?;
    let head = text[..open].trim_end().to_string();
    let parameters = text[open + 1..close].trim().to_string();
    Some((head, parameters))
}

fn name_declaration(decl: &CapturedDeclaration, source: &SourceFile) -> Option<KernelSignature> {
    let caps = TRAILING_IDENT.captures(&decl.head)?;
    let ident = caps.get(1)?;
    // The identifier must follow something, or it is the keyword itself.
    if decl.head[..ident.start()].trim().is_empty() {
        return None;
    }
    let name: String = ident.as_str().chars().filter(|c| !c.is_whitespace()).collect();
    Some(KernelSignature {
        source: source.clone(),
        name,
        parameters: decl.parameters.clone(),
        is_template: decl.template,
    })
}

/// Byte index of the `)` matching the `(` at `open`.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in text[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_word_start(text: &str, start: usize) -> bool {
    text[..start].chars().next_back().map(|c| !(c.is_alphanumeric() || c == '_')).unwrap_or(true)
}

/// Whole-word regex for a keyword; word boundaries only where the keyword has word chars.
fn keyword_regex(keyword: &str) -> Result<Regex, ConfigError> {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if keyword.chars().next().map(is_word).unwrap_or(false) { r"\b" } else { "" };
    let trail = if keyword.chars().last().map(is_word).unwrap_or(false) { r"\b" } else { "" };
    Regex::new(&format!("{lead}{}{trail}", regex::escape(keyword)))
        .map_err(|e| ConfigError::InvalidMarker(format!("keyword '{keyword}': {e}")))
}
