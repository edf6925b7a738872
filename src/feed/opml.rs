use std::path::{Path, PathBuf};

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::storage::Podcast;

/// Maximum allowed nesting depth for OPML outline elements.
/// Deeply nested outlines are never read, but an unbounded element stack is
/// still a memory hazard on hostile input.
pub const MAX_OPML_DEPTH: usize = 50;

/// Element path whose members become podcasts: `<opml><body><outline><outline/>`.
const FEED_PATH: [&[u8]; 4] = [b"opml", b"body", b"outline", b"outline"];

/// Errors that can occur during OPML parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// File I/O error.
    #[error("Failed to read OPML file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// XML parsing failed.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// The document contains no elements at all.
    #[error("OPML document has no root element")]
    MissingRoot,

    /// The document element is something other than `<opml>`.
    #[error("Expected <opml> root element, found <{0}>")]
    UnexpectedRoot(String),

    /// OPML nesting depth exceeds safety limit.
    #[error("OPML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),
}

impl From<quick_xml::Error> for ParseError {
    fn from(e: quick_xml::Error) -> Self {
        ParseError::Xml(e.to_string())
    }
}

impl From<AttrError> for ParseError {
    fn from(e: AttrError) -> Self {
        ParseError::Xml(e.to_string())
    }
}

/// Parses an OPML file from disk into podcasts.
///
/// Reads the file at `path` and hands its contents to [`parse_opml_content`].
///
/// # Errors
///
/// Returns [`ParseError::Io`] if the file cannot be read, and any error
/// [`parse_opml_content`] returns for the contents.
pub async fn parse(path: impl AsRef<Path>) -> Result<Vec<Podcast>, ParseError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let podcasts = parse_opml_content(&content)?;
    tracing::debug!(path = %path.display(), count = podcasts.len(), "Parsed OPML file");
    Ok(podcasts)
}

/// Parses OPML content into podcasts, one per second-level outline.
///
/// Only `<outline>` elements sitting directly inside a top-level outline of
/// `<body>` are read. The first-level outlines act as folders and are never
/// returned, even if they carry an `xmlUrl`. Anything nested deeper is skipped.
///
/// Each podcast takes its name from `text` and its URL from `xmlUrl`; a
/// missing attribute becomes an empty string. Ids are assigned from document
/// order starting at zero. No deduplication is done.
///
/// Only the five predefined XML entities are expanded. `quick-xml` never reads
/// `<!ENTITY>` declarations, so a custom entity reference in an attribute is
/// reported as [`ParseError::Xml`] instead of being resolved.
pub fn parse_opml_content(content: &str) -> Result<Vec<Podcast>, ParseError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut podcasts = Vec::new();
    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut outline_depth: usize = 0;
    let mut seen_root = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                check_root(&stack, &name, &mut seen_root)?;

                if name == b"outline" {
                    outline_depth += 1;
                    if outline_depth > MAX_OPML_DEPTH {
                        return Err(ParseError::MaxDepthExceeded(MAX_OPML_DEPTH));
                    }
                }

                stack.push(name);
                if is_feed_path(&stack) {
                    podcasts.push(outline_to_podcast(&e, &reader, podcasts.len())?);
                } else {
                    check_attributes(&e, &reader)?;
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.local_name().as_ref().to_vec();
                check_root(&stack, &name, &mut seen_root)?;

                stack.push(name);
                if is_feed_path(&stack) {
                    podcasts.push(outline_to_podcast(&e, &reader, podcasts.len())?);
                } else {
                    check_attributes(&e, &reader)?;
                }
                stack.pop();

                if stack.is_empty() {
                    break;
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"outline" {
                    outline_depth = outline_depth.saturating_sub(1);
                }
                stack.pop();

                // Anything after the document element is not part of the document.
                if stack.is_empty() {
                    break;
                }
            }
            Ok(Event::Eof) => {
                if !seen_root {
                    return Err(ParseError::MissingRoot);
                }
                if !stack.is_empty() {
                    return Err(ParseError::Xml(format!(
                        "unexpected end of document inside <{}>",
                        String::from_utf8_lossy(stack.last().map(Vec::as_slice).unwrap_or_default())
                    )));
                }
                break;
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(podcasts)
}

/// Rejects a document whose first element is not `<opml>`.
fn check_root(stack: &[Vec<u8>], name: &[u8], seen_root: &mut bool) -> Result<(), ParseError> {
    if stack.is_empty() && !*seen_root {
        if name != FEED_PATH[0] {
            return Err(ParseError::UnexpectedRoot(
                String::from_utf8_lossy(name).into_owned(),
            ));
        }
        *seen_root = true;
    }
    Ok(())
}

fn is_feed_path(stack: &[Vec<u8>]) -> bool {
    stack.len() == FEED_PATH.len()
        && stack
            .iter()
            .zip(FEED_PATH.iter())
            .all(|(have, want)| have.as_slice() == *want)
}

/// Rejects an element whose attributes are not well-formed: unquoted or
/// duplicated attributes, or values with unknown entity references.
fn check_attributes(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<(), ParseError> {
    for attr_result in e.attributes() {
        attr_result?.decode_and_unescape_value(reader.decoder())?;
    }
    Ok(())
}

/// Builds a podcast from an outline element's `text` and `xmlUrl` attributes.
///
/// Malformed attributes fail the whole parse, the same as anywhere else in the document.
fn outline_to_podcast(
    e: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
    position: usize,
) -> Result<Podcast, ParseError> {
    let mut name = String::new();
    let mut url = String::new();

    for attr_result in e.attributes() {
        let attr = attr_result?;
        let decoder = reader.decoder();
        match attr.key.as_ref() {
            b"text" => name = attr.decode_and_unescape_value(decoder)?.into_owned(),
            b"xmlUrl" => url = attr.decode_and_unescape_value(decoder)?.into_owned(),
            _ => {}
        }
    }

    if url.is_empty() {
        tracing::debug!(name = %name, position, "OPML outline has no xmlUrl");
    }

    Ok(Podcast::new(position as i64, name, url))
}
