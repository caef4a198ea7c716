use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use toprest_core::{Error, ParameterSet, Result};

use super::{Outcome, Payload, ResponseCodec, ResponseFormat};
use crate::constants::*;

/// Codec for `format=xml` replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

impl ResponseCodec for XmlCodec {
    fn format(&self) -> ResponseFormat {
        ResponseFormat::Xml
    }

    fn classify(&self, body: &str) -> Result<Outcome> {
        let message = scan(body)?;
        let payload = Payload::Xml(normalize(body)?);
        Ok(match message {
            Some(message) => Outcome::ApiError { message, payload },
            None => Outcome::Success { payload },
        })
    }

    fn render_request(&self, params: &ParameterSet) -> Result<String> {
        let mut w = new_writer()?;
        write_params(&mut w, params)?;
        finish(w)
    }

    fn render_response(&self, payload: &Payload) -> Result<String> {
        match payload {
            Payload::Xml(s) => Ok(s.clone()),
            Payload::Json(v) => {
                let mut w = new_writer()?;
                write_text_element(&mut w, "response", &v.to_string())?;
                finish(w)
            }
        }
    }

    fn render_combined(&self, params: &ParameterSet, payload: &Payload) -> Result<String> {
        let mut w = new_writer()?;
        start(&mut w, "invocation")?;
        write_params(&mut w, params)?;
        match payload {
            Payload::Xml(s) => {
                start(&mut w, "response")?;
                copy_events(s, &mut w, true)?;
                end(&mut w, "response")?;
            }
            Payload::Json(v) => write_text_element(&mut w, "response", &v.to_string())?,
        }
        end(&mut w, "invocation")?;
        finish(w)
    }

    fn render_failure(&self, params: &ParameterSet, description: &str) -> Result<String> {
        let mut w = new_writer()?;
        start(&mut w, "error")?;
        write_params(&mut w, params)?;
        write_text_element(&mut w, "message", description)?;
        end(&mut w, "error")?;
        finish(w)
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Msg,
    SubMsg,
}

/// Walk state while looking for the error envelope.
#[derive(Debug, Default)]
struct Scan {
    depth: usize,
    seen_root: bool,
    // Depth of the `error_response` element, if any.
    envelope: Option<usize>,
    envelope_closed: bool,
    field: Option<Field>,
    msg: String,
    sub_msg: String,
}

impl Scan {
    fn open(&mut self, name: &[u8]) -> Result<()> {
        if self.depth == 0 {
            if self.seen_root {
                return Err(Error::parse(
                    "malformed xml response: multiple root elements",
                ));
            }
            self.seen_root = true;
        }

        match self.envelope {
            None if self.depth <= 1 && name == ERROR_RESPONSE.as_bytes() => {
                self.envelope = Some(self.depth);
            }
            Some(d) if !self.envelope_closed && self.depth == d + 1 => {
                self.field = if name == ERROR_MSG.as_bytes() {
                    Some(Field::Msg)
                } else if name == ERROR_SUB_MSG.as_bytes() {
                    Some(Field::SubMsg)
                } else {
                    None
                };
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.depth = self
            .depth
            .checked_sub(1)
            .ok_or_else(|| Error::parse("malformed xml response: unexpected end tag"))?;

        if let Some(d) = self.envelope {
            if self.depth == d + 1 {
                self.field = None;
            }
            if self.depth == d {
                self.envelope_closed = true;
            }
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        if self.depth == 0 {
            return Err(Error::parse(
                "malformed xml response: text outside the root element",
            ));
        }
        match self.field {
            Some(Field::Msg) => self.msg.push_str(text),
            Some(Field::SubMsg) => self.sub_msg.push_str(text),
            None => {}
        }
        Ok(())
    }

    fn message(self) -> Option<String> {
        self.envelope?;
        [self.msg, self.sub_msg]
            .into_iter()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty())
            .or_else(|| Some("error_response without msg".to_string()))
    }
}

/// Check that `body` is well-formed and extract the error message if the
/// root is, or directly contains, `error_response`.
fn scan(body: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut scan = Scan::default();
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => {
                scan.open(e.local_name().as_ref())?;
                scan.depth += 1;
            }
            Event::Empty(e) => {
                scan.open(e.local_name().as_ref())?;
                scan.field = None;
                if scan.envelope == Some(scan.depth) {
                    scan.envelope_closed = true;
                }
            }
            Event::End(_) => scan.close()?,
            Event::Text(t) => scan.text(&t.unescape().map_err(malformed)?)?,
            Event::CData(c) => scan.text(&String::from_utf8_lossy(&c))?,
            Event::DocType(_) if scan.seen_root => {
                return Err(Error::parse(
                    "malformed xml response: doctype after the root element",
                ));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !scan.seen_root {
        return Err(Error::parse("malformed xml response: no root element"));
    }
    if scan.depth != 0 {
        return Err(Error::parse(
            "malformed xml response: unclosed element at end of input",
        ));
    }
    Ok(scan.message())
}

fn malformed(e: quick_xml::Error) -> Error {
    Error::parse(format!("malformed xml response: {e}")).with_source(e)
}

/// Re-indent `body` with two spaces under a fresh declaration.
fn normalize(body: &str) -> Result<String> {
    let mut w = new_writer()?;
    copy_events(body, &mut w, false)?;
    finish(w)
}

/// Copy the events of `body` into `w`.
///
/// Whitespace-only text is dropped so `w` controls indentation; any other
/// text is kept byte for byte. `embedded` also drops the doctype, which is
/// only legal before the root element.
fn copy_events(body: &str, w: &mut Writer<Vec<u8>>, embedded: bool) -> Result<()> {
    let mut reader = Reader::from_str(body);

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Eof => return Ok(()),
            Event::Decl(_) => {}
            Event::DocType(_) if embedded => {}
            Event::Text(t) if t.iter().all(u8::is_ascii_whitespace) => {}
            event => w
                .write_event(event)
                .map_err(|e| Error::unexpected("failed to write xml").with_source(e))?,
        }
    }
}

fn new_writer() -> Result<Writer<Vec<u8>>> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| Error::unexpected("failed to write xml").with_source(e))?;
    Ok(w)
}

fn start(w: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| Error::unexpected("failed to write xml").with_source(e))
}

fn end(w: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| Error::unexpected("failed to write xml").with_source(e))
}

fn write_text_element(w: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    start(w, name)?;
    w.write_event(Event::Text(BytesText::new(text)))
        .map_err(|e| Error::unexpected("failed to write xml").with_source(e))?;
    end(w, name)
}

fn write_params(w: &mut Writer<Vec<u8>>, params: &ParameterSet) -> Result<()> {
    start(w, "request_params")?;
    for (k, v) in params.iter() {
        write_text_element(w, k, v)?;
    }
    end(w, "request_params")
}

fn finish(w: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(w.into_inner())
        .map_err(|e| Error::unexpected("xml output is not utf-8").with_source(e))
}
