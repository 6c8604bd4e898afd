use super::{EncodeContext, Encoder, truncate_chars};
use crate::constants::{GENERATOR_NAME, SOURCE_MARKER, XML_CONTENT_CHARS, XML_PADDING_CAP};
use crate::content::padding::exact_filler;
use crate::format::Format;
use crate::io::Sink;
use anyhow::Result;
use quick_xml::{
    Writer,
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use tracing::debug;

/// `<document>` with metadata, authors, works, CDATA content and an optional
/// trailing padding comment.
pub struct XmlEncoder;

impl Encoder for XmlEncoder {
    fn format(&self) -> Format {
        Format::Xml
    }

    fn encode(
        &self,
        ctx: &EncodeContext<'_>,
        sink: &mut dyn Sink,
    ) -> Result<()> {
        let target = ctx.target_bytes;
        let bare = render(ctx, None)?;
        if bare.len() as u64 >= target {
            return sink.write_bytes(&bare);
        }
        let slot = render(ctx, Some(""))?.len() as u64;
        if slot > target {
            return sink.write_bytes(&bare);
        }
        let need = (target - slot).min(XML_PADDING_CAP);
        let padding = exact_filler(need, ctx.chunk_chars());
        debug!(target, base = slot, padding = need, "xml padding comment applied");
        sink.write_bytes(&render(ctx, Some(&padding))?)
    }
}

fn render(
    ctx: &EncodeContext<'_>,
    padding: Option<&str>,
) -> Result<Vec<u8>> {
    let ts = ctx.timestamp();
    let target = ctx.target_bytes.to_string();
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("document");
    root.push_attribute(("generator", GENERATOR_NAME));
    root.push_attribute(("generated-at", ts.as_str()));
    root.push_attribute(("target-size", target.as_str()));
    writer.write_event(Event::Start(root))?;

    writer.write_event(Event::Start(BytesStart::new("metadata")))?;
    text_element(&mut writer, "generator", GENERATOR_NAME)?;
    text_element(&mut writer, "generated-at", &ts)?;
    text_element(&mut writer, "target-size", &target)?;
    text_element(&mut writer, "source", SOURCE_MARKER)?;
    writer.write_event(Event::End(BytesEnd::new("metadata")))?;

    writer.write_event(Event::Start(BytesStart::new("authors")))?;
    for author in ctx.authors() {
        text_element(&mut writer, "author", author)?;
    }
    writer.write_event(Event::End(BytesEnd::new("authors")))?;

    writer.write_event(Event::Start(BytesStart::new("works")))?;
    for work in ctx.works {
        let id = work.id.to_string();
        let mut el = BytesStart::new("work");
        el.push_attribute(("id", id.as_str()));
        el.push_attribute(("title", work.title.as_str()));
        el.push_attribute(("author", work.author.as_str()));
        writer.write_event(Event::Empty(el))?;
    }
    writer.write_event(Event::End(BytesEnd::new("works")))?;

    writer.write_event(Event::Start(BytesStart::new("content")))?;
    for section in cdata_sections(truncate_chars(ctx.content, XML_CONTENT_CHARS)) {
        writer.write_event(Event::CData(BytesCData::new(section)))?;
    }
    writer.write_event(Event::End(BytesEnd::new("content")))?;

    if let Some(padding) = padding {
        // filler never contains "--"
        writer.write_event(Event::Comment(BytesText::from_escaped(padding)))?;
    }
    writer.write_event(Event::End(BytesEnd::new("document")))?;
    Ok(writer.into_inner())
}

fn text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Splits text so no CDATA section contains the `]]>` terminator.
pub fn cdata_sections(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find("]]>") {
        out.push(&rest[..idx + 2]);
        rest = &rest[idx + 2..];
    }
    out.push(rest);
    out
}
