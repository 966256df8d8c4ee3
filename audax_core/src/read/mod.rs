#![allow(clippy::single_match)]

use std::borrow::Cow;

use anyhow::{bail, Result};
use gpx::parse_gpx;
use log::{info, warn};
use logging_timer::time;
use quick_xml::{events::Event, Reader};

use crate::error::AudaxError;
use crate::model::RouteDocument;

mod attributes;
mod gpx;
mod metadata;
mod route;
mod track;
mod track_segment;
mod waypoint;

/// Reads the track points, route points, waypoints and route name out of a
/// GPX document. The XSD, which defines the format of a GPX file, is at
/// https://www.topografix.com/GPX/1/1/gpx.xsd
///
/// Only documents that are not well-formed XML are rejected. Unknown
/// elements are skipped, and bad coordinates are passed through as NaN for
/// the caller to filter.
#[time]
pub fn read_route_from_str(text: &str) -> crate::Result<RouteDocument> {
    let xml_reader = Reader::from_str(text);
    read_route_from_reader(xml_reader).map_err(|e| AudaxError::Parse(format!("{e:#}")))
}

pub fn read_route_from_slice(data: &[u8]) -> crate::Result<RouteDocument> {
    let xml_reader = Reader::from_reader(data);
    read_route_from_reader(xml_reader).map_err(|e| AudaxError::Parse(format!("{e:#}")))
}

fn read_route_from_reader(mut xml_reader: Reader<&[u8]>) -> Result<RouteDocument> {
    let mut doc: Option<RouteDocument> = None;

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"gpx" => {
                    doc = Some(parse_gpx(&mut xml_reader)?);
                }
                other => {
                    warn!(
                        "Root element is {:?}, not 'gpx'; it will be ignored",
                        xml_reader.bytes_to_cow(other)?
                    );
                    xml_reader.read_to_end(e.name())?;
                    doc.get_or_insert_with(RouteDocument::default);
                }
            },
            Ok(Event::Empty(_)) => {
                doc.get_or_insert_with(RouteDocument::default);
            }
            Ok(Event::Eof) => {
                let Some(doc) = doc else {
                    bail!("Document does not contain any XML elements");
                };
                info!(
                    "Read {} track points, {} route points and {} waypoints",
                    doc.track_points.len(),
                    doc.route_points.len(),
                    doc.waypoints.len()
                );
                return Ok(doc);
            }
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            _ => (),
        }
    }
}

pub(crate) trait XmlReaderConversions {
    fn bytes_to_cow<'a, 'b>(&'a self, bytes: &'b [u8]) -> Result<Cow<'b, str>>;
    fn bytes_to_string(&self, bytes: &[u8]) -> Result<String>;
    fn cow_to_string(&self, bytes: Cow<'_, [u8]>) -> Result<String>;
}

impl<R> XmlReaderConversions for Reader<R> {
    #[inline]
    fn bytes_to_cow<'a, 'b>(&'a self, bytes: &'b [u8]) -> Result<Cow<'b, str>> {
        Ok(self.decoder().decode(bytes)?)
    }

    #[inline]
    fn bytes_to_string(&self, bytes: &[u8]) -> Result<String> {
        // Ensure everything goes through decode().
        Ok(self.bytes_to_cow(bytes)?.into())
    }

    #[inline]
    fn cow_to_string(&self, bytes: Cow<'_, [u8]>) -> Result<String> {
        match bytes {
            // Ensure everything goes through decode().
            Cow::Borrowed(slice) => Ok(self.bytes_to_string(slice)?),
            Cow::Owned(vec) => Ok(self.bytes_to_string(&vec)?),
        }
    }
}

pub(crate) trait XmlReaderExtensions {
    fn read_inner_as_string(&mut self) -> Result<String>;
    fn read_inner_as_f64(&mut self) -> Result<Option<f64>>;
}

impl XmlReaderExtensions for Reader<&[u8]> {
    /// Reads the text content of the current element up to and including its
    /// end tag. Escapes are resolved, CDATA is included verbatim, and any
    /// nested markup is skipped. The result is trimmed.
    fn read_inner_as_string(&mut self) -> Result<String> {
        let mut text = String::new();

        loop {
            match self.read_event() {
                Ok(Event::Text(t)) => text.push_str(&t.unescape()?),
                Ok(Event::CData(c)) => text.push_str(&self.bytes_to_cow(&c)?),
                Ok(Event::Start(e)) => {
                    self.read_to_end(e.name())?;
                }
                Ok(Event::End(_)) => return Ok(text.trim().to_owned()),
                Ok(Event::Eof) => bail!("Reached EOF unexpectedly inside a text element"),
                Err(e) => bail!("Error at position {}: {:?}", self.error_position(), e),
                _ => (),
            }
        }
    }

    /// Reads the text content as a number. Anything that is not a finite
    /// number yields `None` rather than an error.
    fn read_inner_as_f64(&mut self) -> Result<Option<f64>> {
        let t = self.read_inner_as_string()?;
        Ok(t.parse::<f64>().ok().filter(|v| v.is_finite()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <metadata><name>Oxford 200</name></metadata>
  <wpt lat="51.75" lon="-1.25">
    <name>Control &amp; Cafe</name>
    <desc><![CDATA[Stamp at the counter]]></desc>
    <sym>Flag</sym>
    <type>cp</type>
  </wpt>
  <trk>
    <name>Track name</name>
    <extensions><foo:bar xmlns:foo="urn:x">1</foo:bar></extensions>
    <trkseg>
      <trkpt lat="51.75" lon="-1.25"><ele>60.5</ele><time>2024-06-01T07:00:00Z</time></trkpt>
      <trkpt lat="51.80" lon="-1.30"><ele>not a number</ele></trkpt>
      <trkpt lat="oops" lon="-1.35"/>
    </trkseg>
    <trkseg>
      <trkpt lat="51.90" lon="-1.40"></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn reads_points_waypoints_and_name() -> anyhow::Result<()> {
        let doc = read_route_from_str(SAMPLE)?;
        assert_eq!(doc.name.as_deref(), Some("Oxford 200"));
        assert_eq!(doc.track_points.len(), 4);
        assert_eq!(doc.track_points[0].ele, 60.5);
        assert_eq!(doc.track_points[1].ele, 0.0);
        assert!(doc.track_points[2].lat.is_nan());
        assert_eq!(doc.track_points[3].lon, -1.40);
        assert!(doc.route_points.is_empty());

        assert_eq!(doc.waypoints.len(), 1);
        let wpt = &doc.waypoints[0];
        assert_eq!(wpt.name, "Control & Cafe");
        assert_eq!(wpt.description.as_deref(), Some("Stamp at the counter"));
        assert_eq!(wpt.symbol.as_deref(), Some("Flag"));
        assert_eq!(wpt.r#type.as_deref(), Some("cp"));
        Ok(())
    }

    #[test]
    fn track_name_is_used_without_metadata() -> anyhow::Result<()> {
        let doc = read_route_from_str(
            r#"<gpx><trk><name>Fallback</name><trkseg/></trk></gpx>"#,
        )?;
        assert_eq!(doc.name.as_deref(), Some("Fallback"));
        Ok(())
    }

    #[test]
    fn prefixed_elements_are_recognised() -> anyhow::Result<()> {
        let doc = read_route_from_str(
            r#"<g:gpx xmlns:g="http://www.topografix.com/GPX/1/1">
                 <g:trk><g:trkseg>
                   <g:trkpt lat="1" lon="2"/>
                   <g:trkpt lat="1.1" lon="2.1"/>
                 </g:trkseg></g:trk>
               </g:gpx>"#,
        )?;
        assert_eq!(doc.track_points.len(), 2);
        Ok(())
    }

    #[test]
    fn route_points_are_collected() -> anyhow::Result<()> {
        let doc = read_route_from_str(
            r#"<gpx><rte><name>Planned</name>
                 <rtept lat="10" lon="20"><name>Turn left</name></rtept>
                 <rtept lat="10.1" lon="20.1"/>
               </rte></gpx>"#,
        )?;
        assert_eq!(doc.name.as_deref(), Some("Planned"));
        assert_eq!(doc.route_points.len(), 2);
        assert!(doc.track_points.is_empty());
        Ok(())
    }

    #[test]
    fn byte_slice_with_bom_is_read() -> anyhow::Result<()> {
        let mut data = b"\xEF\xBB\xBF".to_vec();
        data.extend_from_slice(SAMPLE.as_bytes());
        let doc = read_route_from_slice(&data)?;
        assert_eq!(doc.name.as_deref(), Some("Oxford 200"));
        assert_eq!(doc.track_points.len(), 4);
        assert_eq!(doc.waypoints.len(), 1);
        Ok(())
    }

    #[test]
    fn mismatched_tags_are_a_parse_error() {
        let result = read_route_from_str("<gpx><trk></gpx>");
        assert!(matches!(result, Err(AudaxError::Parse(_))));
    }

    #[test]
    fn truncated_document_is_a_parse_error() {
        let result = read_route_from_str(r#"<gpx><trk><trkseg><trkpt lat="1" lon="2">"#);
        assert!(matches!(result, Err(AudaxError::Parse(_))));
    }

    #[test]
    fn plain_text_is_a_parse_error() {
        let result = read_route_from_str("this is not xml");
        assert!(matches!(result, Err(AudaxError::Parse(_))));
    }
}
