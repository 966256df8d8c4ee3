use anyhow::{bail, Result};
use quick_xml::{events::Event, Reader};

use crate::model::RawPoint;

use super::{track_segment::parse_track_segment, XmlReaderExtensions};

/// Parses a 'trk' element. All segments are flattened into `points` in
/// document order; the track's name, if any, is returned.
pub(crate) fn parse_track(
    xml_reader: &mut Reader<&[u8]>,
    points: &mut Vec<RawPoint>,
) -> Result<Option<String>> {
    let mut name = None;

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => {
                    name = Some(xml_reader.read_inner_as_string()?);
                }
                b"trkseg" => {
                    parse_track_segment(xml_reader, points)?;
                }
                _ => {
                    xml_reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(_)) => {
                return Ok(name.filter(|n| !n.is_empty()));
            }
            Ok(Event::Eof) => {
                bail!("Reached EOF unexpectedly inside 'trk'. File is probably corrupt.");
            }
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            _ => (),
        }
    }
}
