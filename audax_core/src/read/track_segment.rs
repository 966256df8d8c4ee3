use anyhow::{bail, Result};
use quick_xml::{events::Event, Reader};

use crate::model::RawPoint;

use super::waypoint::parse_waypoint;

/// Parses a 'trkseg' element, appending its 'trkpt' children to `points`.
pub(crate) fn parse_track_segment(
    xml_reader: &mut Reader<&[u8]>,
    points: &mut Vec<RawPoint>,
) -> Result<()> {
    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => {
                    points.push(parse_waypoint(&e, xml_reader, false)?.into_point());
                }
                _ => {
                    xml_reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"trkpt" => {
                    points.push(parse_waypoint(&e, xml_reader, true)?.into_point());
                }
                _ => {}
            },
            Ok(Event::End(_)) => {
                return Ok(());
            }
            Ok(Event::Eof) => {
                bail!("Reached EOF unexpectedly inside 'trkseg'. File is probably corrupt.");
            }
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            _ => (),
        }
    }
}
