use anyhow::{bail, Result};
use quick_xml::{events::Event, Reader};

use crate::model::RawPoint;

use super::{waypoint::parse_waypoint, XmlReaderExtensions};

/// Parses a 'rte' element, appending its 'rtept' children to `points` and
/// returning the route's name, if any.
pub(crate) fn parse_route(
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
                b"rtept" => {
                    points.push(parse_waypoint(&e, xml_reader, false)?.into_point());
                }
                _ => {
                    xml_reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"rtept" => {
                    points.push(parse_waypoint(&e, xml_reader, true)?.into_point());
                }
                _ => {}
            },
            Ok(Event::End(_)) => {
                return Ok(name.filter(|n| !n.is_empty()));
            }
            Ok(Event::Eof) => {
                bail!("Reached EOF unexpectedly inside 'rte'. File is probably corrupt.");
            }
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            _ => (),
        }
    }
}
