use anyhow::{bail, Result};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

use crate::model::{RawPoint, RawWaypoint};

use super::{attributes::Attributes, XmlReaderConversions, XmlReaderExtensions};

/// The fields of a `wptType` element (`wpt`, `trkpt` or `rtept`) that we
/// use. The rest of the element is skipped.
#[derive(Debug, Default)]
pub(crate) struct WaypointFields {
    pub(crate) lat: f64,
    pub(crate) lon: f64,
    pub(crate) ele: Option<f64>,
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) symbol: Option<String>,
    pub(crate) r#type: Option<String>,
}

impl WaypointFields {
    pub(crate) fn into_point(self) -> RawPoint {
        RawPoint {
            lat: self.lat,
            lon: self.lon,
            ele: self.ele.unwrap_or(0.0),
        }
    }

    pub(crate) fn into_waypoint(self) -> RawWaypoint {
        RawWaypoint {
            lat: self.lat,
            lon: self.lon,
            name: self.name.unwrap_or_default(),
            description: self.description.filter(|d| !d.is_empty()),
            symbol: self.symbol.filter(|s| !s.is_empty()),
            r#type: self.r#type.filter(|t| !t.is_empty()),
        }
    }
}

/// Parses a waypoint-like element whose start tag has just been read. If the
/// tag was self-closing (`is_empty`) there are no children to read.
pub(crate) fn parse_waypoint(
    tag: &BytesStart<'_>,
    xml_reader: &mut Reader<&[u8]>,
    is_empty: bool,
) -> Result<WaypointFields> {
    let attributes = Attributes::new(tag, xml_reader)?;
    let mut fields = WaypointFields {
        lat: attributes.get_coordinate("lat"),
        lon: attributes.get_coordinate("lon"),
        ..Default::default()
    };

    if is_empty {
        return Ok(fields);
    }

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" => {
                    fields.ele = xml_reader.read_inner_as_f64()?;
                }
                b"name" => {
                    fields.name = Some(xml_reader.read_inner_as_string()?);
                }
                b"desc" => {
                    fields.description = Some(xml_reader.read_inner_as_string()?);
                }
                b"sym" => {
                    fields.symbol = Some(xml_reader.read_inner_as_string()?);
                }
                b"type" => {
                    fields.r#type = Some(xml_reader.read_inner_as_string()?);
                }
                // time, extensions, links etc.
                _ => {
                    xml_reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(_)) => {
                return Ok(fields);
            }
            Ok(Event::Eof) => {
                bail!(
                    "Reached EOF unexpectedly inside {:?}. File is probably corrupt.",
                    xml_reader.bytes_to_cow(tag.local_name().as_ref())?
                );
            }
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            _ => (),
        }
    }
}
