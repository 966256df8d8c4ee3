use anyhow::{bail, Result};
use quick_xml::{events::Event, Reader};

use crate::model::RouteDocument;

use super::{
    metadata::parse_metadata, route::parse_route, track::parse_track, waypoint::parse_waypoint,
};

/// Parses the 'gpx' element itself, after its start tag has been read.
pub(crate) fn parse_gpx(xml_reader: &mut Reader<&[u8]>) -> Result<RouteDocument> {
    let mut doc = RouteDocument::default();
    let mut metadata_name = None;
    let mut track_name = None;
    let mut route_name = None;

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"metadata" => {
                    metadata_name = parse_metadata(xml_reader)?;
                }
                b"wpt" => {
                    let wpt = parse_waypoint(&e, xml_reader, false)?;
                    doc.waypoints.push(wpt.into_waypoint());
                }
                b"trk" => {
                    let name = parse_track(xml_reader, &mut doc.track_points)?;
                    track_name = track_name.or(name);
                }
                b"rte" => {
                    let name = parse_route(xml_reader, &mut doc.route_points)?;
                    route_name = route_name.or(name);
                }
                _ => {
                    xml_reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"wpt" => {
                    let wpt = parse_waypoint(&e, xml_reader, true)?;
                    doc.waypoints.push(wpt.into_waypoint());
                }
                _ => {}
            },
            Ok(Event::End(_)) => {
                doc.name = metadata_name.or(track_name).or(route_name);
                return Ok(doc);
            }
            Ok(Event::Eof) => {
                bail!("Reached EOF unexpectedly. File is probably corrupt.");
            }
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            _ => (),
        }
    }
}
