use anyhow::{bail, Result};
use quick_xml::{events::Event, Reader};

use super::XmlReaderExtensions;

/// Parses the 'metadata' element. Only the name is of interest.
pub(crate) fn parse_metadata(xml_reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut name = None;

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => {
                    name = Some(xml_reader.read_inner_as_string()?);
                }
                _ => {
                    xml_reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(_)) => {
                return Ok(name.filter(|n| !n.is_empty()));
            }
            Ok(Event::Eof) => {
                bail!("Reached EOF unexpectedly inside 'metadata'. File is probably corrupt.");
            }
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            _ => (),
        }
    }
}
