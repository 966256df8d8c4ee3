use std::collections::HashMap;

use anyhow::Result;
use quick_xml::{events::BytesStart, Reader};

use super::XmlReaderConversions;

#[derive(Debug)]
pub(crate) struct Attributes {
    data: HashMap<String, String>,
}

impl Attributes {
    /// Creates a new Attributes object by parsing out all the attributes of the
    /// specified tag. Keys are stored by their local name, so a namespace
    /// prefix does not matter.
    pub(crate) fn new<R>(tag: &BytesStart<'_>, xml_reader: &Reader<R>) -> Result<Self> {
        let mut data = HashMap::new();

        for attr in tag.attributes() {
            let attr = attr?;
            let key = attr.key.local_name();
            let key = xml_reader.bytes_to_string(key.as_ref())?;
            let value = xml_reader.cow_to_string(attr.value)?;

            data.insert(key, value);
        }

        Ok(Self { data })
    }

    /// Gets an attribute as a coordinate. GPX from the wild is noisy, so a
    /// missing or unparseable value is returned as NaN for the caller to
    /// filter out rather than failing the whole document.
    pub(crate) fn get_coordinate(&self, key: &str) -> f64 {
        self.data
            .get(key)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(f64::NAN)
    }
}
