//! XNAT-backed matrix source
//!
//! Opening discovers the `searchID=`/`resource=` parameter in the URL,
//! issues the metadata request, and hands the XML body to the injected
//! [`HeaderReader`]. Row and column fetches are one network round trip
//! each: a clone of the base POST with `row-index=`/`column-index=`
//! appended, decoded through the wire-payload validator.

use tracing::warn;

use dconn_core::byte_order::Endianness;
use dconn_core::header::{CiftiHeader, HeaderReader, MappingAxis, MappingType};
use dconn_core::validation::{decode_wire_values, validate_wire_payload};

use crate::error::{DconnError, Result};
use crate::source::{check_index, MatrixSource};
use crate::transport::{RemoteAuth, TransportConfig, XnatTransport};

/// Which discovery parameter the URL carried. The metadata request style
/// follows it: the older `searchID` service expects a bare `metadata=`,
/// the `resource` service expects `metadata=true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiscoveryStyle {
    SearchId,
    Resource,
}

fn discover(url: &str) -> Result<(String, (String, String), DiscoveryStyle)> {
    let Some((base, query)) = url.split_once('?') else {
        return Err(DconnError::UrlFormat(format!(
            "{url} has no query parameters"
        )));
    };
    for segment in query.split('&') {
        if let Some(value) = segment.strip_prefix("searchID=") {
            return Ok((
                base.to_string(),
                ("searchID".to_string(), value.to_string()),
                DiscoveryStyle::SearchId,
            ));
        }
        if let Some(value) = segment.strip_prefix("resource=") {
            return Ok((
                base.to_string(),
                ("resource".to_string(), value.to_string()),
                DiscoveryStyle::Resource,
            ));
        }
    }
    Err(DconnError::UrlFormat(format!(
        "{url} carries neither searchID= nor resource="
    )))
}

/// Matrix served row-by-row over HTTP by an XNAT repository.
#[derive(Debug)]
pub struct RemoteMatrixSource {
    transport: XnatTransport,
    row_count: u64,
    column_count: u64,
}

impl RemoteMatrixSource {
    /// Open the remote matrix and return it with its parsed header.
    ///
    /// If the header declares a time-points axis without a length, one
    /// probe request learns the missing dimension from the returned
    /// element count and the header is patched in place.
    pub fn open(
        url: &str,
        auth: Option<RemoteAuth>,
        reader: &dyn HeaderReader,
        config: TransportConfig,
    ) -> Result<(Self, CiftiHeader)> {
        let (base, discovery_param, style) = discover(url)?;
        let metadata_param = match style {
            DiscoveryStyle::SearchId => ("metadata", String::new()),
            DiscoveryStyle::Resource => ("metadata", "true".to_string()),
        };
        let base_params = vec![discovery_param, ("type".to_string(), "dconn".to_string())];
        let transport = XnatTransport::new(base, base_params, auth, config)?;

        let body = transport
            .post_form(&[metadata_param])
            .map_err(|err| DconnError::Open(format!("metadata request failed: {err}")))?;
        let mut header = reader
            .read_header(&body)
            .map_err(|err| DconnError::Open(err.to_string()))?;

        let row_count = match header.dimension(MappingAxis::Loading) {
            Some(count) => count,
            None => {
                let count = probe_dimension(&transport, &header, MappingAxis::Loading)?;
                header.patch_dimension(MappingAxis::Loading, count);
                count
            }
        };
        let column_count = match header.dimension(MappingAxis::Viewing) {
            Some(count) => count,
            None => {
                let count = probe_dimension(&transport, &header, MappingAxis::Viewing)?;
                header.patch_dimension(MappingAxis::Viewing, count);
                count
            }
        };

        Ok((
            Self {
                transport,
                row_count,
                column_count,
            },
            header,
        ))
    }

    pub fn url(&self) -> &str {
        self.transport.url()
    }
}

/// Learn a missing dimension by fetching the first vector that runs along
/// it and counting the returned elements. Only a time-points axis may
/// legitimately arrive without a length.
fn probe_dimension(
    transport: &XnatTransport,
    header: &CiftiHeader,
    axis: MappingAxis,
) -> Result<u64> {
    if header.mapping_type(axis) != MappingType::TimePoints {
        return Err(DconnError::Open(format!(
            "header omits the {axis:?} dimension and its mapping type cannot be probed"
        )));
    }
    // a column has row_count elements and vice versa
    let probe_param = match axis {
        MappingAxis::Loading => ("column-index", "0".to_string()),
        MappingAxis::Viewing => ("row-index", "0".to_string()),
    };
    let body = transport
        .post_form(&[probe_param])
        .map_err(|err| DconnError::Open(format!("dimension probe failed: {err}")))?;
    let declared = validate_wire_payload(&body, Endianness::system())
        .map_err(|err| DconnError::Open(format!("dimension probe failed: {err}")))?;
    warn!(
        ?axis,
        length = declared,
        "header omitted a time-points dimension; recovered it from a probe request"
    );
    Ok(declared as u64)
}

impl MatrixSource for RemoteMatrixSource {
    fn row_count(&self) -> u64 {
        self.row_count
    }

    fn column_count(&self) -> u64 {
        self.column_count
    }

    fn get_row(&self, buffer: &mut [f32], row_index: i64) -> Result<()> {
        let row = check_index(row_index, self.row_count)?;
        let body = self
            .transport
            .post_form(&[("row-index", row.to_string())])?;
        decode_wire_values(&body, Endianness::system(), buffer)?;
        Ok(())
    }

    fn get_column(&self, buffer: &mut [f32], column_index: i64) -> Result<()> {
        let column = check_index(column_index, self.column_count)?;
        let body = self
            .transport
            .post_form(&[("column-index", column.to_string())])?;
        decode_wire_values(&body, Endianness::system(), buffer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_finds_search_id() {
        let (base, param, style) =
            discover("https://db.example.org/data?foo=1&searchID=abc123&bar=2").unwrap();
        assert_eq!(base, "https://db.example.org/data");
        assert_eq!(param, ("searchID".to_string(), "abc123".to_string()));
        assert_eq!(style, DiscoveryStyle::SearchId);
    }

    #[test]
    fn discovery_finds_resource() {
        let (_, param, style) =
            discover("https://db.example.org/services/conn?resource=subj01.dconn").unwrap();
        assert_eq!(param, ("resource".to_string(), "subj01.dconn".to_string()));
        assert_eq!(style, DiscoveryStyle::Resource);
    }

    #[test]
    fn discovery_rejects_plain_urls() {
        assert!(matches!(
            discover("https://db.example.org/data").unwrap_err(),
            DconnError::UrlFormat(_)
        ));
        assert!(matches!(
            discover("https://db.example.org/data?token=xyz").unwrap_err(),
            DconnError::UrlFormat(_)
        ));
    }
}
