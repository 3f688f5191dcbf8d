use prost::Message;
use snap::raw::{Decoder, Encoder};
use tracing::debug;

use crate::error::{AdapterError, Result};
use crate::proto::{ReadRequest, ReadResponse};

pub const CONTENT_TYPE_PROTOBUF: &str = "application/x-protobuf";
pub const CONTENT_ENCODING_SNAPPY: &str = "snappy";

/// Decompresses a snappy block and decodes the remote-read request inside it.
pub fn decode_read_request(compressed: &[u8]) -> Result<ReadRequest> {
    let buf = Decoder::new()
        .decompress_vec(compressed)
        .map_err(AdapterError::from)?;
    debug!(
        compressed = compressed.len(),
        decompressed = buf.len(),
        "Decompressed remote read request"
    );

    let request = ReadRequest::decode(buf.as_slice())?;
    debug!(queries = request.queries.len(), "Decoded remote read request");
    Ok(request)
}

/// Serializes the response and compresses it as a single snappy block.
pub fn encode_read_response(response: &ReadResponse) -> Result<Vec<u8>> {
    let encoded = response.encode_to_vec();
    let compressed = Encoder::new()
        .compress_vec(&encoded)
        .map_err(|e| AdapterError::Encode(e.to_string()))?;
    debug!(
        encoded = encoded.len(),
        compressed = compressed.len(),
        "Encoded remote read response"
    );
    Ok(compressed)
}
