//! Wire format shared by the server and the client.
//!
//! Every message is a 4-byte big-endian length followed by that many bytes of
//! UTF-8 JSON. One request frame is answered by exactly one response frame.

use serde::{Deserialize, Deserializer, Serialize};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use crate::shell::result::CommandResult;

pub const DEFAULT_MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Request {
    pub command: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_directory: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Response {
    pub success: bool,
    pub message: String,
    /// `None`: no listing was produced. `Some(vec![])`: a listing with zero entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_directory: Option<String>,
}

// `"Args": null` and a missing `Args` both mean "no arguments".
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Request {
    pub fn new(command: impl Into<String>, args: Vec<String>, current_directory: Option<String>) -> Self {
        Self {
            command: command.into(),
            args,
            current_directory,
        }
    }
}

impl Response {
    pub fn from_result(result: &CommandResult, current_directory: Option<String>) -> Self {
        let items = result.has_listing().then(|| {
            result
                .items()
                .iter()
                .map(|item| item.full_path.to_string_lossy().into_owned())
                .collect()
        });

        Self {
            success: result.is_success(),
            message: result.message().to_string(),
            items,
            current_directory,
        }
    }

    pub fn failure(message: impl Into<String>, current_directory: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            items: None,
            current_directory,
        }
    }
}

/// Reads one frame. `Ok(None)` means the peer closed the stream cleanly
/// before a new frame started.
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> io::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    };

    if len > max_len {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds the {} byte limit", len, max_len),
        ));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}

pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too large"))?;
    writer.write_u32(len).await?;
    writer.write_all(payload).await?;
    writer.flush().await
}

pub fn encode<T: Serialize>(message: &T) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(message)
}

pub fn decode<'a, T: Deserialize<'a>>(payload: &'a [u8]) -> serde_json::Result<T> {
    serde_json::from_slice(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::result::FileEntry;
    use std::path::Path;

    #[test]
    fn test_request_round_trip() {
        let req = Request::new("copy", vec!["a b.txt".into(), "c".into()], Some("/tmp".into()));
        let decoded: Request = decode(&encode(&req).unwrap()).unwrap();
        assert_eq!(decoded, req);

        let bare = Request::new("pwd", Vec::new(), None);
        let decoded: Request = decode(&encode(&bare).unwrap()).unwrap();
        assert_eq!(decoded, bare);
    }

    #[test]
    fn test_response_round_trip_keeps_absent_items() {
        let none = Response::failure("nope", Some("/srv".into()));
        let empty = Response {
            success: true,
            message: "Found 0 item(s).".into(),
            items: Some(Vec::new()),
            current_directory: None,
        };
        assert_eq!(decode::<Response>(&encode(&none).unwrap()).unwrap(), none);
        assert_eq!(decode::<Response>(&encode(&empty).unwrap()).unwrap(), empty);
    }

    #[test]
    fn test_wire_field_names() {
        for raw in [&br#"{"Command":"ls","Args":null}"#[..], &br#"{"Command":"ls"}"#[..]] {
            let req: Request = decode(raw).unwrap();
            assert_eq!(req.command, "ls");
            assert!(req.args.is_empty());
            assert_eq!(req.current_directory, None);
        }

        let json = String::from_utf8(encode(&Response::failure("x", Some("/d".into()))).unwrap()).unwrap();
        assert!(json.contains("\"Success\":false"));
        assert!(json.contains("\"CurrentDirectory\":\"/d\""));
        assert!(!json.contains("Items"));
    }

    #[test]
    fn test_response_from_result() {
        let listing = CommandResult::success(
            "Listing",
            Some(vec![FileEntry::from_path(Path::new("/nowhere/a.txt"))]),
        );
        let resp = Response::from_result(&listing, None);
        assert_eq!(resp.items, Some(vec![Path::new("/nowhere/a.txt").to_string_lossy().into_owned()]));

        let plain = Response::from_result(&CommandResult::success("ok", None), None);
        assert_eq!(plain.items, None);
    }

    #[tokio::test]
    async fn test_frames_survive_coalescing() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"first").await.unwrap();
        write_frame(&mut buf, b"").await.unwrap();
        write_frame(&mut buf, b"third").await.unwrap();

        let mut reader = buf.as_slice();
        assert_eq!(read_frame(&mut reader, 64).await.unwrap().unwrap(), b"first");
        assert_eq!(read_frame(&mut reader, 64).await.unwrap().unwrap(), b"");
        assert_eq!(read_frame(&mut reader, 64).await.unwrap().unwrap(), b"third");
        assert!(read_frame(&mut reader, 64).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &[0u8; 32]).await.unwrap();
        let mut reader = buf.as_slice();
        let err = read_frame(&mut reader, 16).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
