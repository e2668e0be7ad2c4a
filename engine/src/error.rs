use serde::Serialize;
use thiserror::Error;

/// User-visible alert payload for unrecoverable conditions. This is an
/// embedded component: there are no exit codes, only structured alerts
/// the host chrome displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("the provided image is not a valid SVG file")]
    InvalidSvg,
    #[error("the provided URL does not point to an SVG file")]
    NotAnSvgUrl,
    #[error("the provided ZIP file is not a valid archive")]
    InvalidArchive,
    #[error("the provided ZIP file does not contain a valid SVG file")]
    ArchiveWithoutSvg,
    #[error("the remote map could not be retrieved")]
    RemoteUnreachable {
        /// True when the failure looks like an offline/CORS condition
        /// rather than a plain HTTP error.
        offline_or_cors: bool,
    },
}

impl MapError {
    /// Render the terminal alert for this failure.
    pub fn alert(&self) -> Alert {
        let (title, message) = match self {
            MapError::InvalidSvg => (
                "SVG File Error",
                "The provided image is not a valid SVG file.".to_string(),
            ),
            MapError::NotAnSvgUrl => (
                "Remote Map Error",
                "The provided image is not an SVG file.".to_string(),
            ),
            MapError::InvalidArchive => (
                "ZIP File Error",
                "The provided ZIP file is not a valid archive or uses an unsupported \
                 compression."
                    .to_string(),
            ),
            MapError::ArchiveWithoutSvg => (
                "ZIP File Error",
                "The provided ZIP file does not contain a valid SVG file.".to_string(),
            ),
            MapError::RemoteUnreachable { offline_or_cors } => {
                let message = if *offline_or_cors {
                    "The provided image cannot be displayed for one of the following \
                     reasons: you are offline, the remote URL is not accessible, or the \
                     remote server disallows Cross-Origin Resource Sharing (CORS)."
                } else {
                    "The provided image cannot be displayed: the remote URL did not \
                     return a usable document."
                };
                ("Remote Map Error", message.to_string())
            }
        };
        Alert {
            title: title.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_carry_title_and_message() {
        let alert = MapError::InvalidSvg.alert();
        assert_eq!(alert.title, "SVG File Error");
        assert!(alert.message.contains("not a valid SVG"));
    }

    #[test]
    fn unreachable_distinguishes_cors() {
        let cors = MapError::RemoteUnreachable { offline_or_cors: true }.alert();
        assert!(cors.message.contains("CORS"));
        let plain = MapError::RemoteUnreachable { offline_or_cors: false }.alert();
        assert!(!plain.message.contains("CORS"));
    }
}
