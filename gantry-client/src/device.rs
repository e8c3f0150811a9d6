// Camera scanner failures
// Each browser/device failure maps to its own actionable message. The
// keystroke wedge path keeps working regardless, so a camera failure never
// blocks scanning.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("Camera permission denied. Allow camera access for this site and rescan.")]
    PermissionDenied,
    #[error("No camera was found on this device. Use the handheld scanner instead.")]
    NotFound,
    #[error("The camera is in use by another application. Close it and retry.")]
    Busy,
}

impl CameraError {
    /// Map a getUserMedia-style error name onto the taxonomy. Unknown names
    /// return None and are reported verbatim by the caller.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NotAllowedError" | "PermissionDeniedError" => Some(CameraError::PermissionDenied),
            "NotFoundError" | "DevicesNotFoundError" => Some(CameraError::NotFound),
            "NotReadableError" | "TrackStartError" => Some(CameraError::Busy),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_error_names_map_to_distinct_messages() {
        let denied = CameraError::from_name("NotAllowedError").unwrap();
        let missing = CameraError::from_name("NotFoundError").unwrap();
        let busy = CameraError::from_name("NotReadableError").unwrap();
        assert_ne!(denied.to_string(), missing.to_string());
        assert_ne!(missing.to_string(), busy.to_string());
    }

    #[test]
    fn unknown_error_names_pass_through() {
        assert!(CameraError::from_name("SomethingElse").is_none());
    }
}
