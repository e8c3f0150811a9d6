use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    scan_submissions: AtomicU64,
    scan_errors: AtomicU64,
    manifest_uploads: AtomicU64,
    exports: AtomicU64,
}

impl Metrics {
    pub fn record_scan(&self) {
        self.scan_submissions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan_error(&self) {
        self.scan_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_manifest_upload(&self) {
        self.manifest_uploads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_export(&self) {
        self.exports.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let submissions = self.scan_submissions.load(Ordering::Relaxed);
        let errors = self.scan_errors.load(Ordering::Relaxed);
        let uploads = self.manifest_uploads.load(Ordering::Relaxed);
        let exports = self.exports.load(Ordering::Relaxed);

        format!(
            "# TYPE gantry_scan_submissions_total counter\n\
gantry_scan_submissions_total {}\n\
# TYPE gantry_scan_errors_total counter\n\
gantry_scan_errors_total {}\n\
# TYPE gantry_manifest_uploads_total counter\n\
gantry_manifest_uploads_total {}\n\
# TYPE gantry_exports_total counter\n\
gantry_exports_total {}\n",
            submissions, errors, uploads, exports
        )
    }
}
